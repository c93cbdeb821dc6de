//! Core library for the swap-card project.
//!
//! A headless swap card: a USD price feed with fallback prices, a
//! bidirectional amount converter and a wallet session that simulates swaps.

pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod swap;
pub mod utils;
pub mod wallet;
