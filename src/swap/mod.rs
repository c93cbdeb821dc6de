pub mod converter;
pub mod form;

pub use converter::{convert, parse_amount, usd_value};
pub use form::SwapForm;
