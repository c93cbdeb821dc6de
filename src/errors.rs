use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Price for {symbol} out of bounds: {price}")]
    PriceOutOfBounds { symbol: String, price: f64 },

    #[error("Missing price for {0}")]
    MissingPrice(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Swap error: {0}")]
    Swap(String),

    #[error("Other: {0}")]
    Other(String),
}
