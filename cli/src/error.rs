use thiserror::Error;
use x1c_token::TokenError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("ledger error: {0}")]
    Token(#[from] TokenError),
}
