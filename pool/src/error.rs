#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Pool is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, PoolError>;
