#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Malformed catalog record: {0}")]
    MalformedRecord(String),
    #[error("Invalid call-site record: {0}")]
    InvalidCallSite(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
