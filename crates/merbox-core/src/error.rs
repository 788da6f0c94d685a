pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base64 in state token: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("corrupt compressed state: {0}")]
    Inflate(#[source] std::io::Error),

    #[error("decompressed state exceeds {limit} bytes")]
    StateTooLarge { limit: u64 },

    #[error("decompressed state is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid state JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown theme: {name}")]
    UnknownTheme { name: String },

    #[error("storage I/O error: {0}")]
    Storage(#[from] std::io::Error),
}
