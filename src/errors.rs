use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for stage `{stage}`: expected a string, found {found}")]
    InvalidStageValue { stage: String, found: &'static str },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Logger error: {0}")]
    Logger(String),
}
