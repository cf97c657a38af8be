use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitcovError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML Parsing Error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Layout Error: {0}")]
    Layout(String),
}

pub type KcResult<T> = Result<T, KitcovError>;
