// crates/klimaplot-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Artifact could not be persisted: {0}")]
    Persist(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
