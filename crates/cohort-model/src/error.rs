use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
