use thiserror::Error;

#[derive(Error, Debug)]
pub enum RigError {
    #[error("bone not found: {0}")]
    MissingBone(String),

    #[error("skeleton topology mismatch: {0}")]
    TopologyMismatch(String),

    #[error("invalid chain: {0}")]
    InvalidChain(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, RigError>;
