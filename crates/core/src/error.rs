use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkwiseError {
    #[error("Invalid config {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}
