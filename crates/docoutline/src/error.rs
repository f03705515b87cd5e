#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("No PDF files found in: {0}")]
    NoInputFiles(String),

    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Worker failed: {0}")]
    Worker(String),
}
