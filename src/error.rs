use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Writing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Matrix Format Error (line {line}): {message}")]
    Format { line: usize, message: String },

    #[error("Empty Matrix: a coverage matrix needs at least one test and one requirement")]
    EmptyMatrix,

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl SuiteError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

pub type SfResult<T> = Result<T, SuiteError>;
