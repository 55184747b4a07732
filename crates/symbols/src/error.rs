use thiserror::Error;

#[derive(Debug, Error)]
pub enum SymbolIndexError {
    #[error("doxygen executable not found (set DOXYGEN_PATH or install doxygen on PATH)")]
    ExtractorNotAvailable,

    #[error("doxygen extraction failed: {stderr}")]
    ExtractionFailed { stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Process(#[from] proc::ProcessError),
}
