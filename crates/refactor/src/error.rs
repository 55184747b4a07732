use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefactorError {
    #[error("nothing to commit")]
    NothingToCommit,

    #[error("symbol `{0}` not found in declaration file")]
    DeclarationNotFound(String),

    #[error(transparent)]
    Worktree(#[from] repo::WorktreeError),

    #[error(transparent)]
    SymbolIndex(#[from] symbols::SymbolIndexError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
