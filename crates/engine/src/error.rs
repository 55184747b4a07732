use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Worktree(#[from] repo::WorktreeError),

    #[error(transparent)]
    SymbolIndex(#[from] symbols::SymbolIndexError),

    #[error(transparent)]
    Refactor(#[from] refactor::RefactorError),

    #[error(transparent)]
    Compiler(#[from] compiler::CompilerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unknown mod id `{0}`")]
    UnknownMod(String),

    #[error("unknown compiler id `{0}`")]
    UnknownCompiler(String),

    #[error("unknown validator id `{0}`")]
    UnknownValidator(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}
