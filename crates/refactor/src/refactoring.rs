use repo::Worktree;
use symbols::SymbolTable;

use crate::{commit::CommitDescriptor, error::RefactorError};

/// Named arguments shared by the reference refactorings: a target symbol
/// and the qualifier to add or remove.
#[derive(Debug, Clone)]
pub struct RefactoringArgs {
    pub symbol: String,
    pub qualifier: String,
}

/// An atomic transformation: check preconditions against the symbol index
/// and file content, mutate files, invalidate the index, and commit. `None`
/// means preconditions failed or nothing changed; both are skips, not
/// errors.
pub trait Refactoring {
    fn id(&self) -> &'static str;

    fn apply(
        &self,
        worktree: &Worktree,
        symbols: &mut SymbolTable,
        args: &RefactoringArgs,
    ) -> Result<Option<CommitDescriptor>, RefactorError>;

    /// The probability this refactoring would declare on its commit if
    /// applied with `args`, computable ahead of time from the qualifier
    /// class alone. Lets callers group a plan into batches before running
    /// any of it.
    fn declared_probability(&self, args: &RefactoringArgs) -> f64;
}
