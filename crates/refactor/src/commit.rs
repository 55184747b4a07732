use repo::Worktree;

use crate::error::RefactorError;

/// "GitCommit": the result of a refactoring that successfully committed a
/// change. Constructing one commits the currently staged modifications;
/// construction fails with [`RefactorError::NothingToCommit`] if nothing
/// changed, which callers treat as the refactoring returning null.
#[derive(Debug, Clone)]
pub struct CommitDescriptor {
    pub message: String,
    pub commit_hash: String,
    parent_hash: String,
    pub validator_id: &'static str,
    pub affected_symbols: Vec<String>,
    pub probability: f64,
}

impl CommitDescriptor {
    pub fn new(
        worktree: &Worktree,
        message: String,
        validator_id: &'static str,
        affected_symbols: Vec<String>,
        probability: f64,
    ) -> Result<Self, RefactorError> {
        if !worktree.commit(&message)? {
            return Err(RefactorError::NothingToCommit);
        }
        let commit_hash = worktree.get_commit_hash("HEAD")?;
        let parent_hash = worktree.get_commit_hash("HEAD~1")?;
        Ok(Self {
            message,
            commit_hash,
            parent_hash,
            validator_id,
            affected_symbols,
            probability,
        })
    }

    /// Reset the atomic branch to this commit's parent, discarding it.
    pub fn rollback(&self, worktree: &Worktree) -> Result<(), RefactorError> {
        worktree.reset_hard(&self.parent_hash).map_err(Into::into)
    }
}
