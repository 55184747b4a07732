//! Owns one on-disk git clone and exposes the primitives the refactoring
//! engine needs on top of it. Every operation shells out to the `git` binary
//! through [`proc::ProcessRunner`] rather than linking a git implementation,
//! so `GIT_PATH` and the runner's timeout/kill-tree behavior apply uniformly.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use proc::{ProcessError, ProcessRunner, RunRequest};
use thiserror::Error;
use utils::shell::resolve_executable;

/// Fixed branch name shared by all repositories; configurable work branches
/// are not supported.
pub const WORK_BRANCH: &str = "levelup-work";

pub fn atomic_branch_name(request_id: &str) -> String {
    format!("{WORK_BRANCH}-atomic-{request_id}")
}

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("git executable not found (set GIT_PATH or install git on PATH)")]
    GitNotAvailable,
    #[error("clone failed: {stderr}")]
    CloneFailed { stderr: String },
    #[error("git {op} failed (exit {exit_code}): {stderr}")]
    GitFailed {
        op: &'static str,
        exit_code: i32,
        stderr: String,
    },
    #[error("post-checkout command failed (exit {exit_code}): {stderr}")]
    PostCheckoutFailed { exit_code: i32, stderr: String },
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// A single on-disk clone of a repository, plus the operations the engine
/// drives it with. Single-writer: callers are responsible for serializing
/// concurrent requests against the same worktree (see queue crate).
pub struct Worktree {
    pub clone_path: PathBuf,
    pub remote_url: String,
    pub post_checkout: Option<String>,
    runner: ProcessRunner,
    git_timeout: Duration,
}

impl Worktree {
    pub fn new(
        clone_path: impl Into<PathBuf>,
        remote_url: impl Into<String>,
        post_checkout: Option<String>,
    ) -> Self {
        Self {
            clone_path: clone_path.into(),
            remote_url: remote_url.into(),
            post_checkout,
            runner: ProcessRunner::new(),
            git_timeout: Duration::from_secs(120),
        }
    }

    fn git_path(&self) -> Result<PathBuf, WorktreeError> {
        resolve_executable("git", "GIT_PATH").ok_or(WorktreeError::GitNotAvailable)
    }

    fn git<I, S>(&self, cwd: &Path, op: &'static str, args: I) -> Result<String, WorktreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let git = self.git_path()?;
        let req = RunRequest::new(git, cwd).args(args).timeout(self.git_timeout);
        let out = self.runner.run(&req)?;
        if !out.success() {
            return Err(WorktreeError::GitFailed {
                op,
                exit_code: out.status,
                stderr: out.stderr,
            });
        }
        Ok(out.stdout)
    }

    fn git_in_repo<I, S>(&self, op: &'static str, args: I) -> Result<String, WorktreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.git(&self.clone_path, op, args)
    }

    /// If the clone path exists and contains a valid repository, do nothing;
    /// else clone from `remote_url`.
    pub fn ensure_cloned(&self) -> Result<(), WorktreeError> {
        if self.clone_path.join(".git").is_dir() {
            return Ok(());
        }
        let parent = self.clone_path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(|_| WorktreeError::CloneFailed {
            stderr: format!("could not create parent directory {}", parent.display()),
        })?;

        let git = self.git_path()?;
        let req = RunRequest::new(git, parent)
            .args(["clone", self.remote_url.as_str(), &self.clone_path.to_string_lossy()])
            .timeout(Duration::from_secs(600));
        let out = self.runner.run(&req)?;
        if !out.success() {
            return Err(WorktreeError::CloneFailed { stderr: out.stderr });
        }
        Ok(())
    }

    /// Fast-forward the current branch from remote. Failure is tolerated: a
    /// stale clone is not fatal to a request.
    pub fn pull(&self) -> Result<(), WorktreeError> {
        if let Err(e) = self.git_in_repo("pull", ["pull", "--ff-only"]) {
            tracing::warn!("pull failed, continuing with existing clone: {e}");
        }
        Ok(())
    }

    fn default_branch(&self) -> Result<String, WorktreeError> {
        let out = self.git_in_repo("symbolic-ref", ["symbolic-ref", "refs/remotes/origin/HEAD"])?;
        Ok(out.trim().rsplit('/').next().unwrap_or("main").to_string())
    }

    fn branch_exists(&self, name: &str) -> Result<bool, WorktreeError> {
        let git = self.git_path()?;
        let req = RunRequest::new(git, &self.clone_path).args([
            "rev-parse",
            "--verify",
            &format!("refs/heads/{name}"),
        ]);
        Ok(self.runner.run(&req)?.success())
    }

    /// Check out the fixed work branch, creating it from the default branch
    /// if absent, then reset to a clean state and run the post-checkout
    /// command if one is configured.
    pub fn prepare_work_branch(&self) -> Result<(), WorktreeError> {
        if self.branch_exists(WORK_BRANCH)? {
            self.checkout_branch(WORK_BRANCH, false)?;
        } else {
            let base = self.default_branch().unwrap_or_else(|_| "main".to_string());
            self.checkout_branch(&base, false)?;
            self.checkout_branch(WORK_BRANCH, true)?;
        }
        self.reset_hard("HEAD")?;

        if let Some(command) = &self.post_checkout {
            let req = RunRequest::new("/bin/sh", &self.clone_path)
                .args(["-c", command.as_str()])
                .timeout(Duration::from_secs(300));
            let out = self.runner.run(&req)?;
            if !out.success() {
                return Err(WorktreeError::PostCheckoutFailed {
                    exit_code: out.status,
                    stderr: out.stderr,
                });
            }
        }
        Ok(())
    }

    pub fn checkout_branch(&self, name: &str, create: bool) -> Result<(), WorktreeError> {
        if create {
            self.git_in_repo("checkout -b", ["checkout", "-b", name])?;
        } else {
            self.git_in_repo("checkout", ["checkout", name])?;
        }
        Ok(())
    }

    /// Create `{work-branch}-atomic-{request_id}` from the work branch and
    /// check it out.
    pub fn create_atomic_branch(&self, request_id: &str) -> Result<String, WorktreeError> {
        let name = atomic_branch_name(request_id);
        self.checkout_branch(WORK_BRANCH, false)?;
        self.git_in_repo("branch", ["branch", name.as_str()])?;
        self.checkout_branch(&name, false)?;
        Ok(name)
    }

    pub fn delete_branch(&self, name: &str, force: bool) -> Result<(), WorktreeError> {
        let flag = if force { "-D" } else { "-d" };
        self.git_in_repo("branch -d", ["branch", flag, name])?;
        Ok(())
    }

    /// Stage all tracked modifications and commit. Returns `false` (no error)
    /// if there was nothing to commit.
    pub fn commit(&self, message: &str) -> Result<bool, WorktreeError> {
        self.git_in_repo("add", ["add", "-A"])?;

        let git = self.git_path()?;
        let diff_req = RunRequest::new(git, &self.clone_path).args(["diff", "--cached", "--quiet"]);
        if self.runner.run(&diff_req)?.success() {
            return Ok(false);
        }

        self.git_in_repo("commit", ["commit", "-m", message])?;
        Ok(true)
    }

    pub fn get_commit_hash(&self, reference: &str) -> Result<String, WorktreeError> {
        Ok(self
            .git_in_repo("rev-parse", ["rev-parse", reference])?
            .trim()
            .to_string())
    }

    pub fn get_current_branch(&self) -> Result<String, WorktreeError> {
        Ok(self
            .git_in_repo("rev-parse", ["rev-parse", "--abbrev-ref", "HEAD"])?
            .trim()
            .to_string())
    }

    /// Restore `path` from HEAD, discarding any working-tree modification.
    pub fn checkout_file(&self, path: &str) -> Result<(), WorktreeError> {
        self.git_in_repo("checkout --", ["checkout", "HEAD", "--", path])?;
        Ok(())
    }

    /// Discard working tree and index to `reference`. Pass `{hash}~1` for
    /// per-commit rollback.
    pub fn reset_hard(&self, reference: &str) -> Result<(), WorktreeError> {
        self.git_in_repo("reset --hard", ["reset", "--hard", reference])?;
        Ok(())
    }

    pub fn cherry_pick(&self, hash: &str) -> Result<(), WorktreeError> {
        self.git_in_repo("cherry-pick", ["cherry-pick", hash])?;
        Ok(())
    }

    /// Repo-relative paths touched by `hash`, used to scope per-translation-unit
    /// validation of a cherry-picked commit.
    pub fn changed_files(&self, hash: &str) -> Result<Vec<String>, WorktreeError> {
        let out = self.git_in_repo(
            "diff-tree",
            ["diff-tree", "--no-commit-id", "--name-only", "-r", hash],
        )?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    /// Contents of `path` as it existed at `reference`, without touching the
    /// working tree. Used to fetch a pre-cherry-pick baseline for validation.
    pub fn read_file_at(&self, reference: &str, path: &str) -> Result<String, WorktreeError> {
        self.git_in_repo("show", ["show", &format!("{reference}:{path}")])
    }

    /// Collapse all commits on `atomic` since its fork from `target` into a
    /// single commit on `target`. Returns the new HEAD sha.
    pub fn squash_and_rebase(
        &self,
        atomic: &str,
        target: &str,
        message: &str,
    ) -> Result<String, WorktreeError> {
        self.checkout_branch(target, false)?;
        self.git_in_repo("merge --squash", ["merge", "--squash", "--no-commit", atomic])?;
        self.git_in_repo("commit", ["commit", "-m", message])?;
        self.get_commit_hash("HEAD")
    }

    pub fn push(&self, branch: Option<&str>) -> Result<(), WorktreeError> {
        let target = match branch {
            Some(b) => b.to_string(),
            None => self.get_current_branch()?,
        };
        self.git_in_repo("push", ["push", "origin", target.as_str()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_bare_origin_and_clone() -> (tempfile::TempDir, tempfile::TempDir) {
        let origin_dir = tempfile::TempDir::new().unwrap();
        let runner = ProcessRunner::new();
        let git = resolve_executable("git", "GIT_PATH").expect("git must be on PATH for tests");

        runner
            .run(&RunRequest::new(&git, origin_dir.path()).args(["init", "--initial-branch=main"]))
            .unwrap();
        std::fs::write(origin_dir.path().join("a.txt"), "hello\n").unwrap();
        runner
            .run(&RunRequest::new(&git, origin_dir.path()).args(["add", "-A"]))
            .unwrap();
        runner
            .run(
                &RunRequest::new(&git, origin_dir.path())
                    .args(["-c", "user.email=t@t.com", "-c", "user.name=t", "commit", "-m", "init"]),
            )
            .unwrap();

        let clone_dir = tempfile::TempDir::new().unwrap();
        (origin_dir, clone_dir)
    }

    #[test]
    fn ensure_cloned_then_prepare_work_branch() {
        let (origin, clone_dir) = init_bare_origin_and_clone();
        let clone_path = clone_dir.path().join("repo");
        let wt = Worktree::new(
            &clone_path,
            origin.path().to_string_lossy().to_string(),
            None,
        );

        wt.ensure_cloned().unwrap();
        wt.prepare_work_branch().unwrap();
        assert_eq!(wt.get_current_branch().unwrap(), WORK_BRANCH);

        // second call is a no-op, not a re-clone
        wt.ensure_cloned().unwrap();
    }

    #[test]
    fn commit_returns_false_when_nothing_changed() {
        let (origin, clone_dir) = init_bare_origin_and_clone();
        let clone_path = clone_dir.path().join("repo");
        let wt = Worktree::new(&clone_path, origin.path().to_string_lossy().to_string(), None);
        wt.ensure_cloned().unwrap();
        wt.prepare_work_branch().unwrap();

        assert!(!wt.commit("no changes").unwrap());
    }

    #[test]
    fn atomic_branch_rollback_restores_file_content() {
        let (origin, clone_dir) = init_bare_origin_and_clone();
        let clone_path = clone_dir.path().join("repo");
        let wt = Worktree::new(&clone_path, origin.path().to_string_lossy().to_string(), None);
        wt.ensure_cloned().unwrap();
        wt.prepare_work_branch().unwrap();

        let atomic = wt.create_atomic_branch("req-1").unwrap();
        std::fs::write(clone_path.join("a.txt"), "changed\n").unwrap();
        assert!(wt.commit("change a.txt").unwrap());
        let commit_hash = wt.get_commit_hash("HEAD").unwrap();

        wt.reset_hard(&format!("{commit_hash}~1")).unwrap();
        let content = std::fs::read_to_string(clone_path.join("a.txt")).unwrap();
        assert_eq!(content, "hello\n");

        wt.checkout_branch(WORK_BRANCH, false).unwrap();
        wt.delete_branch(&atomic, true).unwrap();
    }
}
