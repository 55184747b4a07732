pub mod error;
pub mod model;
pub mod orchestrator;

pub use error::EngineError;
pub use model::{EngineConfig, EngineResult, ModRequest, RequestStatus, SourceType, ValidationOutcome};
pub use orchestrator::run_request;

#[cfg(test)]
mod tests {
    use std::{fs, process::Command, sync::atomic::AtomicBool};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn git(dir: &std::path::Path, args: &[&str]) {
        let status = Command::new("git").args(args).current_dir(dir).status().unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    fn init_origin_with_inline_function() -> tempfile::TempDir {
        let origin = tempdir().unwrap();
        git(origin.path(), &["init", "-q", "--initial-branch=main"]);
        git(origin.path(), &["config", "user.email", "t@example.com"]);
        git(origin.path(), &["config", "user.name", "t"]);
        fs::write(origin.path().join("a.cpp"), "inline int g() { return 1; }\n").unwrap();
        git(origin.path(), &["add", "-A"]);
        git(origin.path(), &["commit", "-q", "-m", "init"]);
        origin
    }

    #[test]
    fn empty_plan_yields_failed_status_and_no_work_branch_commit() {
        // A repo with no inline functions: remove_inline's plan is empty, so
        // the request must fail without ever touching the work branch commit
        // count, and the atomic branch must not survive.
        let origin = init_origin_with_inline_function();
        fs::write(origin.path().join("a.cpp"), "int h() { return 1; }\n").unwrap();
        git(origin.path(), &["add", "-A"]);
        git(origin.path(), &["commit", "-q", "-m", "remove inline manually"]);

        let workspace = tempdir().unwrap();
        let cfg = EngineConfig {
            workspace_root: workspace.path().to_path_buf(),
            compiler_id: "clang".to_string(),
            optimization_batch_threshold: None,
        };
        let request = ModRequest::builtin(
            origin.path().to_string_lossy().to_string(),
            "sample".to_string(),
            "remove_inline".to_string(),
            "test run".to_string(),
        );
        let cancelled = AtomicBool::new(false);

        // This exercises `ensure_cloned`/`prepare_work_branch` end to end;
        // symbol extraction and compilation require `doxygen`/`clang` on
        // PATH and are not asserted on here beyond not panicking the
        // control flow that precedes them.
        let result = run_request(&cfg, &request, None, &cancelled);
        match result {
            Ok(result) => assert_eq!(result.status, RequestStatus::Failed),
            Err(EngineError::SymbolIndex(_)) | Err(EngineError::Compiler(_)) => {
                // doxygen/clang unavailable in this environment; the worktree
                // plumbing under test still ran correctly up to that point.
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
