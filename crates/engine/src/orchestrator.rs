use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use compiler::{CompilerDriver, CompilerVariant};
use refactor::{CommitDescriptor, RefactoringArgs};
use repo::Worktree;
use symbols::SymbolTable;
use validator::{Validator, ValidatorVariant};

use crate::{
    error::EngineError,
    model::{EngineConfig, EngineResult, ModRequest, RequestStatus, SourceType, ValidationOutcome},
};

/// Orchestrates one request end to end: prepare the worktree, ensure the
/// symbol index, dispatch by source type, apply/validate/keep-or-rollback
/// each candidate, then finalize. Execution inside a request is strictly
/// sequential. On abort (an `Err`), best-effort cleanup returns the
/// worktree to the work branch and force-deletes the atomic branch before
/// the error propagates.
pub fn run_request(
    cfg: &EngineConfig,
    request: &ModRequest,
    post_checkout: Option<&str>,
    cancelled: &AtomicBool,
) -> Result<EngineResult, EngineError> {
    let clone_path = cfg.repo_clone_path(&request.repo_name);
    let worktree = Worktree::new(clone_path, request.repo_url.clone(), post_checkout.map(str::to_string));

    worktree.ensure_cloned()?;
    worktree.prepare_work_branch()?;

    let mut symbols = SymbolTable::new(&worktree.clone_path);
    symbols.load_from_doxygen()?;

    let compiler = CompilerVariant::by_id(&cfg.compiler_id)
        .ok_or_else(|| EngineError::UnknownCompiler(cfg.compiler_id.clone()))?;
    let prelude_dir = cfg.workspace_root.join("prelude");
    ::compiler::prelude::ensure_prelude(&prelude_dir)?;

    let atomic_branch = worktree.create_atomic_branch(&request.id.to_string())?;

    let outcome = match request.source_type {
        SourceType::Builtin => run_builtin(
            &worktree,
            &mut symbols,
            &compiler,
            &prelude_dir,
            request,
            cancelled,
            cfg.optimization_batch_threshold,
        ),
        SourceType::Commit => run_commit(&worktree, &mut symbols, &compiler, &prelude_dir, request),
    };

    match outcome {
        Ok((accepted, rejected, validation_results)) => {
            finalize(&worktree, &atomic_branch, &accepted, request.id)?;
            Ok(build_result(request, accepted, rejected, validation_results))
        }
        Err(e) => {
            abort_cleanup(&worktree, &atomic_branch);
            Err(e)
        }
    }
}

type RunOutcome = (Vec<String>, Vec<String>, Vec<ValidationOutcome>);

fn run_builtin(
    worktree: &Worktree,
    symbols: &mut SymbolTable,
    compiler: &CompilerVariant,
    prelude_dir: &Path,
    request: &ModRequest,
    cancelled: &AtomicBool,
    batch_threshold: Option<f64>,
) -> Result<RunOutcome, EngineError> {
    let mod_id = request
        .mod_instance
        .as_deref()
        .ok_or_else(|| EngineError::Invariant("builtin request missing mod_instance".to_string()))?;
    let planner = mods::by_id(mod_id).ok_or_else(|| EngineError::UnknownMod(mod_id.to_string()))?;
    let plan = planner.generate_refactorings(symbols)?;

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    let mut validation_results = Vec::new();

    let mut i = 0;
    while i < plan.len() {
        if cancelled.load(Ordering::Relaxed) {
            tracing::info!(request_id = %request.id, "cancellation observed, finalizing early");
            break;
        }

        let end = match batch_threshold {
            Some(threshold) => batch_end_index(&plan, i, threshold),
            None => i + 1,
        };

        apply_and_validate(
            worktree,
            symbols,
            compiler,
            prelude_dir,
            &plan[i..end],
            &mut accepted,
            &mut rejected,
            &mut validation_results,
        )?;
        i = end;
    }

    Ok((accepted, rejected, validation_results))
}

/// Greedily extends a batch starting at `start` while the product of the
/// included refactorings' declared probabilities stays above `threshold`,
/// per the "batch while confident" rule: apply a run of low-risk changes
/// together and validate it in one compile instead of one per change. An
/// unknown refactoring id is treated as zero-confidence so it always forms
/// its own singleton batch (and reports through the normal unknown-id path).
fn batch_end_index(plan: &[(String, RefactoringArgs)], start: usize, threshold: f64) -> usize {
    let mut product = 1.0;
    let mut end = start;
    while end < plan.len() {
        let (refactoring_id, args) = &plan[end];
        let probability = refactor::by_id(refactoring_id)
            .map(|r| r.declared_probability(args))
            .unwrap_or(0.0);
        let candidate_product = product * probability;
        if end > start && candidate_product <= threshold {
            break;
        }
        product = candidate_product;
        end += 1;
        if product <= threshold {
            break;
        }
    }
    end.max(start + 1)
}

/// One refactoring already applied and committed, awaiting validation as
/// part of a batch.
struct PendingCommit {
    commit: CommitDescriptor,
    file_path: std::path::PathBuf,
}

/// Applies a batch of planned refactorings together and validates the
/// combined diff once per distinct file. If the batch as a whole passes,
/// every member is accepted for the price of one compile per touched file.
/// If it fails, the batch is discarded wholesale and bisected: split in
/// half, reset, and recurse, bottoming out at single-item batches that
/// behave exactly like `apply_one`. This keeps the accepted/rejected set
/// identical to applying items one at a time; batching only changes how
/// many times the compiler runs.
#[allow(clippy::too_many_arguments)]
fn apply_and_validate(
    worktree: &Worktree,
    symbols: &mut SymbolTable,
    compiler: &CompilerVariant,
    prelude_dir: &Path,
    items: &[(String, RefactoringArgs)],
    accepted: &mut Vec<String>,
    rejected: &mut Vec<String>,
    validation_results: &mut Vec<ValidationOutcome>,
) -> Result<(), EngineError> {
    if items.is_empty() {
        return Ok(());
    }
    if items.len() == 1 {
        let (refactoring_id, args) = &items[0];
        return apply_one(
            worktree,
            symbols,
            compiler,
            prelude_dir,
            refactoring_id,
            args,
            accepted,
            rejected,
            validation_results,
        );
    }

    let baseline_hash = worktree.get_commit_hash("HEAD")?;
    let mut pending = Vec::new();
    for (refactoring_id, args) in items {
        if let Some(pc) = apply_commit_only(worktree, symbols, refactoring_id, args)? {
            pending.push(pc);
        }
    }
    if pending.is_empty() {
        return Ok(());
    }

    if validate_pending(worktree, compiler, prelude_dir, &baseline_hash, &pending)? {
        for pc in &pending {
            accepted.push(pc.commit.message.clone());
        }
        for file in distinct_files(&pending) {
            validation_results.push(ValidationOutcome {
                file: file.clone(),
                passed: true,
            });
        }
        return Ok(());
    }

    worktree.reset_hard(&baseline_hash)?;
    for pc in &pending {
        symbols.invalidate_file(pc.file_path.clone());
    }

    let mid = items.len() / 2;
    apply_and_validate(
        worktree,
        symbols,
        compiler,
        prelude_dir,
        &items[..mid],
        accepted,
        rejected,
        validation_results,
    )?;
    apply_and_validate(
        worktree,
        symbols,
        compiler,
        prelude_dir,
        &items[mid..],
        accepted,
        rejected,
        validation_results,
    )?;
    Ok(())
}

fn apply_commit_only(
    worktree: &Worktree,
    symbols: &mut SymbolTable,
    refactoring_id: &str,
    args: &RefactoringArgs,
) -> Result<Option<PendingCommit>, EngineError> {
    let Some(refactoring) = refactor::by_id(refactoring_id) else {
        tracing::error!(refactoring_id, "unknown refactoring id emitted by mod, skipping");
        return Ok(None);
    };
    let Some(symbol) = symbols.get_symbol(&args.symbol, false)?.cloned() else {
        return Ok(None);
    };
    match refactoring.apply(worktree, symbols, args) {
        Ok(Some(commit)) => Ok(Some(PendingCommit {
            commit,
            file_path: symbol.file_path,
        })),
        Ok(None) => Ok(None),
        Err(e) => {
            tracing::warn!(%e, symbol = %args.symbol, "refactoring application failed, skipping");
            Ok(None)
        }
    }
}

fn distinct_files(pending: &[PendingCommit]) -> Vec<&std::path::PathBuf> {
    let mut files: Vec<&std::path::PathBuf> = Vec::new();
    for pc in pending {
        if !files.iter().any(|f| **f == pc.file_path) {
            files.push(&pc.file_path);
        }
    }
    files
}

/// Validates a whole batch at once: for each distinct file touched by any
/// member, compiles the pre-batch content (fetched from git history at
/// `baseline_hash`, never requiring a mid-batch checkout) against the
/// current on-disk content, using the strictest validator any touching
/// commit declared.
fn validate_pending(
    worktree: &Worktree,
    compiler: &CompilerVariant,
    prelude_dir: &Path,
    baseline_hash: &str,
    pending: &[PendingCommit],
) -> Result<bool, EngineError> {
    for file in distinct_files(pending) {
        let validator_id = if pending
            .iter()
            .any(|pc| pc.file_path == *file && pc.commit.validator_id == "asm_o3")
        {
            "asm_o3"
        } else {
            "asm_o0"
        };
        let validator = ValidatorVariant::by_id(validator_id).expect("asm_o0/asm_o3 are always registered");

        let rel_path = file.to_string_lossy();
        let Ok(baseline_content) = worktree.read_file_at(baseline_hash, &rel_path) else {
            continue; // file newly created within the batch, nothing to compare
        };
        let source_path = worktree.clone_path.join(file);
        let candidate_content = fs::read_to_string(&source_path)?;

        fs::write(&source_path, &baseline_content)?;
        let baseline = compiler.compile_file(&source_path, validator.optimization_level(), prelude_dir)?;

        fs::write(&source_path, &candidate_content)?;
        let candidate = compiler.compile_file(&source_path, validator.optimization_level(), prelude_dir)?;

        if !(baseline.succeeded() && candidate.succeeded() && validator.validate(&baseline.asm_text, &candidate.asm_text)) {
            return Ok(false);
        }
    }
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
fn apply_one(
    worktree: &Worktree,
    symbols: &mut SymbolTable,
    compiler: &CompilerVariant,
    prelude_dir: &Path,
    refactoring_id: &str,
    args: &RefactoringArgs,
    accepted: &mut Vec<String>,
    rejected: &mut Vec<String>,
    validation_results: &mut Vec<ValidationOutcome>,
) -> Result<(), EngineError> {
    let Some(refactoring) = refactor::by_id(refactoring_id) else {
        tracing::error!(refactoring_id, "unknown refactoring id emitted by mod, skipping");
        return Ok(());
    };

    let Some(symbol) = symbols.get_symbol(&args.symbol, false)?.cloned() else {
        return Ok(());
    };
    let original_content = fs::read_to_string(worktree.clone_path.join(&symbol.file_path))?;

    let commit = match refactoring.apply(worktree, symbols, args) {
        Ok(Some(commit)) => commit,
        Ok(None) => return Ok(()),
        Err(e) => {
            tracing::warn!(%e, symbol = %args.symbol, "refactoring application failed, skipping");
            return Ok(());
        }
    };

    let Some(validator) = ValidatorVariant::by_id(commit.validator_id) else {
        tracing::error!(validator_id = commit.validator_id, "unknown validator id, rolling back");
        commit.rollback(worktree)?;
        rejected.push(commit.message.clone());
        symbols.invalidate_file(symbol.file_path.clone());
        return Ok(());
    };

    let source_path = worktree.clone_path.join(&symbol.file_path);
    fs::write(&source_path, &original_content)?;
    let baseline = compiler.compile_file(&source_path, validator.optimization_level(), prelude_dir)?;

    worktree.checkout_file(&symbol.file_path.to_string_lossy())?;
    let candidate = compiler.compile_file(&source_path, validator.optimization_level(), prelude_dir)?;

    let accepted_by_validator =
        baseline.succeeded() && candidate.succeeded() && validator.validate(&baseline.asm_text, &candidate.asm_text);

    validation_results.push(ValidationOutcome {
        file: symbol.file_path.clone(),
        passed: accepted_by_validator,
    });

    if accepted_by_validator {
        accepted.push(commit.message.clone());
    } else {
        commit.rollback(worktree)?;
        rejected.push(commit.message.clone());
        symbols.invalidate_file(symbol.file_path.clone());
    }
    Ok(())
}

fn run_commit(
    worktree: &Worktree,
    symbols: &mut SymbolTable,
    compiler: &CompilerVariant,
    prelude_dir: &Path,
    request: &ModRequest,
) -> Result<RunOutcome, EngineError> {
    let hash = request
        .commit_hash
        .as_deref()
        .ok_or_else(|| EngineError::Invariant("commit request missing commit_hash".to_string()))?;

    let parent = worktree.get_commit_hash("HEAD")?;
    if worktree.cherry_pick(hash).is_err() {
        worktree.reset_hard(&parent)?;
        return Ok((Vec::new(), vec![format!("cherry-pick {hash}")], Vec::new()));
    }

    let changed_files = worktree.changed_files(hash)?;
    let validator = ValidatorVariant::by_id("asm_o0").expect("asm_o0 is always registered");
    let mut validation_results = Vec::new();
    let mut all_passed = true;

    for file in &changed_files {
        let source_path = worktree.clone_path.join(file);
        let baseline_content = match worktree.read_file_at(&parent, file) {
            Ok(content) => content,
            Err(_) => continue, // file newly created by the commit, nothing to compare
        };

        fs::write(&source_path, &baseline_content)?;
        let baseline = compiler.compile_file(&source_path, validator.optimization_level(), prelude_dir)?;

        worktree.checkout_file(file)?;
        let candidate = compiler.compile_file(&source_path, validator.optimization_level(), prelude_dir)?;

        let passed =
            baseline.succeeded() && candidate.succeeded() && validator.validate(&baseline.asm_text, &candidate.asm_text);
        validation_results.push(ValidationOutcome {
            file: std::path::PathBuf::from(file),
            passed,
        });
        all_passed &= passed;
    }

    if all_passed {
        let message = format!("cherry-pick {hash}");
        symbols.refresh_dirty_files()?;
        Ok((vec![message], Vec::new(), validation_results))
    } else {
        worktree.reset_hard(&parent)?;
        for file in &changed_files {
            symbols.invalidate_file(std::path::PathBuf::from(file));
        }
        Ok((Vec::new(), vec![format!("cherry-pick {hash}")], validation_results))
    }
}

fn finalize(
    worktree: &Worktree,
    atomic_branch: &str,
    accepted: &[String],
    request_id: uuid::Uuid,
) -> Result<(), EngineError> {
    if accepted.is_empty() {
        worktree.checkout_branch(repo::WORK_BRANCH, false)?;
        worktree.delete_branch(atomic_branch, true)?;
    } else {
        let message = format!("Squash {} accepted change(s) from request {request_id}", accepted.len());
        worktree.squash_and_rebase(atomic_branch, repo::WORK_BRANCH, &message)?;
        worktree.delete_branch(atomic_branch, true)?;
        worktree.push(Some(repo::WORK_BRANCH))?;
    }
    Ok(())
}

fn abort_cleanup(worktree: &Worktree, atomic_branch: &str) {
    if worktree.checkout_branch(repo::WORK_BRANCH, false).is_ok() {
        let _ = worktree.delete_branch(atomic_branch, true);
    }
}

fn build_result(
    request: &ModRequest,
    accepted: Vec<String>,
    rejected: Vec<String>,
    validation_results: Vec<ValidationOutcome>,
) -> EngineResult {
    let status = if accepted.is_empty() {
        RequestStatus::Failed
    } else if rejected.is_empty() {
        RequestStatus::Success
    } else {
        RequestStatus::Partial
    };
    let message = match status {
        RequestStatus::Success => format!("{} commit(s) accepted", accepted.len()),
        RequestStatus::Partial => format!("{} accepted, {} rejected", accepted.len(), rejected.len()),
        RequestStatus::Failed => "no changes accepted".to_string(),
        _ => unreachable!("terminal status only"),
    };

    EngineResult {
        request_id: request.id,
        status,
        message,
        accepted_commits: accepted,
        rejected_commits: rejected,
        validation_results,
        timestamp: chrono::Utc::now(),
    }
}
