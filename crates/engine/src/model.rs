use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which half of a request's contract is populated: a registered mod, or a
/// single user-supplied commit to cherry-pick and validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Builtin,
    Commit,
}

/// Identity and intent for one submission. Exactly one of `mod_instance` /
/// `commit_hash` is set, consistent with `source_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModRequest {
    pub id: Uuid,
    pub repo_url: String,
    pub repo_name: String,
    pub description: String,
    pub source_type: SourceType,
    pub mod_instance: Option<String>,
    pub commit_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ModRequest {
    pub fn builtin(repo_url: String, repo_name: String, mod_id: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            repo_url,
            repo_name,
            description,
            source_type: SourceType::Builtin,
            mod_instance: Some(mod_id),
            commit_hash: None,
            created_at: Utc::now(),
        }
    }

    pub fn commit(repo_url: String, repo_name: String, commit_hash: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            repo_url,
            repo_name,
            description,
            source_type: SourceType::Commit,
            mod_instance: None,
            commit_hash: Some(commit_hash),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Queued,
    Processing,
    Success,
    Partial,
    Failed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub file: PathBuf,
    pub passed: bool,
}

/// Progress record for one request. Status only ever moves forward through
/// `queued -> processing -> {success, partial, failed, error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResult {
    pub request_id: Uuid,
    pub status: RequestStatus,
    pub message: String,
    pub accepted_commits: Vec<String>,
    pub rejected_commits: Vec<String>,
    pub validation_results: Vec<ValidationOutcome>,
    pub timestamp: DateTime<Utc>,
}

impl EngineResult {
    pub fn queued(request_id: Uuid) -> Self {
        Self {
            request_id,
            status: RequestStatus::Queued,
            message: "queued".to_string(),
            accepted_commits: Vec::new(),
            rejected_commits: Vec::new(),
            validation_results: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn processing(request_id: Uuid) -> Self {
        Self {
            status: RequestStatus::Processing,
            message: "processing".to_string(),
            timestamp: Utc::now(),
            ..Self::queued(request_id)
        }
    }
}

/// Process-wide configuration injected into the engine; never read from
/// ambient globals.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub workspace_root: PathBuf,
    pub compiler_id: String,
    /// Opt-in batching knob (`None` = validate every refactoring
    /// individually, the default). When set, the orchestrator greedily
    /// groups consecutive planned refactorings while the product of their
    /// declared probabilities stays above this threshold, validates the
    /// group once, and bisects on failure.
    pub optimization_batch_threshold: Option<f64>,
}

impl EngineConfig {
    pub fn repo_clone_path(&self, repo_name: &str) -> PathBuf {
        self.workspace_root.join("repos").join(repo_name)
    }
}
