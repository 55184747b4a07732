use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utils::text::repo_name_from_url as derive_name;
use uuid::Uuid;

/// On-disk counterpart of a repository the engine can operate on. Not part
/// of the validated core; exists only so the HTTP boundary has something to
/// CRUD against and the engine has a source for clone URL / post-checkout
/// hook / build commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub post_checkout: Option<String>,
    pub build_command: Option<String>,
    pub single_tu_command: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogueFile {
    repos: Vec<RepoConfig>,
}

/// Fields a caller may set on create; `name` is derived from `url` when absent.
#[derive(Debug, Deserialize)]
pub struct NewRepo {
    pub url: String,
    pub post_checkout: Option<String>,
    pub build_command: Option<String>,
    pub single_tu_command: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepoUpdate {
    pub post_checkout: Option<String>,
    pub build_command: Option<String>,
    pub single_tu_command: Option<String>,
}

/// In-memory catalogue backed by `{workspace}/repos.json`, loaded once at
/// startup and rewritten after every mutation. Mirrors the load-or-default,
/// then save-on-write shape used for small JSON-backed settings files.
pub struct Catalogue {
    path: PathBuf,
    repos: Mutex<Vec<RepoConfig>>,
}

impl Catalogue {
    pub fn load(workspace_root: &Path) -> std::io::Result<Self> {
        let path = workspace_root.join("repos.json");
        let file = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => CatalogueFile::default(),
        };
        Ok(Self { path, repos: Mutex::new(file.repos) })
    }

    fn save(&self, repos: &[RepoConfig]) -> std::io::Result<()> {
        let file = CatalogueFile { repos: repos.to_vec() };
        let raw = serde_json::to_string_pretty(&file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, raw)
    }

    pub fn list(&self) -> Vec<RepoConfig> {
        self.repos.lock().unwrap().clone()
    }

    pub fn create(&self, new_repo: NewRepo) -> std::io::Result<RepoConfig> {
        let name = derive_name(&new_repo.url);
        let repo = RepoConfig {
            id: Uuid::new_v4(),
            url: new_repo.url,
            name,
            post_checkout: new_repo.post_checkout,
            build_command: new_repo.build_command,
            single_tu_command: new_repo.single_tu_command,
            created_at: Utc::now(),
        };
        let mut repos = self.repos.lock().unwrap();
        repos.push(repo.clone());
        self.save(&repos)?;
        Ok(repo)
    }

    pub fn update(&self, id: Uuid, update: RepoUpdate) -> std::io::Result<Option<RepoConfig>> {
        let mut repos = self.repos.lock().unwrap();
        let Some(repo) = repos.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if update.post_checkout.is_some() {
            repo.post_checkout = update.post_checkout;
        }
        if update.build_command.is_some() {
            repo.build_command = update.build_command;
        }
        if update.single_tu_command.is_some() {
            repo.single_tu_command = update.single_tu_command;
        }
        let updated = repo.clone();
        self.save(&repos)?;
        Ok(Some(updated))
    }

    pub fn delete(&self, id: Uuid) -> std::io::Result<bool> {
        let mut repos = self.repos.lock().unwrap();
        let before = repos.len();
        repos.retain(|r| r.id != id);
        let removed = repos.len() != before;
        if removed {
            self.save(&repos)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_derives_name_from_url_and_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let catalogue = Catalogue::load(dir.path()).unwrap();
        let repo = catalogue
            .create(NewRepo {
                url: "https://example.com/org/widget-lib.git".to_string(),
                post_checkout: None,
                build_command: None,
                single_tu_command: None,
            })
            .unwrap();
        assert_eq!(repo.name, "widget-lib");

        let reloaded = Catalogue::load(dir.path()).unwrap();
        assert_eq!(reloaded.list().len(), 1);
        assert_eq!(reloaded.list()[0].id, repo.id);
    }

    #[test]
    fn update_leaves_unset_fields_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let catalogue = Catalogue::load(dir.path()).unwrap();
        let repo = catalogue
            .create(NewRepo {
                url: "https://example.com/org/widget-lib".to_string(),
                post_checkout: Some("scripts/setup.sh".to_string()),
                build_command: None,
                single_tu_command: None,
            })
            .unwrap();

        let updated = catalogue
            .update(repo.id, RepoUpdate { build_command: Some("make".to_string()), ..Default::default() })
            .unwrap()
            .unwrap();
        assert_eq!(updated.post_checkout.as_deref(), Some("scripts/setup.sh"));
        assert_eq!(updated.build_command.as_deref(), Some("make"));
    }

    #[test]
    fn delete_removes_and_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let catalogue = Catalogue::load(dir.path()).unwrap();
        let repo = catalogue
            .create(NewRepo { url: "https://example.com/org/x".to_string(), post_checkout: None, build_command: None, single_tu_command: None })
            .unwrap();
        assert!(catalogue.delete(repo.id).unwrap());
        assert!(!catalogue.delete(repo.id).unwrap());
    }
}
