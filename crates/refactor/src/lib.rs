mod add_qualifier;
mod remove_qualifier;

pub mod commit;
pub mod error;
pub mod qualifiers;
pub mod refactoring;
pub mod source_edit;

pub use add_qualifier::AddFunctionQualifier;
pub use commit::CommitDescriptor;
pub use error::RefactorError;
pub use refactoring::{Refactoring, RefactoringArgs};
pub use remove_qualifier::RemoveFunctionQualifier;

/// Stable-id lookup for the reference refactorings. Not a closed
/// `enum_dispatch` family like the compiler/validator registries: new
/// refactorings are added by any crate that links this one, the engine
/// dispatches on whatever the mod returns.
pub fn by_id(id: &str) -> Option<Box<dyn Refactoring>> {
    match id {
        "add_function_qualifier" => Some(Box::new(AddFunctionQualifier)),
        "remove_function_qualifier" => Some(Box::new(RemoveFunctionQualifier)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use repo::Worktree;
    use symbols::SymbolTable;
    use tempfile::tempdir;

    use super::*;

    fn init_repo() -> (tempfile::TempDir, Worktree) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        fs::create_dir_all(&repo_path).unwrap();
        std::process::Command::new("git").arg("init").arg("-q").current_dir(&repo_path).status().unwrap();
        std::process::Command::new("git")
            .args(["config", "user.email", "t@example.com"])
            .current_dir(&repo_path)
            .status()
            .unwrap();
        std::process::Command::new("git")
            .args(["config", "user.name", "t"])
            .current_dir(&repo_path)
            .status()
            .unwrap();
        fs::write(repo_path.join("b.h"), "struct B {\n  virtual void f();\n};\n").unwrap();
        std::process::Command::new("git").args(["add", "."]).current_dir(&repo_path).status().unwrap();
        std::process::Command::new("git")
            .args(["commit", "-q", "-m", "init"])
            .current_dir(&repo_path)
            .status()
            .unwrap();

        let worktree = Worktree::new(repo_path, "unused", None);
        (dir, worktree)
    }

    fn symbol_table_with(repo_root: &std::path::Path) -> SymbolTable {
        use std::collections::HashSet;
        use symbols::{Symbol, SymbolKind};

        let mut table = SymbolTable::new(repo_root);
        let mut qualifiers = HashSet::new();
        qualifiers.insert("virtual".to_string());
        table.insert(Symbol {
            kind: SymbolKind::Function,
            local_name: "f".to_string(),
            qualified_name: "B::f".to_string(),
            file_path: std::path::PathBuf::from("b.h"),
            start_line: 2,
            end_line: 2,
            prototype: "virtual void B::f();".to_string(),
            is_member: true,
            qualifiers,
        });
        table
    }

    #[test]
    fn add_override_commits_expected_message() {
        let (_dir, worktree) = init_repo();
        let mut table = symbol_table_with(&worktree.clone_path);
        let refactoring = AddFunctionQualifier;
        let args = RefactoringArgs {
            symbol: "B::f".to_string(),
            qualifier: "override".to_string(),
        };
        let commit = refactoring.apply(&worktree, &mut table, &args).unwrap();
        let commit = commit.expect("override should apply");
        assert_eq!(commit.validator_id, "asm_o0");
        assert!(commit.message.starts_with("Add override on B::f"));

        let contents = fs::read_to_string(worktree.clone_path.join("b.h")).unwrap();
        assert!(contents.contains("f() override;"));
    }

    #[test]
    fn add_qualifier_already_present_is_null() {
        let (_dir, worktree) = init_repo();
        let mut table = symbol_table_with(&worktree.clone_path);
        let refactoring = AddFunctionQualifier;
        let args = RefactoringArgs {
            symbol: "B::f".to_string(),
            qualifier: "virtual".to_string(),
        };
        assert!(refactoring.apply(&worktree, &mut table, &args).unwrap().is_none());
    }
}
