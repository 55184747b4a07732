use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::{doxygen, error::SymbolIndexError, extractor::Extractor, model::Symbol};

/// In-memory symbol index for one repository checkout.
///
/// `invalidate_file` marks a file stale without touching the maps; the next
/// `auto_refresh` query re-runs extraction over the whole repository and
/// repopulates from scratch, so every caller downstream of a refresh sees a
/// fully consistent snapshot rather than a partially patched one.
pub struct SymbolTable {
    repo_root: PathBuf,
    by_qualified_name: HashMap<String, Symbol>,
    by_file: HashMap<PathBuf, HashSet<String>>,
    dirty: HashSet<PathBuf>,
}

impl SymbolTable {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            by_qualified_name: HashMap::new(),
            by_file: HashMap::new(),
            dirty: HashSet::new(),
        }
    }

    /// Load (or reload) the full index from the extractor's current XML dump.
    pub fn load_from_doxygen(&mut self) -> Result<(), SymbolIndexError> {
        let extractor = Extractor::new(&self.repo_root);
        let output_dir = extractor.ensure_generated()?;
        self.load_from_dir(&output_dir)
    }

    fn load_from_dir(&mut self, xml_dir: &Path) -> Result<(), SymbolIndexError> {
        self.by_qualified_name.clear();
        self.by_file.clear();
        self.dirty.clear();

        let entries = match fs::read_dir(xml_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("xml") {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            for symbol in doxygen::parse_file(&contents, &self.repo_root) {
                self.insert(symbol);
            }
        }
        Ok(())
    }

    /// Insert or replace a single symbol directly, bypassing extraction.
    /// Exposed for callers that seed a table from a source other than
    /// doxygen output (tests, the cherry-pick path's single-TU refresh).
    pub fn insert(&mut self, symbol: Symbol) {
        self.by_file
            .entry(symbol.file_path.clone())
            .or_default()
            .insert(symbol.qualified_name.clone());
        self.by_qualified_name.insert(symbol.qualified_name.clone(), symbol);
    }

    /// Mark `path` stale. Does not re-extract; callers see the last known
    /// symbols for this file until the next `auto_refresh` query.
    pub fn invalidate_file(&mut self, path: impl Into<PathBuf>) {
        self.dirty.insert(path.into());
    }

    /// Re-run extraction over the whole repository if anything is dirty.
    /// A no-op when the dirty set is empty.
    pub fn refresh_dirty_files(&mut self) -> Result<(), SymbolIndexError> {
        if self.dirty.is_empty() {
            return Ok(());
        }
        let extractor = Extractor::new(&self.repo_root);
        let output_dir = extractor.run()?;
        self.load_from_dir(&output_dir)
    }

    fn maybe_refresh(&mut self, auto_refresh: bool) -> Result<(), SymbolIndexError> {
        if auto_refresh {
            self.refresh_dirty_files()?;
        }
        Ok(())
    }

    pub fn get_symbol(
        &mut self,
        qualified_name: &str,
        auto_refresh: bool,
    ) -> Result<Option<&Symbol>, SymbolIndexError> {
        self.maybe_refresh(auto_refresh)?;
        Ok(self.by_qualified_name.get(qualified_name))
    }

    pub fn get_symbols_in_file(
        &mut self,
        path: &Path,
        auto_refresh: bool,
    ) -> Result<Vec<&Symbol>, SymbolIndexError> {
        self.maybe_refresh(auto_refresh)?;
        let names = self.by_file.get(path).cloned().unwrap_or_default();
        Ok(names
            .iter()
            .filter_map(|name| self.by_qualified_name.get(name))
            .collect())
    }

    pub fn get_all_symbols(&mut self, auto_refresh: bool) -> Result<Vec<&Symbol>, SymbolIndexError> {
        self.maybe_refresh(auto_refresh)?;
        Ok(self.by_qualified_name.values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SymbolKind;
    use std::collections::HashSet as Set;

    fn sample(name: &str, file: &str) -> Symbol {
        Symbol {
            kind: SymbolKind::Function,
            local_name: name.to_string(),
            qualified_name: name.to_string(),
            file_path: PathBuf::from(file),
            start_line: 1,
            end_line: 2,
            prototype: format!("void {name}();"),
            is_member: false,
            qualifiers: Set::new(),
        }
    }

    #[test]
    fn insert_and_query_by_file_and_name() {
        let mut table = SymbolTable::new("/repo");
        table.insert(sample("f", "a.cpp"));
        table.insert(sample("g", "a.cpp"));
        table.insert(sample("h", "b.cpp"));

        let in_a = table.get_symbols_in_file(Path::new("a.cpp"), false).unwrap();
        assert_eq!(in_a.len(), 2);

        let found = table.get_symbol("h", false).unwrap();
        assert!(found.is_some());
        assert_eq!(table.get_all_symbols(false).unwrap().len(), 3);
    }

    #[test]
    fn invalidate_without_refresh_keeps_stale_entries_visible() {
        let mut table = SymbolTable::new("/repo");
        table.insert(sample("f", "a.cpp"));
        table.invalidate_file("a.cpp");
        assert!(table.get_symbol("f", false).unwrap().is_some());
    }
}
