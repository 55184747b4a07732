use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/// The kinds of entity the extractor can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Class,
    Struct,
    Enum,
    Typedef,
    Variable,
    Namespace,
}

impl SymbolKind {
    pub fn from_doxygen_kind(kind: &str) -> Option<Self> {
        match kind {
            "function" => Some(Self::Function),
            "class" => Some(Self::Class),
            "struct" => Some(Self::Struct),
            "enum" => Some(Self::Enum),
            "typedef" => Some(Self::Typedef),
            "variable" => Some(Self::Variable),
            "namespace" => Some(Self::Namespace),
            _ => None,
        }
    }
}

/// Qualifiers a refactoring cares about, recognized by scanning prototype text.
/// Not exhaustive C++ grammar, just the keywords the reference refactorings
/// in the `refactor` crate add or remove.
pub const KNOWN_QUALIFIERS: &[&str] = &[
    "const",
    "noexcept",
    "constexpr",
    "inline",
    "override",
    "final",
    "static",
    "virtual",
];

#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub local_name: String,
    pub qualified_name: String,
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub prototype: String,
    pub is_member: bool,
    pub qualifiers: HashSet<String>,
}

impl Symbol {
    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers.iter().any(|q| q == qualifier)
    }

    pub(crate) fn derive_qualifiers(prototype: &str) -> HashSet<String> {
        KNOWN_QUALIFIERS
            .iter()
            .filter(|q| has_word(prototype, q))
            .map(|q| q.to_string())
            .collect()
    }
}

/// Word-boundary substring search; avoids "const" matching inside
/// "constexpr_helper" etc.
pub(crate) fn has_word(haystack: &str, word: &str) -> bool {
    haystack.split(|c: char| !c.is_alphanumeric() && c != '_').any(|tok| tok == word)
}

/// True if `path` (assumed absolute or repo-relative) falls inside `root`.
pub fn path_is_within(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
}
