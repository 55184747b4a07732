mod add_override;
mod mod_trait;
mod remove_inline;

pub use add_override::AddOverride;
pub use mod_trait::{Mod, PlannedRefactoring};
pub use remove_inline::RemoveInline;

/// Stable-id registry lookup, used by the HTTP boundary's
/// `GET /api/available/mods` and by `ModRequest` dispatch.
pub fn by_id(id: &str) -> Option<Box<dyn Mod>> {
    match id {
        "remove_inline" => Some(Box::new(RemoveInline)),
        "add_override" => Some(Box::new(AddOverride)),
        _ => None,
    }
}

pub fn available() -> Vec<(&'static str, &'static str)> {
    vec![
        (RemoveInline.id(), RemoveInline.display_name()),
        (AddOverride.id(), AddOverride.display_name()),
    ]
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, path::PathBuf};

    use symbols::{Symbol, SymbolKind, SymbolTable};

    use super::*;

    fn symbol(name: &str, qualifiers: &[&str], is_member: bool) -> Symbol {
        Symbol {
            kind: SymbolKind::Function,
            local_name: name.to_string(),
            qualified_name: name.to_string(),
            file_path: PathBuf::from("a.h"),
            start_line: 1,
            end_line: 1,
            prototype: String::new(),
            is_member,
            qualifiers: qualifiers.iter().map(|q| q.to_string()).collect::<HashSet<_>>(),
        }
    }

    #[test]
    fn remove_inline_only_targets_inline_functions() {
        let mut table = SymbolTable::new("/repo");
        table.insert(symbol("g", &["inline"], false));
        table.insert(symbol("h", &[], false));

        let plan = RemoveInline.generate_refactorings(&mut table).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].1.symbol, "g");
    }

    #[test]
    fn add_override_skips_symbols_already_overriding() {
        let mut table = SymbolTable::new("/repo");
        table.insert(symbol("D::f", &["virtual"], true));
        table.insert(symbol("D::g", &["virtual", "override"], true));
        table.insert(symbol("free_fn", &["virtual"], false));

        let plan = AddOverride.generate_refactorings(&mut table).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].1.symbol, "D::f");
    }

    #[test]
    fn by_id_resolves_known_mods() {
        assert!(by_id("remove_inline").is_some());
        assert!(by_id("add_override").is_some());
        assert!(by_id("nonexistent").is_none());
    }
}
