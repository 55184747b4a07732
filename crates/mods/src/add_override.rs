use refactor::RefactoringArgs;
use symbols::{SymbolIndexError, SymbolTable};

use crate::mod_trait::{Mod, PlannedRefactoring};

/// Adds `override` to every member function whose prototype carries
/// `virtual` but not `override` yet.
pub struct AddOverride;

impl Mod for AddOverride {
    fn id(&self) -> &'static str {
        "add_override"
    }

    fn display_name(&self) -> &'static str {
        "Add Override"
    }

    fn generate_refactorings(
        &self,
        symbols: &mut SymbolTable,
    ) -> Result<Vec<PlannedRefactoring>, SymbolIndexError> {
        let refactorings = symbols
            .get_all_symbols(false)?
            .into_iter()
            .filter(|s| s.is_member && s.has_qualifier("virtual") && !s.has_qualifier("override"))
            .map(|s| {
                (
                    "add_function_qualifier".to_string(),
                    RefactoringArgs {
                        symbol: s.qualified_name.clone(),
                        qualifier: "override".to_string(),
                    },
                )
            })
            .collect();
        Ok(refactorings)
    }
}
