use refactor::RefactoringArgs;
use symbols::{SymbolIndexError, SymbolTable};

use crate::mod_trait::{Mod, PlannedRefactoring};

/// Strips `inline` from every function whose prototype still carries it.
pub struct RemoveInline;

impl Mod for RemoveInline {
    fn id(&self) -> &'static str {
        "remove_inline"
    }

    fn display_name(&self) -> &'static str {
        "Remove Inline"
    }

    fn generate_refactorings(
        &self,
        symbols: &mut SymbolTable,
    ) -> Result<Vec<PlannedRefactoring>, SymbolIndexError> {
        let refactorings = symbols
            .get_all_symbols(false)?
            .into_iter()
            .filter(|s| s.has_qualifier("inline"))
            .map(|s| {
                (
                    "remove_function_qualifier".to_string(),
                    RefactoringArgs {
                        symbol: s.qualified_name.clone(),
                        qualifier: "inline".to_string(),
                    },
                )
            })
            .collect();
        Ok(refactorings)
    }
}
