use repo::Worktree;
use symbols::SymbolTable;

use crate::{
    commit::CommitDescriptor,
    error::RefactorError,
    qualifiers::validator_for_qualifier,
    refactoring::{Refactoring, RefactoringArgs},
    source_edit::{find_declaration_line, insert_before_terminator, read_file, write_file},
};

/// Adds a qualifier to a function's declaration, e.g. `const`, `override`.
/// Probability reflects the intrinsic safety of the qualifier class:
/// non-semantic qualifiers (`override`, `final`, ...) are near-certain to
/// be codegen no-ops; the semantic-but-invariant set (`const`, `noexcept`,
/// ...) carries slightly more risk.
pub struct AddFunctionQualifier;

impl Refactoring for AddFunctionQualifier {
    fn id(&self) -> &'static str {
        "add_function_qualifier"
    }

    fn apply(
        &self,
        worktree: &Worktree,
        symbols: &mut SymbolTable,
        args: &RefactoringArgs,
    ) -> Result<Option<CommitDescriptor>, RefactorError> {
        let Some(symbol) = symbols.get_symbol(&args.symbol, false)?.cloned() else {
            return Ok(None);
        };
        if symbol.has_qualifier(&args.qualifier) {
            return Ok(None);
        }

        let contents = read_file(&worktree.clone_path, &symbol.file_path)?;
        let Some(line_idx) =
            find_declaration_line(&contents, &symbol.local_name, symbol.start_line, symbol.end_line)
        else {
            return Err(RefactorError::DeclarationNotFound(symbol.local_name.clone()));
        };

        let edited = insert_before_terminator(&contents, line_idx, &args.qualifier);
        write_file(&worktree.clone_path, &symbol.file_path, &edited)?;
        symbols.invalidate_file(symbol.file_path.clone());

        let validator_id = validator_for_qualifier(&args.qualifier);
        let probability = self.declared_probability(args);
        let message = format!(
            "Add {} on {} at {}:{}",
            args.qualifier,
            symbol.qualified_name,
            symbol.file_path.display(),
            symbol.start_line,
        );

        match CommitDescriptor::new(
            worktree,
            message,
            validator_id,
            vec![symbol.qualified_name.clone()],
            probability,
        ) {
            Ok(commit) => Ok(Some(commit)),
            Err(RefactorError::NothingToCommit) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn declared_probability(&self, args: &RefactoringArgs) -> f64 {
        if validator_for_qualifier(&args.qualifier) == "asm_o0" {
            0.95
        } else {
            0.85
        }
    }
}
