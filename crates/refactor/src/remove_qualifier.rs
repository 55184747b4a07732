use repo::Worktree;
use symbols::SymbolTable;

use crate::{
    commit::CommitDescriptor,
    error::RefactorError,
    qualifiers::validator_for_qualifier,
    refactoring::{Refactoring, RefactoringArgs},
    source_edit::{find_declaration_line, read_file, remove_qualifier_token, write_file},
};

/// Mirror of [`crate::AddFunctionQualifier`]: strips a qualifier already
/// present on a function's declaration. Declared probability ~0.9 for
/// every qualifier class.
pub struct RemoveFunctionQualifier;

impl Refactoring for RemoveFunctionQualifier {
    fn id(&self) -> &'static str {
        "remove_function_qualifier"
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
        if !symbol.has_qualifier(&args.qualifier) {
            return Ok(None);
        }

        let contents = read_file(&worktree.clone_path, &symbol.file_path)?;
        let Some(line_idx) =
            find_declaration_line(&contents, &symbol.local_name, symbol.start_line, symbol.end_line)
        else {
            return Err(RefactorError::DeclarationNotFound(symbol.local_name.clone()));
        };

        let edited = remove_qualifier_token(&contents, line_idx, &args.qualifier);
        write_file(&worktree.clone_path, &symbol.file_path, &edited)?;
        symbols.invalidate_file(symbol.file_path.clone());

        let validator_id = validator_for_qualifier(&args.qualifier);
        let message = format!(
            "Remove {} on {} at {}:{}",
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
            0.9,
        ) {
            Ok(commit) => Ok(Some(commit)),
            Err(RefactorError::NothingToCommit) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn declared_probability(&self, _args: &RefactoringArgs) -> f64 {
        0.9
    }
}
