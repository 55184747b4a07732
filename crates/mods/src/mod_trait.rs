use refactor::RefactoringArgs;
use symbols::{SymbolIndexError, SymbolTable};

/// One emitted step: the stable id of a refactoring in the `refactor`
/// crate's registry, plus the arguments to apply it with.
pub type PlannedRefactoring = (String, RefactoringArgs);

/// A high-level planner: given a populated symbol index, enumerate the
/// atomic refactorings that realize its modernization intent. Mods read
/// the symbol index only; they never touch the filesystem. The sequence
/// is computed against a single snapshot of the index (callers queue a
/// fresh symbol index per request, so staleness across a single mod's
/// scan is not a concern).
pub trait Mod {
    fn id(&self) -> &'static str;
    fn display_name(&self) -> &'static str;

    fn generate_refactorings(
        &self,
        symbols: &mut SymbolTable,
    ) -> Result<Vec<PlannedRefactoring>, SymbolIndexError>;
}
