use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;

use crate::{clang::Clang, error::CompilerError, msvc::Msvc};

/// Result of one compile invocation. `asm_text` is empty on a compile
/// failure; `diagnostics` then carries the captured stderr. Callers treat
/// an empty `asm_text` as a refactoring rejection, not a crate-level error.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub source_path: PathBuf,
    pub asm_text: String,
    pub diagnostics: String,
}

impl CompileResult {
    pub fn succeeded(&self) -> bool {
        !self.asm_text.is_empty()
    }
}

/// Closed family of compiler variants, selected by stable id string
/// (`msvc`, `clang`). Each variant force-includes the project prelude
/// header and maps optimization level 0..3 to its own flags.
#[enum_dispatch]
#[derive(Debug, Clone, Copy)]
pub enum CompilerVariant {
    Msvc,
    Clang,
}

impl CompilerVariant {
    pub fn by_id(id: &str) -> Option<Self> {
        match id {
            "msvc" => Some(Self::Msvc(Msvc)),
            "clang" => Some(Self::Clang(Clang)),
            _ => None,
        }
    }
}

#[enum_dispatch(CompilerVariant)]
pub trait CompilerDriver {
    fn id(&self) -> &'static str;

    /// Compile `source` at `optimization_level` (0..3), force-including
    /// `prelude_dir`/`LevelUp.h`. Produces Intel-syntax assembly text.
    fn compile_file(
        &self,
        source: &Path,
        optimization_level: u8,
        prelude_dir: &Path,
    ) -> Result<CompileResult, CompilerError>;

    fn get_optimization_flags(&self, optimization_level: u8) -> Vec<String>;
}
