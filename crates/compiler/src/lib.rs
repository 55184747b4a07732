mod clang;
mod msvc;

pub mod driver;
pub mod error;
pub mod prelude;

pub use driver::{CompileResult, CompilerDriver, CompilerVariant};
pub use error::CompilerError;

/// Stable-id registry lookup for `GET /api/available/compilers`.
pub fn available() -> Vec<(&'static str, &'static str)> {
    vec![("msvc", "MSVC (cl.exe)"), ("clang", "Clang")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_id_resolves_known_variants() {
        assert_eq!(CompilerVariant::by_id("msvc").unwrap().id(), "msvc");
        assert_eq!(CompilerVariant::by_id("clang").unwrap().id(), "clang");
        assert!(CompilerVariant::by_id("gcc").is_none());
    }

    #[test]
    fn optimization_flags_collapse_unsupported_levels() {
        let msvc = CompilerVariant::by_id("msvc").unwrap();
        assert_eq!(msvc.get_optimization_flags(1), vec!["/O2"]);
        assert_eq!(msvc.get_optimization_flags(3), vec!["/Ox"]);

        let clang = CompilerVariant::by_id("clang").unwrap();
        assert_eq!(clang.get_optimization_flags(3), vec!["-O3"]);
    }

    #[test]
    fn ensure_prelude_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = prelude::ensure_prelude(dir.path()).unwrap();
        let contents_a = std::fs::read_to_string(&first).unwrap();
        let second = prelude::ensure_prelude(dir.path()).unwrap();
        let contents_b = std::fs::read_to_string(&second).unwrap();
        assert_eq!(first, second);
        assert_eq!(contents_a, contents_b);
    }
}
