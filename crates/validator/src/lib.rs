pub mod compare;
pub mod driver;
pub mod normalize;

pub use compare::assembly_equivalent;
pub use driver::{AsmO0, AsmO3, Validator, ValidatorVariant};

/// Stable-id registry lookup for `GET /api/available/validators`.
pub fn available() -> Vec<(&'static str, &'static str)> {
    vec![
        ("asm_o0", "Unoptimized assembly equivalence"),
        ("asm_o3", "Optimized assembly equivalence"),
    ]
}
