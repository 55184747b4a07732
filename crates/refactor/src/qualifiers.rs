/// Qualifiers whose addition/removal is optimization-invariant but not a
/// textual no-op at O0 (they can affect codegen), so changes to them are
/// validated against optimized output too.
pub const SEMANTIC_QUALIFIERS: &[&str] = &["const", "noexcept", "constexpr", "inline"];

/// Qualifiers with no codegen effect under any optimization level.
pub const NON_SEMANTIC_QUALIFIERS: &[&str] = &[
    "override",
    "final",
    "static",
    "virtual",
    "[[nodiscard]]",
    "[[maybe_unused]]",
];

/// `asm_o3` for the semantic set, `asm_o0` for the non-semantic set. Unknown
/// qualifiers default to the stricter `asm_o3`.
pub fn validator_for_qualifier(qualifier: &str) -> &'static str {
    if NON_SEMANTIC_QUALIFIERS.contains(&qualifier) {
        "asm_o0"
    } else {
        "asm_o3"
    }
}
