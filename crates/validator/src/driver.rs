use enum_dispatch::enum_dispatch;

use crate::compare::assembly_equivalent;

/// Closed family of validator variants, selected by stable id string
/// (`asm_o0`, `asm_o3`). Conservative by construction: anything the
/// normalization doesn't recognize as equivalent is rejected.
#[enum_dispatch]
#[derive(Debug, Clone, Copy)]
pub enum ValidatorVariant {
    AsmO0,
    AsmO3,
}

impl ValidatorVariant {
    pub fn by_id(id: &str) -> Option<Self> {
        match id {
            "asm_o0" => Some(Self::AsmO0(AsmO0)),
            "asm_o3" => Some(Self::AsmO3(AsmO3)),
            _ => None,
        }
    }
}

#[enum_dispatch(ValidatorVariant)]
pub trait Validator {
    fn id(&self) -> &'static str;
    fn optimization_level(&self) -> u8;
    fn validate(&self, original: &str, modified: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct AsmO0;

impl Validator for AsmO0 {
    fn id(&self) -> &'static str {
        "asm_o0"
    }

    fn optimization_level(&self) -> u8 {
        0
    }

    fn validate(&self, original: &str, modified: &str) -> bool {
        assembly_equivalent(original, modified)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AsmO3;

impl Validator for AsmO3 {
    fn id(&self) -> &'static str {
        "asm_o3"
    }

    fn optimization_level(&self) -> u8 {
        3
    }

    fn validate(&self, original: &str, modified: &str) -> bool {
        assembly_equivalent(original, modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_id_resolves_known_variants() {
        let o0 = ValidatorVariant::by_id("asm_o0").unwrap();
        assert_eq!(o0.id(), "asm_o0");
        assert_eq!(o0.optimization_level(), 0);

        let o3 = ValidatorVariant::by_id("asm_o3").unwrap();
        assert_eq!(o3.optimization_level(), 3);

        assert!(ValidatorVariant::by_id("asm_o2").is_none());
    }
}
