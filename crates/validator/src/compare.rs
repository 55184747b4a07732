use std::collections::HashSet;

use crate::normalize::{classify_one_sided, extract_functions, normalize_body, OneSidedOutcome};

/// The full per-call algorithm: extract PROC/ENDP functions from both
/// sides, pair by symbol, normalize each paired body, and compare.
/// Functions present on only one side are skipped when the compiler's
/// COMDAT convention says the other side discarded a duplicate; any other
/// one-sided function is a mismatch.
pub fn assembly_equivalent(original: &str, modified: &str) -> bool {
    let original_fns = extract_functions(original);
    let modified_fns = extract_functions(modified);

    let original_names: HashSet<&String> = original_fns.keys().collect();
    let modified_names: HashSet<&String> = modified_fns.keys().collect();

    for name in original_names.difference(&modified_names) {
        let f = &original_fns[*name];
        if classify_one_sided(f.is_comdat, true) == OneSidedOutcome::Mismatch {
            return false;
        }
    }
    for name in modified_names.difference(&original_names) {
        let f = &modified_fns[*name];
        if classify_one_sided(f.is_comdat, true) == OneSidedOutcome::Mismatch {
            return false;
        }
    }

    let original_symbols: HashSet<String> = original_fns.keys().cloned().collect();
    let modified_symbols: HashSet<String> = modified_fns.keys().cloned().collect();

    for name in original_names.intersection(&modified_names) {
        let orig_body = normalize_body(&original_fns[*name].body, &original_symbols);
        let mod_body = normalize_body(&modified_fns[*name].body, &modified_symbols);
        if orig_body != mod_body {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_assembly_is_equivalent() {
        let asm = "f PROC\n  mov eax, 1\n  ret 0\nf ENDP\n";
        assert!(assembly_equivalent(asm, asm));
    }

    #[test]
    fn reordered_functions_still_match() {
        let original = "f PROC\n ret 0\nf ENDP\ng PROC\n ret 1\ng ENDP\n";
        let modified = "g PROC\n ret 1\ng ENDP\nf PROC\n ret 0\nf ENDP\n";
        assert!(assembly_equivalent(original, modified));
    }

    #[test]
    fn comment_and_label_numbering_differences_are_accepted() {
        let original = "f PROC\n  jmp $LN3@f ; branch\n  ret 0\nf ENDP\n";
        let modified = "f PROC\n  jmp $LN9@f\n  ret 0\nf ENDP\n";
        assert!(assembly_equivalent(original, modified));
    }

    #[test]
    fn semantic_body_change_is_rejected() {
        let original = "f PROC\n  mov eax, 1\n  ret 0\nf ENDP\n";
        let modified = "f PROC\n  mov eax, 2\n  ret 0\nf ENDP\n";
        assert!(!assembly_equivalent(original, modified));
    }

    #[test]
    fn removed_function_without_comdat_is_rejected() {
        let original = "f PROC\n ret 0\nf ENDP\ng PROC\n ret 1\ng ENDP\n";
        let modified = "f PROC\n ret 0\nf ENDP\n";
        assert!(!assembly_equivalent(original, modified));
    }

    #[test]
    fn comdat_discarded_duplicate_is_skipped() {
        let original = "; COMDAT g\ng PROC\n ret 1\ng ENDP\nf PROC\n ret 0\nf ENDP\n";
        let modified = "f PROC\n ret 0\nf ENDP\n";
        assert!(assembly_equivalent(original, modified));
    }
}
