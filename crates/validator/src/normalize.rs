//! Extraction, normalization and comparison of PROC/ENDP assembly function
//! bodies. Shared by both validator variants; only the optimization level
//! requested before compilation differs between them.

use std::collections::{HashMap, HashSet};

use regex::Regex;

/// One function's body, plus whether it carries a COMDAT marker (emitted
/// just above its `PROC` line by the compiler for potentially-duplicated
/// inline definitions).
#[derive(Debug, Clone)]
pub struct ExtractedFunction {
    pub body: Vec<String>,
    pub is_comdat: bool,
}

fn proc_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\S+)\s+PROC\b").unwrap())
}

fn endp_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\S+)\s+ENDP\b").unwrap())
}

fn comdat_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)COMDAT").unwrap())
}

fn label_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$L[LN]\d+@[A-Za-z0-9_]*:?|\bL\d+\b:?").unwrap())
}

fn data_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"OFFSET\s+FLAT:\S+|\$SG\d+|\.LC\d+|\.L\.[A-Za-z0-9_.]*|\[rip\s*\+\s*[^\]]+\]")
            .unwrap()
    })
}

const ALIGNMENT_DIRECTIVES: &[&str] = &["ALIGN", "ORG", "INCLUDELIB"];

/// Scan `asm` for `NAME PROC` .. `NAME ENDP` blocks. A function only closes
/// when its ENDP names the same symbol as the opening PROC; nested labels
/// without their own PROC/ENDP pair are not functions.
pub fn extract_functions(asm: &str) -> HashMap<String, ExtractedFunction> {
    let mut functions = HashMap::new();
    let lines: Vec<&str> = asm.lines().collect();

    let mut i = 0;
    while i < lines.len() {
        if let Some(caps) = proc_re().captures(lines[i]) {
            let name = caps[1].to_string();
            let is_comdat = lines[..i]
                .iter()
                .rev()
                .take(5)
                .any(|l| comdat_re().is_match(l) && l.contains(&name));
            let mut body = Vec::new();
            let mut j = i + 1;
            while j < lines.len() {
                if let Some(end_caps) = endp_re().captures(lines[j]) {
                    if end_caps[1] == name {
                        break;
                    }
                }
                body.push(lines[j].trim_start().to_string());
                j += 1;
            }
            functions.insert(name, ExtractedFunction { body, is_comdat });
            i = j + 1;
        } else {
            i += 1;
        }
    }
    functions
}

/// Normalize one function body in place: replace symbol/label/data tokens,
/// strip comments and alignment-only lines, collapse whitespace.
pub fn normalize_body(body: &[String], symbol_table: &HashSet<String>) -> Vec<String> {
    let mut symbols: Vec<&String> = symbol_table.iter().collect();
    symbols.sort_by_key(|s| std::cmp::Reverse(s.len()));

    let mut out = Vec::with_capacity(body.len());
    for raw_line in body {
        let mut line = match raw_line.find(';') {
            Some(idx) => raw_line[..idx].to_string(),
            None => raw_line.clone(),
        };

        for symbol in &symbols {
            if symbol.is_empty() {
                continue;
            }
            line = replace_word(&line, symbol, "SYMBOL");
        }
        line = label_re().replace_all(&line, "LABEL").into_owned();
        line = data_re().replace_all(&line, "DATA").into_owned();

        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }
        let first_word = collapsed.split(' ').next().unwrap_or("");
        if ALIGNMENT_DIRECTIVES.contains(&first_word) {
            continue;
        }
        if is_nop_only(&collapsed) {
            continue;
        }
        out.push(collapsed);
    }
    out
}

fn is_nop_only(line: &str) -> bool {
    line.split(' ').all(|tok| tok.eq_ignore_ascii_case("nop") || tok.eq_ignore_ascii_case("npad"))
}

fn replace_word(haystack: &str, word: &str, replacement: &str) -> String {
    let mut result = String::with_capacity(haystack.len());
    let bytes = haystack.as_bytes();
    let wb = word.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if haystack[i..].starts_with(word) {
            let before_ok = i == 0 || !is_ident_byte(bytes[i - 1]);
            let after = i + wb.len();
            let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
            if before_ok && after_ok {
                result.push_str(replacement);
                i = after;
                continue;
            }
        }
        result.push(bytes[i] as char);
        i += 1;
    }
    result
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'@' || b == b'$' || b == b'?'
}

/// How to treat a function present on only one side, given the other side's
/// view of whether that function's body was discarded by the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneSidedOutcome {
    Skip,
    Mismatch,
}

pub fn classify_one_sided(present_is_comdat: bool, missing_from_other_side: bool) -> OneSidedOutcome {
    if present_is_comdat && missing_from_other_side {
        OneSidedOutcome::Skip
    } else {
        OneSidedOutcome::Mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_function_body() {
        let asm = "f PROC\n  mov eax, 1\n  ret 0\nf ENDP\n";
        let functions = extract_functions(asm);
        assert_eq!(functions.len(), 1);
        let f = &functions["f"];
        assert_eq!(f.body, vec!["mov eax, 1", "ret 0"]);
        assert!(!f.is_comdat);
    }

    #[test]
    fn comdat_marker_is_detected() {
        let asm = "; COMDAT f\nf PROC\n  ret 0\nf ENDP\n";
        let functions = extract_functions(asm);
        assert!(functions["f"].is_comdat);
    }

    #[test]
    fn normalize_replaces_symbol_label_and_data_tokens() {
        let body = vec![
            "call g".to_string(),
            "jmp $LN3@f".to_string(),
            "lea rax, [rip + .L.str]".to_string(),
            "  ALIGN 16".to_string(),
            "nop".to_string(),
        ];
        let mut symbols = HashSet::new();
        symbols.insert("g".to_string());
        let normalized = normalize_body(&body, &symbols);
        assert_eq!(normalized, vec!["call SYMBOL", "jmp LABEL", "lea rax, DATA"]);
    }

    #[test]
    fn one_sided_comdat_discard_is_skipped() {
        assert_eq!(classify_one_sided(true, true), OneSidedOutcome::Skip);
        assert_eq!(classify_one_sided(false, true), OneSidedOutcome::Mismatch);
        assert_eq!(classify_one_sided(true, false), OneSidedOutcome::Mismatch);
    }
}
