//! Parses the `doxygen_output/xml_unexpanded/*.xml` tree the extractor
//! produces into [`Symbol`] values. Deliberately tolerant of unrecognized
//! elements and attributes: newer Doxygen schema revisions add fields we
//! don't care about, and a forward-compatible reader should skip them
//! rather than fail the whole load.

use std::path::Path;

use serde::Deserialize;

use crate::model::{Symbol, SymbolKind};

#[derive(Debug, Deserialize)]
struct DoxygenRoot {
    #[serde(rename = "compounddef", default)]
    compounddefs: Vec<CompoundDef>,
}

#[derive(Debug, Deserialize)]
struct CompoundDef {
    #[serde(rename = "@kind", default)]
    kind: String,
    #[serde(default)]
    compoundname: String,
    #[serde(rename = "sectiondef", default)]
    sectiondefs: Vec<SectionDef>,
}

#[derive(Debug, Deserialize)]
struct SectionDef {
    #[serde(rename = "memberdef", default)]
    memberdefs: Vec<MemberDef>,
}

#[derive(Debug, Deserialize)]
struct MemberDef {
    #[serde(rename = "@kind", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    definition: String,
    #[serde(default)]
    argsstring: String,
    #[serde(default)]
    location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(rename = "@file", default)]
    file: String,
    #[serde(rename = "@line", default)]
    line: u32,
    #[serde(rename = "@bodyend", default)]
    bodyend: Option<u32>,
}

/// Parse a single doxygen XML file, returning every symbol it describes.
/// Unparseable or irrelevant files (e.g. `index.xml`) yield an empty vec
/// rather than an error.
pub fn parse_file(xml: &str, repo_root: &Path) -> Vec<Symbol> {
    let root: DoxygenRoot = match quick_xml::de::from_str(xml) {
        Ok(root) => root,
        Err(_) => return Vec::new(),
    };

    let mut symbols = Vec::new();
    for compound in &root.compounddefs {
        let is_member_scope = matches!(compound.kind.as_str(), "class" | "struct" | "namespace");
        for section in &compound.sectiondefs {
            for member in &section.memberdefs {
                let Some(kind) = SymbolKind::from_doxygen_kind(&member.kind) else {
                    continue;
                };
                let Some(location) = &member.location else {
                    continue;
                };
                if location.file.is_empty() {
                    continue;
                }

                let qualified_name = if is_member_scope && !compound.compoundname.is_empty() {
                    format!("{}::{}", compound.compoundname, member.name)
                } else {
                    member.name.clone()
                };

                let prototype = format!("{}{};", member.definition, member.argsstring);
                let qualifiers = Symbol::derive_qualifiers(&prototype);

                symbols.push(Symbol {
                    kind,
                    local_name: member.name.clone(),
                    qualified_name,
                    file_path: repo_relative(repo_root, &location.file),
                    start_line: location.line,
                    end_line: location.bodyend.unwrap_or(location.line),
                    prototype,
                    is_member: is_member_scope,
                    qualifiers,
                });
            }
        }
    }
    symbols
}

fn repo_relative(repo_root: &Path, file: &str) -> std::path::PathBuf {
    let path = Path::new(file);
    match path.strip_prefix(repo_root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <doxygen>
          <compounddef kind="class">
            <compoundname>B</compoundname>
            <sectiondef kind="public-func">
              <memberdef kind="function">
                <definition>virtual void B::f</definition>
                <argsstring>()</argsstring>
                <name>f</name>
                <location file="/repo/src/b.h" line="3" bodyend="3"/>
              </memberdef>
            </sectiondef>
          </compounddef>
        </doxygen>
    "#;

    #[test]
    fn parses_member_function_with_qualified_name() {
        let symbols = parse_file(SAMPLE, Path::new("/repo"));
        assert_eq!(symbols.len(), 1);
        let f = &symbols[0];
        assert_eq!(f.qualified_name, "B::f");
        assert_eq!(f.file_path, Path::new("src/b.h"));
        assert!(f.has_qualifier("virtual"));
        assert!(!f.has_qualifier("override"));
    }

    #[test]
    fn unparseable_input_yields_no_symbols() {
        assert!(parse_file("not xml at all", Path::new("/repo")).is_empty());
    }
}
