use std::{fs, path::Path};

/// Locate the line within `[start_line, end_line]` (1-indexed, inclusive)
/// that names `local_name` and ends, once trimmed, with `;` — the
/// semicolon-terminated declaration the reference refactorings mutate.
pub fn find_declaration_line(
    contents: &str,
    local_name: &str,
    start_line: u32,
    end_line: u32,
) -> Option<usize> {
    let lines: Vec<&str> = contents.lines().collect();
    let start = start_line.saturating_sub(1) as usize;
    let end = (end_line as usize).min(lines.len());
    (start..end).find(|&idx| {
        let line = lines[idx];
        line.contains(local_name) && line.trim_end().ends_with(';')
    })
}

/// Insert `qualifier` immediately before the trailing `;` on `line_idx`.
pub fn insert_before_terminator(contents: &str, line_idx: usize, qualifier: &str) -> String {
    edit_line(contents, line_idx, |line| {
        let trimmed_end = line.trim_end();
        let body = &trimmed_end[..trimmed_end.len() - 1];
        format!("{body} {qualifier};")
    })
}

/// Remove the first standalone occurrence of `qualifier` from `line_idx`.
pub fn remove_qualifier_token(contents: &str, line_idx: usize, qualifier: &str) -> String {
    edit_line(contents, line_idx, |line| {
        let rebuilt: Vec<&str> = line.split_whitespace().filter(|tok| *tok != qualifier).collect();
        let joined = rebuilt.join(" ");
        // preserve a semicolon directly after a removed trailing qualifier
        if line.trim_end().ends_with(';') && !joined.ends_with(';') {
            format!("{joined};")
        } else {
            joined
        }
    })
}

fn edit_line(contents: &str, line_idx: usize, f: impl FnOnce(&str) -> String) -> String {
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
    if let Some(line) = lines.get_mut(line_idx) {
        *line = f(line);
    }
    let mut out = lines.join("\n");
    if contents.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub fn read_file(root: &Path, relative: &Path) -> std::io::Result<String> {
    fs::read_to_string(root.join(relative))
}

pub fn write_file(root: &Path, relative: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(root.join(relative), contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_declaration_by_name_and_semicolon() {
        let contents = "struct B {\n  virtual void f();\n};\n";
        let idx = find_declaration_line(contents, "f", 2, 2).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn inserts_qualifier_before_terminator() {
        let contents = "virtual void f();\n";
        let edited = insert_before_terminator(contents, 0, "override");
        assert_eq!(edited, "virtual void f() override;\n");
    }

    #[test]
    fn removes_qualifier_token() {
        let contents = "inline int g();\n";
        let edited = remove_qualifier_token(contents, 0, "inline");
        assert_eq!(edited, "int g();\n");
    }
}
