/// Derive a repository's display name from its remote URL: the last path
/// segment with a trailing `.git` suffix stripped.
pub fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_git_suffix() {
        assert_eq!(
            repo_name_from_url("https://github.com/acme/levelup.git"),
            "levelup"
        );
    }

    #[test]
    fn handles_trailing_slash_and_no_suffix() {
        assert_eq!(repo_name_from_url("https://example.com/acme/widgets/"), "widgets");
    }
}
