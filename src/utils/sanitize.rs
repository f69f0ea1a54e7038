//! Input sanitisation helpers.

/// Longest filename stem kept by [`sanitize_filename`].
const MAX_STEM_LEN: usize = 100;

/// Escape HTML entities and strip control characters (newline and tab
/// survive), then trim.
#[must_use]
pub fn sanitize_input(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.trim().to_owned()
}

/// Reduce a filename to a safe form: path components dropped, spaces
/// replaced with underscores, anything outside `[a-zA-Z0-9._-]` removed,
/// and the stem capped at 100 characters.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .replace(' ', "_");

    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    match cleaned.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            let stem: String = stem.chars().take(MAX_STEM_LEN).collect();

            format!("{stem}.{extension}")
        }
        _ => cleaned.chars().take(MAX_STEM_LEN).collect(),
    }
}

/// Keep only the characters allowed in a storage identifier: ASCII
/// alphanumerics and underscores.
#[must_use]
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_entities_are_escaped() {
        assert_eq!(
            sanitize_input("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"
        );
    }

    #[test]
    fn control_characters_are_dropped_but_whitespace_survives() {
        assert_eq!(sanitize_input("a\u{0}b\tc\nd"), "ab\tc\nd");
    }

    #[test]
    fn input_is_trimmed() {
        assert_eq!(sanitize_input("  hello  "), "hello");
    }

    #[test]
    fn filenames_lose_their_paths() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\windows\\cmd.exe"), "cmd.exe");
    }

    #[test]
    fn filename_spaces_become_underscores() {
        assert_eq!(sanitize_filename("my report.pdf"), "my_report.pdf");
    }

    #[test]
    fn long_stems_are_capped() {
        let long = format!("{}.txt", "a".repeat(150));

        assert_eq!(sanitize_filename(&long), format!("{}.txt", "a".repeat(100)));
    }

    #[test]
    fn identifiers_keep_word_characters_only() {
        assert_eq!(sanitize_identifier("users; DROP TABLE"), "usersDROPTABLE");
        assert_eq!(sanitize_identifier("order_lines"), "order_lines");
    }
}
