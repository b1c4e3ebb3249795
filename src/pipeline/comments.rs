//! Comment stripping: the first pass, so commented-out markup never reaches
//! the passes that would treat it as live content.
//!
//! - `%` through end of line is removed.
//! - A line that held nothing but whitespace and a comment disappears
//!   entirely, newline included, so commented-out blocks leave no gaps.
//! - `\%` becomes a literal `%`.
//! - `\\` is an escaped pair: in `\\%` the `%` still starts a comment.

/// Remove LaTeX line comments.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for line in input.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        let (kept, had_comment) = strip_line(body);
        if had_comment && kept.trim().is_empty() {
            continue;
        }
        out.push_str(&kept);
        out.push_str(newline);
    }
    out
}

/// One line without its comment; the flag tells whether a comment was cut.
fn strip_line(line: &str) -> (String, bool) {
    let mut kept = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('%') => kept.push('%'),
                Some(next) => {
                    kept.push('\\');
                    kept.push(next);
                }
                None => kept.push('\\'),
            },
            '%' => return (kept, true),
            _ => kept.push(c),
        }
    }
    (kept, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_comment() {
        assert_eq!(strip_comments("text % note\nmore"), "text \nmore");
    }

    #[test]
    fn drops_comment_only_lines() {
        assert_eq!(
            strip_comments("a\n% whole line\n   % indented\nb\n"),
            "a\nb\n"
        );
    }

    #[test]
    fn keeps_escaped_percent() {
        assert_eq!(strip_comments(r"50\% done % really?"), "50% done ");
    }

    #[test]
    fn escaped_backslash_does_not_escape_percent() {
        assert_eq!(strip_comments(r"line\\% gone"), r"line\\");
    }

    #[test]
    fn commented_markup_is_removed() {
        let input = "% \\section{Hidden}\n\\section{Shown}\n";
        assert_eq!(strip_comments(input), "\\section{Shown}\n");
    }

    #[test]
    fn blank_lines_survive() {
        assert_eq!(strip_comments("a\n\nb"), "a\n\nb");
    }
}
