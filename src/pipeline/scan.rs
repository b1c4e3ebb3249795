//! Cursor helpers shared by the structural passes.
//!
//! Regexes cannot balance braces or count nested `\begin`/`\end` pairs, so
//! the passes that must get structure right (sections, environments,
//! citations, captions) scan with these helpers instead. All returned
//! positions are byte offsets of ASCII delimiters, which keeps slicing on
//! char boundaries.

/// A parsed `\name*[opt]…{arg}` command occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: &'a str,
    /// Offset of the backslash.
    pub start: usize,
    /// Offset just past the closing brace of `arg`.
    pub end: usize,
    pub starred: bool,
    /// Bracketed arguments in source order.
    pub optional: Vec<&'a str>,
    pub arg: &'a str,
}

/// Offset of the matching closer for the opener at `open_at`.
///
/// Backslash escapes (`\{`, `\}`) are skipped. Only `{…}` groups nest; for a
/// `[…]` opener, brackets inside braces are ignored.
fn matching_close(s: &str, open_at: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let (open, close) = match bytes.get(open_at)? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };
    let mut depth = 0usize;
    let mut braces = 0usize;
    let mut i = open_at;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }
        if open == b'[' {
            match b {
                b'{' => braces += 1,
                b'}' => braces = braces.saturating_sub(1),
                b'[' if braces == 0 => depth += 1,
                b']' if braces == 0 => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Content of the `{…}` group opening at `at`, and the offset past it.
pub fn brace_group(s: &str, at: usize) -> Option<(&str, usize)> {
    if s.as_bytes().get(at) != Some(&b'{') {
        return None;
    }
    let close = matching_close(s, at)?;
    Some((&s[at + 1..close], close + 1))
}

/// Content of the `[…]` group opening at `at`, and the offset past it.
pub fn bracket_group(s: &str, at: usize) -> Option<(&str, usize)> {
    if s.as_bytes().get(at) != Some(&b'[') {
        return None;
    }
    let close = matching_close(s, at)?;
    Some((&s[at + 1..close], close + 1))
}

fn skip_blanks(s: &str, mut at: usize) -> usize {
    let bytes = s.as_bytes();
    while matches!(bytes.get(at), Some(b' ') | Some(b'\t')) {
        at += 1;
    }
    at
}

/// Parse the command whose backslash is at `start` and whose name ends at
/// `name_end`. `None` when the mandatory brace argument is missing or
/// unterminated.
pub fn parse_command(s: &str, start: usize, name_end: usize) -> Option<Command<'_>> {
    let bytes = s.as_bytes();
    let mut i = name_end;
    let starred = bytes.get(i) == Some(&b'*');
    if starred {
        i += 1;
    }
    let mut optional = Vec::new();
    loop {
        i = skip_blanks(s, i);
        match bracket_group(s, i) {
            Some((content, next)) => {
                optional.push(content);
                i = next;
            }
            None => break,
        }
    }
    let (arg, end) = brace_group(s, i)?;
    Some(Command {
        name: &s[start + 1..name_end],
        start,
        end,
        starred,
        optional,
        arg,
    })
}

/// Rewrite every well-formed occurrence of the named commands, left to right.
///
/// `f` receives each parsed command and returns its replacement text.
/// Occurrences without a brace argument are left untouched. Text produced by
/// `f` is not rescanned.
pub fn rewrite_commands<'s, E>(
    s: &'s str,
    names: &[&str],
    mut f: impl FnMut(&Command<'s>) -> Result<String, E>,
) -> Result<String, E> {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(off) = s[pos..].find('\\') {
        let at = pos + off;
        let name_len = bytes[at + 1..]
            .iter()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        if name_len == 0 {
            // control symbol such as `\\` or `\{`: skip the escaped char
            let escaped = s[at + 1..].chars().next().map_or(0, char::len_utf8);
            pos = at + 1 + escaped;
            continue;
        }
        let name_end = at + 1 + name_len;
        if names.contains(&&s[at + 1..name_end]) {
            if let Some(cmd) = parse_command(s, at, name_end) {
                out.push_str(&s[last..at]);
                out.push_str(&f(&cmd)?);
                last = cmd.end;
                pos = cmd.end;
                continue;
            }
        }
        pos = name_end;
    }

    out.push_str(&s[last..]);
    Ok(out)
}

/// First well-formed occurrence of `\name{…}` in `s`.
pub fn find_command<'s>(s: &'s str, name: &str) -> Option<Command<'s>> {
    let mut found = None;
    // the closure never fails; it only records the first match
    let _ = rewrite_commands::<()>(s, &[name], |cmd| {
        if found.is_none() {
            found = Some(cmd.clone());
        }
        Ok(String::new())
    });
    found
}

/// A `\begin{name} … \end{name}` span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSpan<'a> {
    pub name: &'a str,
    /// Offset of the `\begin` backslash.
    pub start: usize,
    pub body: &'a str,
    /// Offset just past `\end{name}`.
    pub end: usize,
}

/// Next `\begin{…}` at or after `from`: (offset, name, offset past the tag).
pub fn next_begin(s: &str, from: usize) -> Option<(usize, &str, usize)> {
    let mut pos = from;
    loop {
        let at = pos + s[pos..].find("\\begin{")?;
        let name_start = at + "\\begin{".len();
        if let Some(len) = s[name_start..].find('}') {
            let name = &s[name_start..name_start + len];
            if !name.is_empty()
                && name
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'*')
            {
                return Some((at, name, name_start + len + 1));
            }
        }
        pos = name_start;
    }
}

/// The environment whose `\begin{name}` tag spans `start..body_start`,
/// matched against its own `\end{name}` with nesting of the same name
/// counted. `None` when unterminated.
pub fn close_environment<'s>(
    s: &'s str,
    name: &'s str,
    start: usize,
    body_start: usize,
) -> Option<EnvSpan<'s>> {
    let begin_tag = format!("\\begin{{{name}}}");
    let end_tag = format!("\\end{{{name}}}");
    let mut depth = 1usize;
    let mut pos = body_start;
    loop {
        let end_at = pos + s[pos..].find(&end_tag)?;
        match s[pos..end_at].find(&begin_tag) {
            Some(nested) => {
                depth += 1;
                pos = pos + nested + begin_tag.len();
            }
            None => {
                depth -= 1;
                if depth == 0 {
                    return Some(EnvSpan {
                        name,
                        start,
                        body: &s[body_start..end_at],
                        end: end_at + end_tag.len(),
                    });
                }
                pos = end_at + end_tag.len();
            }
        }
    }
}
