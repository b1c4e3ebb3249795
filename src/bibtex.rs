//! BibTeX reader: `.bib` source text → [`Bibliography`].
//!
//! The conversion passes never look at BibTeX syntax; they only consume the
//! [`BibEntry`] records produced here. The reader covers what real-world
//! `.bib` files use:
//!
//! - `@type{key, field = value, …}` and `@type(key, …)`
//! - values as `{…}` (nested braces allowed), `"…"`, bare numbers, or
//!   `@string` macro names, concatenated with `#`
//! - `@comment` and `@preamble` blocks are skipped; text between entries is
//!   ignored, including an `@` that does not open an entry
//!
//! Field names and entry types are lower-cased. TeX accent and special
//! character escapes (`{\"u}`, `\c{c}`, `\ss`, `\&`, …) are decoded to
//! Unicode, then brace characters are dropped and internal whitespace is
//! collapsed to single spaces.

use crate::bibliography::{BibEntry, Bibliography, EntryType};
use crate::error::BibTexError;
use std::collections::HashMap;
use tracing::debug;

/// Parse BibTeX source into a [`Bibliography`].
///
/// Entries with a duplicate key replace the earlier one.
pub fn parse(src: &str) -> Result<Bibliography, BibTexError> {
    let mut reader = Reader::new(src);
    let mut macros = month_macros();
    let mut bib = Bibliography::new();

    while reader.skip_past_at() {
        reader.skip_ws();
        let kind = reader.ident();
        reader.skip_ws();
        let (open, close) = match reader.peek() {
            Some(b'{') if !kind.is_empty() => (b'{', b'}'),
            Some(b'(') if !kind.is_empty() => (b'(', b')'),
            // BibTeX treats text outside entries as a comment
            _ => {
                debug!("line {}: ignoring '@{}' outside an entry", reader.line(), kind);
                continue;
            }
        };
        reader.pos += 1;

        match kind.to_ascii_lowercase().as_str() {
            "comment" | "preamble" => reader.skip_balanced(open, close)?,
            "string" => {
                let (name, value) = reader.field(&macros)?;
                reader.skip_ws();
                reader.expect(close)?;
                macros.insert(name, value);
            }
            _ => {
                let entry = reader.entry(&kind, close, &macros)?;
                bib.insert(entry);
            }
        }
    }

    Ok(bib)
}

fn month_macros() -> HashMap<String, String> {
    [
        ("jan", "January"),
        ("feb", "February"),
        ("mar", "March"),
        ("apr", "April"),
        ("may", "May"),
        ("jun", "June"),
        ("jul", "July"),
        ("aug", "August"),
        ("sep", "September"),
        ("oct", "October"),
        ("nov", "November"),
        ("dec", "December"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Decode TeX escapes, drop brace characters and collapse whitespace runs.
fn normalise_value(raw: &str) -> String {
    decode_tex(raw)
        .replace(['{', '}'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ── TeX escapes ──────────────────────────────────────────────────────────

/// Base letters and their precomposed forms, per accent command.
const ACCENTS: &[(&str, &str, &str)] = &[
    ("\"", "aeiouyAEIOUY", "äëïöüÿÄËÏÖÜŸ"),
    ("'", "aeiouyAEIOUYcnszCNSZ", "áéíóúýÁÉÍÓÚÝćńśźĆŃŚŹ"),
    ("`", "aeiouAEIOU", "àèìòùÀÈÌÒÙ"),
    ("^", "aeiouAEIOU", "âêîôûÂÊÎÔÛ"),
    ("~", "anoANO", "ãñõÃÑÕ"),
    ("=", "aeiouAEIOU", "āēīōūĀĒĪŌŪ"),
    (".", "zZeEI", "żŻėĖİ"),
    ("c", "cCsStT", "çÇşŞţŢ"),
    ("v", "cCsSzZrReEnN", "čČšŠžŽřŘěĚňŇ"),
    ("u", "aAgG", "ăĂğĞ"),
    ("H", "oOuU", "őŐűŰ"),
    ("k", "aAeE", "ąĄęĘ"),
    ("r", "aAuU", "åÅůŮ"),
];

/// Letter commands that stand for a character of their own.
const LETTERS: &[(&str, &str)] = &[
    ("ss", "ß"),
    ("o", "ø"),
    ("O", "Ø"),
    ("aa", "å"),
    ("AA", "Å"),
    ("ae", "æ"),
    ("AE", "Æ"),
    ("oe", "œ"),
    ("OE", "Œ"),
    ("l", "ł"),
    ("L", "Ł"),
    ("i", "ı"),
    ("j", "ȷ"),
];

fn compose(accent: &str, base: char) -> Option<char> {
    let (_, from, to) = ACCENTS.iter().find(|(a, _, _)| *a == accent)?;
    let idx = from.chars().position(|c| c == base)?;
    to.chars().nth(idx)
}

/// Replace TeX accent and special-character escapes with Unicode.
///
/// Accents accept `\"u`, `\"{u}` and `\'{\i}`; letter accents (`\c`, `\v`,
/// …) also accept a space before the base (`\c c`). An accent on a base with
/// no precomposed form keeps the bare base letter. Unknown commands are
/// left untouched.
fn decode_tex(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' || i + 1 == chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let c = chars[i + 1];
        i += 2;
        if "\"'`^~=.".contains(c) {
            let (base, next) = accent_base(&chars, i);
            push_accented(&mut out, &c.to_string(), base);
            i = next;
        } else if c.is_ascii_alphabetic() {
            let start = i - 1;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            if ACCENTS.iter().any(|(a, _, _)| *a == name) {
                while i < chars.len() && chars[i] == ' ' {
                    i += 1;
                }
                let (base, next) = accent_base(&chars, i);
                push_accented(&mut out, &name, base);
                i = next;
            } else if let Some((_, letter)) = LETTERS.iter().find(|(n, _)| *n == name) {
                out.push_str(letter);
                while i < chars.len() && chars[i] == ' ' {
                    i += 1;
                }
            } else {
                out.push('\\');
                out.push_str(&name);
            }
        } else if "&%$#_{}".contains(c) {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

fn push_accented(out: &mut String, accent: &str, base: Option<char>) {
    if let Some(b) = base {
        out.push(compose(accent, b).unwrap_or(b));
    }
}

/// Read the base letter of an accent starting at `i`; returns the letter
/// (if any) and the index just past it.
fn accent_base(chars: &[char], i: usize) -> (Option<char>, usize) {
    match chars.get(i) {
        Some('{') => {
            let Some(len) = chars[i + 1..].iter().position(|&c| c == '}') else {
                return (None, i);
            };
            let inner: String = chars[i + 1..i + 1 + len].iter().collect();
            let base = match inner.trim() {
                "\\i" => Some('i'),
                "\\j" => Some('j'),
                s => s.chars().next(),
            };
            (base, i + len + 2)
        }
        Some('\\') if matches!(chars.get(i + 1), Some('i' | 'j')) => {
            (chars.get(i + 1).copied(), i + 2)
        }
        Some(&c) if !c.is_whitespace() => (Some(c), i + 1),
        _ => (None, i),
    }
}

// ── Byte cursor ──────────────────────────────────────────────────────────
//
// Every position the cursor stops at is an ASCII delimiter, so slicing `src`
// between two stops always lands on char boundaries.

struct Reader<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn line(&self) -> usize {
        let upto = self.pos.min(self.bytes.len());
        self.bytes[..upto].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn error(&self, detail: impl Into<String>) -> BibTexError {
        BibTexError {
            line: self.line(),
            detail: detail.into(),
        }
    }

    fn expect(&mut self, want: u8) -> Result<(), BibTexError> {
        match self.peek() {
            Some(b) if b == want => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}', found '{}'",
                want as char, b as char
            ))),
            None => Err(self.error(format!("expected '{}', found end of input", want as char))),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Move just past the next '@'; false at end of input.
    fn skip_past_at(&mut self) -> bool {
        match self.bytes[self.pos..].iter().position(|&b| b == b'@') {
            Some(offset) => {
                self.pos += offset + 1;
                true
            }
            None => {
                self.pos = self.bytes.len();
                false
            }
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b"-_:.+/".contains(&b))
        {
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }

    /// Skip to just past the delimiter closing an already-consumed opener.
    fn skip_balanced(&mut self, open: u8, close: u8) -> Result<(), BibTexError> {
        let mut depth = 1usize;
        while let Some(b) = self.bump() {
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(self.error("unterminated block"))
    }

    fn entry(
        &mut self,
        kind: &str,
        close: u8,
        macros: &HashMap<String, String>,
    ) -> Result<BibEntry, BibTexError> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b != b',' && b != close && !b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        let key = self.src[start..self.pos].to_string();
        if key.is_empty() {
            return Err(self.error(format!("@{kind} entry has no citation key")));
        }

        let mut entry = BibEntry::new(key, EntryType::parse(kind));
        self.skip_ws();
        loop {
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                    // trailing comma before the closing delimiter
                    if self.peek() == Some(close) {
                        self.pos += 1;
                        return Ok(entry);
                    }
                    let (name, value) = self.field(macros)?;
                    entry.fields.insert(name, value);
                    self.skip_ws();
                }
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(entry);
                }
                Some(b) => {
                    return Err(self.error(format!(
                        "expected ',' or '{}' in entry '{}', found '{}'",
                        close as char, entry.key, b as char
                    )))
                }
                None => return Err(self.error(format!("unterminated entry '{}'", entry.key))),
            }
        }
    }

    fn field(&mut self, macros: &HashMap<String, String>) -> Result<(String, String), BibTexError> {
        let name = self.ident();
        if name.is_empty() {
            return Err(self.error("expected field name"));
        }
        self.skip_ws();
        self.expect(b'=')?;
        let value = self.value(macros)?;
        Ok((name.to_ascii_lowercase(), normalise_value(&value)))
    }

    fn value(&mut self, macros: &HashMap<String, String>) -> Result<String, BibTexError> {
        let mut out = String::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'{') => {
                    self.pos += 1;
                    let start = self.pos;
                    self.skip_balanced(b'{', b'}')?;
                    out.push_str(&self.src[start..self.pos - 1]);
                }
                Some(b'"') => {
                    self.pos += 1;
                    out.push_str(self.quoted()?);
                }
                Some(b) if b.is_ascii_alphanumeric() => {
                    let word = self.ident();
                    match macros.get(&word.to_ascii_lowercase()) {
                        Some(expansion) => out.push_str(expansion),
                        None => out.push_str(&word),
                    }
                }
                Some(b) => {
                    return Err(self.error(format!("expected field value, found '{}'", b as char)))
                }
                None => return Err(self.error("expected field value, found end of input")),
            }
            self.skip_ws();
            if self.peek() == Some(b'#') {
                self.pos += 1;
            } else {
                return Ok(out);
            }
        }
    }

    /// Body of a `"…"` value; braces may protect inner quotes.
    fn quoted(&mut self) -> Result<&'a str, BibTexError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(b) = self.bump() {
            match b {
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                b'"' if depth == 0 => return Ok(&self.src[start..self.pos - 1]),
                _ => {}
            }
        }
        Err(self.error("unterminated quoted value"))
    }
}
