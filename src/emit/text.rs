//! Whole-text passes over generated script: compression and
//! trailing-comma cleanup.
//!
//! Both passes skip the contents of string literals (`"`, `'` and
//! backtick delimited, with backslash escapes). A quote that is not closed
//! on its line (or, for backticks, at all) is treated as code.

/// Characters around which whitespace is insignificant.
const SEPARATORS: &[char] = &[':', '=', '(', ')', '{', '}', ','];

/// A run of text that is either code or a complete string literal.
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Code(&'a str),
    Literal(&'a str),
}

fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while let Some((offset, quote)) = text[pos..]
        .char_indices()
        .find(|(_, c)| matches!(c, '"' | '\'' | '`'))
    {
        let i = pos + offset;
        let Some(end) = literal_end(text, i, quote) else {
            // A lone quote (say inside a regex) stays code
            pos = i + 1;
            continue;
        };
        if start < i {
            out.push(Segment::Code(&text[start..i]));
        }
        out.push(Segment::Literal(&text[i..end]));
        start = end;
        pos = end;
    }
    if start < text.len() {
        out.push(Segment::Code(&text[start..]));
    }
    out
}

/// End offset of the literal opened by `quote` at `open`.
///
/// Quoted strings end at an unescaped newline; template literals may span
/// lines. `None` when the literal is never closed.
fn literal_end(text: &str, open: usize, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (j, d) in text[open + 1..].char_indices() {
        if escaped {
            escaped = false;
        } else if d == '\\' {
            escaped = true;
        } else if d == quote {
            return Some(open + 1 + j + 1);
        } else if d == '\n' && quote != '`' {
            return None;
        }
    }
    None
}

/// Strip newlines and tabs, then drop whitespace next to separators.
pub fn compress(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Code(s) => compress_code(s, &mut out),
        }
    }
    out
}

fn compress_code(code: &str, out: &mut String) {
    let chars: Vec<char> = code.chars().filter(|c| !matches!(c, '\n' | '\t')).collect();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_whitespace() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let run_start = i;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let before = run_start.checked_sub(1).map(|k| chars[k]);
        let after = chars.get(i).copied();
        let touches_separator = before.is_some_and(|c| SEPARATORS.contains(&c))
            || after.is_some_and(|c| SEPARATORS.contains(&c));
        if !touches_separator {
            out.extend(&chars[run_start..i]);
        }
    }
}

/// Remove every comma that directly precedes a closing brace, paren or bracket.
pub fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Code(s) => {
                for (i, c) in s.char_indices() {
                    if c == ',' {
                        let next = s[i + 1..].chars().find(|c| !c.is_whitespace());
                        if matches!(next, Some('}' | ')' | ']')) {
                            continue;
                        }
                    }
                    out.push(c);
                }
            }
        }
    }
    out
}
