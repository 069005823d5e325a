//! Scanning of quoted strings, `${...}` interpolations and heredocs
//!
//! These are shared by the comment stripper and the lexer so that comment
//! markers and braces inside string literals are never mistaken for syntax.

use crate::error::ParseError;

/// A scanned quoted string. `end` is the index just past the closing quote.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Quoted {
    pub end: usize,
    /// Unescaped text, interpolations kept verbatim as `${...}`.
    pub value: String,
    /// Contents of every `${...}` / `%{...}` sequence, outermost only.
    pub interpolations: Vec<String>,
    pub newlines: usize,
}

/// A scanned heredoc. `end` is the index just past the terminator line's marker.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Heredoc {
    pub end: usize,
    pub marker: String,
    pub body: String,
    pub newlines: usize,
}

/// Scan a quoted string; `start` is the index just after the opening quote.
pub(crate) fn scan_quoted(chars: &[char], start: usize, line: usize) -> Result<Quoted, ParseError> {
    let mut value = String::new();
    let mut interpolations = Vec::new();
    let mut newlines = 0;
    let mut i = start;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let Some(&next) = chars.get(i + 1) else { break };
                match next {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '"' | '\\' => value.push(next),
                    other => {
                        value.push('\\');
                        value.push(other);
                    }
                }
                i += 2;
            }
            '"' => {
                return Ok(Quoted {
                    end: i + 1,
                    value,
                    interpolations,
                    newlines,
                });
            }
            '\n' => return Err(ParseError::UnterminatedString { line }),
            c @ ('$' | '%') if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&'{') => {
                // `$${` and `%%{` are literal escapes
                value.push(c);
                value.push('{');
                i += 3;
            }
            c @ ('$' | '%') if chars.get(i + 1) == Some(&'{') => {
                let (end, content, nl) = scan_interpolation(chars, i + 2, line + newlines)?;
                value.push(c);
                value.push('{');
                value.push_str(&content);
                value.push('}');
                interpolations.push(content);
                newlines += nl;
                i = end;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }

    Err(ParseError::UnterminatedString { line })
}

/// Scan the body of an interpolation; `start` is the index just after `${`.
/// Returns the index past the closing brace, the raw content and the newlines crossed.
pub(crate) fn scan_interpolation(
    chars: &[char],
    start: usize,
    line: usize,
) -> Result<(usize, String, usize), ParseError> {
    let mut content = String::new();
    let mut depth = 0usize;
    let mut newlines = 0;
    let mut i = start;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                let nested = scan_quoted(chars, i + 1, line + newlines)?;
                content.extend(&chars[i..nested.end]);
                newlines += nested.newlines;
                i = nested.end;
                continue;
            }
            '{' => depth += 1,
            '}' if depth == 0 => return Ok((i + 1, content, newlines)),
            '}' => depth -= 1,
            '\n' => newlines += 1,
            _ => {}
        }
        content.push(chars[i]);
        i += 1;
    }

    Err(ParseError::UnterminatedInterpolation { line })
}

/// Try to scan a heredoc starting at `start` (which points at the first `<`).
/// Returns `Ok(None)` when the text at `start` is not a heredoc opener.
pub(crate) fn scan_heredoc(chars: &[char], start: usize, line: usize) -> Result<Option<Heredoc>, ParseError> {
    if chars.get(start) != Some(&'<') || chars.get(start + 1) != Some(&'<') {
        return Ok(None);
    }
    let mut i = start + 2;
    if chars.get(i) == Some(&'-') {
        i += 1;
    }

    let marker_start = i;
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    if i == marker_start || !(chars[marker_start].is_ascii_alphabetic() || chars[marker_start] == '_') {
        return Ok(None);
    }
    let marker: String = chars[marker_start..i].iter().collect();

    while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t' || chars[i] == '\r') {
        i += 1;
    }
    if chars.get(i) != Some(&'\n') {
        return Ok(None);
    }
    i += 1;
    let mut newlines = 1;

    let mut body_lines: Vec<String> = Vec::new();
    while i < chars.len() {
        let line_end = chars[i..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(chars.len(), |p| i + p);
        let text: String = chars[i..line_end].iter().collect();

        if text.trim() == marker {
            return Ok(Some(Heredoc {
                end: line_end,
                marker,
                body: body_lines.join("\n"),
                newlines,
            }));
        }

        body_lines.push(text);
        if line_end < chars.len() {
            newlines += 1;
        }
        i = line_end + 1;
    }

    Err(ParseError::UnterminatedHeredoc { marker, line })
}

/// Extract `${...}` contents from a heredoc body.
pub(crate) fn heredoc_interpolations(body: &str, line: usize) -> Result<Vec<String>, ParseError> {
    let chars: Vec<char> = body.chars().collect();
    let mut found = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if (c == '$' || c == '%') && chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&'{') {
            i += 3;
        } else if (c == '$' || c == '%') && chars.get(i + 1) == Some(&'{') {
            let (end, content, _) = scan_interpolation(&chars, i + 2, line)?;
            found.push(content);
            i = end;
        } else {
            i += 1;
        }
    }

    Ok(found)
}
