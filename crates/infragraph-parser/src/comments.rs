//! Comment stripping for `/* */`, `#` and `//` comments
//!
//! Comments are blanked with spaces rather than removed, so line numbers in
//! later diagnostics still point at the original text.

use crate::error::ParseError;
use crate::template::{scan_heredoc, scan_quoted};

/// Blank out every comment in `text`. String literals and heredocs are copied verbatim.
pub fn strip_comments(text: &str) -> Result<String, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match (c, next) {
            ('"', _) => {
                let quoted = scan_quoted(&chars, i + 1, line)?;
                out.extend(&chars[i..quoted.end]);
                line += quoted.newlines;
                i = quoted.end;
            }
            ('<', Some('<')) => match scan_heredoc(&chars, i, line)? {
                Some(heredoc) => {
                    out.extend(&chars[i..heredoc.end]);
                    line += heredoc.newlines;
                    i = heredoc.end;
                }
                None => {
                    out.push_str("<<");
                    i += 2;
                }
            },
            ('#', _) | ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(' ');
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                let opened_at = line;
                let close = (i + 2..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                    .ok_or(ParseError::UnterminatedComment { line: opened_at })?;
                for &ch in &chars[i..close + 2] {
                    if ch == '\n' {
                        out.push('\n');
                        line += 1;
                    } else {
                        out.push(' ');
                    }
                }
                i = close + 2;
            }
            ('\n', _) => {
                out.push('\n');
                line += 1;
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(out)
}
