//! Tokenizer for comment-free configuration text

use std::fmt;

use crate::error::ParseError;
use crate::template::{heredoc_interpolations, scan_heredoc, scan_quoted};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifiers may contain `-` (`google-beta`, `for-each` style labels).
    Ident(String),
    Number(String),
    Str {
        value: String,
        interpolations: Vec<String>,
    },
    Heredoc {
        body: String,
        interpolations: Vec<String>,
    },
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Equals,
    Comma,
    Dot,
    Colon,
    Newline,
    /// Multi-character operators: `==`, `!=`, `<=`, `>=`, `=>`, `&&`, `||`.
    Operator(String),
    Other(char),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) | TokenKind::Number(s) | TokenKind::Operator(s) => f.write_str(s),
            TokenKind::Str { value, .. } => write!(f, "\"{}\"", value),
            TokenKind::Heredoc { body, .. } => write!(f, "<<EOT\n{}\nEOT", body),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Equals => f.write_str("="),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Newline => f.write_str("\n"),
            TokenKind::Other(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Label text: a quoted string or a bare identifier.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Str { value, .. } => Some(value),
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }
}

const OPERATORS: [&str; 7] = ["==", "!=", "<=", ">=", "=>", "&&", "||"];

fn push(tokens: &mut Vec<Token>, kind: TokenKind, line: usize) {
    if kind == TokenKind::Newline && matches!(tokens.last(), Some(t) if t.kind == TokenKind::Newline) {
        return;
    }
    tokens.push(Token { kind, line });
}

/// Split text into tokens. Consecutive newlines collapse into one `Newline`.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            push(&mut tokens, TokenKind::Newline, line);
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '"' {
            let quoted = scan_quoted(&chars, i + 1, line)?;
            push(
                &mut tokens,
                TokenKind::Str {
                    value: quoted.value,
                    interpolations: quoted.interpolations,
                },
                line,
            );
            line += quoted.newlines;
            i = quoted.end;
            continue;
        }

        if c == '<' && chars.get(i + 1) == Some(&'<') {
            if let Some(heredoc) = scan_heredoc(&chars, i, line)? {
                let interpolations = heredoc_interpolations(&heredoc.body, line)?;
                push(
                    &mut tokens,
                    TokenKind::Heredoc {
                        body: heredoc.body,
                        interpolations,
                    },
                    line,
                );
                line += heredoc.newlines;
                i = heredoc.end;
                continue;
            }
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '-') {
                i += 1;
            }
            push(&mut tokens, TokenKind::Ident(chars[start..i].iter().collect()), line);
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                // `1.5` is one number, `count.index` never starts with a digit
                if chars[i] == '.' && !chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
                    break;
                }
                i += 1;
            }
            push(&mut tokens, TokenKind::Number(chars[start..i].iter().collect()), line);
            continue;
        }

        if let Some(next) = chars.get(i + 1) {
            let pair: String = [c, *next].iter().collect();
            if OPERATORS.contains(&pair.as_str()) {
                push(&mut tokens, TokenKind::Operator(pair), line);
                i += 2;
                continue;
            }
        }

        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' => TokenKind::Equals,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            other => TokenKind::Other(other),
        };
        push(&mut tokens, kind, line);
        i += 1;
    }

    Ok(tokens)
}

/// Render tokens back into a compact expression string.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&TokenKind> = None;

    for token in tokens {
        if token.kind == TokenKind::Newline {
            continue;
        }
        let glued = matches!(
            (prev, &token.kind),
            (None, _)
                | (Some(TokenKind::Dot), _)
                | (_, TokenKind::Dot)
                | (Some(TokenKind::LParen | TokenKind::LBracket), _)
                | (_, TokenKind::RParen | TokenKind::RBracket | TokenKind::Comma | TokenKind::LParen)
                | (_, TokenKind::LBracket)
        );
        if !glued {
            out.push(' ');
        }
        out.push_str(&token.kind.to_string());
        prev = Some(&token.kind);
    }

    out
}
