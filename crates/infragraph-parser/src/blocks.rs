//! Top-level block extraction
//!
//! A brace-depth scanner bounds each block body; a small recursive-descent
//! pass over the header turns it into a tagged [`Block`].

use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

/// A top-level block. Bodies are the tokens between the outer braces.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Resource {
        resource_type: String,
        name: String,
        body: Vec<Token>,
        line: usize,
    },
    Variable {
        name: String,
        body: Vec<Token>,
        line: usize,
    },
    Output {
        name: String,
        body: Vec<Token>,
        line: usize,
    },
    Module {
        name: String,
        body: Vec<Token>,
        line: usize,
    },
    /// Recognised but not modeled: `provider`, `terraform`, `locals`, `data`, ...
    Other {
        kind: String,
        labels: Vec<String>,
        line: usize,
    },
}

impl Block {
    pub fn kind(&self) -> &str {
        match self {
            Block::Resource { .. } => "resource",
            Block::Variable { .. } => "variable",
            Block::Output { .. } => "output",
            Block::Module { .. } => "module",
            Block::Other { kind, .. } => kind,
        }
    }
}

/// Number of labels a block kind requires, when the grammar fixes it.
fn expected_labels(kind: &str) -> Option<usize> {
    match kind {
        "resource" | "data" => Some(2),
        "variable" | "output" | "module" | "provider" => Some(1),
        "terraform" | "locals" => Some(0),
        _ => None,
    }
}

pub fn parse_blocks(tokens: &[Token]) -> Result<Vec<Block>, ParseError> {
    BlockParser { tokens, pos: 0 }.parse()
}

struct BlockParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> BlockParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn parse(mut self) -> Result<Vec<Block>, ParseError> {
        let mut blocks = Vec::new();

        while let Some(token) = self.peek() {
            match &token.kind {
                TokenKind::Newline => self.pos += 1,
                TokenKind::Ident(kind) => {
                    if matches!(self.tokens.get(self.pos + 1), Some(t) if t.kind == TokenKind::Equals) {
                        self.skip_assignment()?;
                        continue;
                    }
                    let kind = kind.clone();
                    self.pos += 1;
                    blocks.push(self.block(kind, token.line)?);
                }
                TokenKind::RBrace => return Err(ParseError::UnexpectedClose { line: token.line }),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        line: token.line,
                        found: other.to_string(),
                    });
                }
            }
        }

        Ok(blocks)
    }

    fn block(&mut self, kind: String, line: usize) -> Result<Block, ParseError> {
        let labels = self.labels(&kind, line)?;
        if let Some(expected) = expected_labels(&kind) {
            if labels.len() != expected {
                return Err(ParseError::MissingLabels {
                    kind,
                    line,
                    expected,
                    found: labels.len(),
                });
            }
        }

        let body = self.body(&kind, line)?;
        if !matches!(kind.as_str(), "resource" | "variable" | "output" | "module") {
            return Ok(Block::Other { kind, labels, line });
        }

        let mut labels = labels.into_iter();
        let mut label = || labels.next().unwrap_or_default();

        Ok(match kind.as_str() {
            "resource" => Block::Resource {
                resource_type: label(),
                name: label(),
                body,
                line,
            },
            "variable" => Block::Variable {
                name: label(),
                body,
                line,
            },
            "output" => Block::Output {
                name: label(),
                body,
                line,
            },
            _ => Block::Module {
                name: label(),
                body,
                line,
            },
        })
    }

    /// Labels up to the opening brace, which is consumed.
    fn labels(&mut self, kind: &str, line: usize) -> Result<Vec<String>, ParseError> {
        let mut labels = Vec::new();
        loop {
            let Some(token) = self.peek() else {
                return Err(ParseError::UnclosedBlock {
                    kind: kind.to_string(),
                    line,
                });
            };
            self.pos += 1;
            match &token.kind {
                TokenKind::LBrace => return Ok(labels),
                _ => match token.label() {
                    Some(label) => labels.push(label.to_string()),
                    None => {
                        return Err(ParseError::UnexpectedToken {
                            line: token.line,
                            found: token.kind.to_string(),
                        });
                    }
                },
            }
        }
    }

    /// Tokens up to the matching close brace, which is consumed.
    fn body(&mut self, kind: &str, line: usize) -> Result<Vec<Token>, ParseError> {
        let start = self.pos;
        let mut depth = 1usize;

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let body = self.tokens[start..self.pos].to_vec();
                        self.pos += 1;
                        return Ok(body);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }

        Err(ParseError::UnclosedBlock {
            kind: kind.to_string(),
            line,
        })
    }

    /// Skip a top-level `name = value` line, including multi-line values.
    fn skip_assignment(&mut self) -> Result<(), ParseError> {
        let line = self.peek().map_or(0, |t| t.line);
        let mut depth = 0usize;

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    if depth == 0 {
                        return Err(ParseError::UnexpectedClose { line: token.line });
                    }
                    depth -= 1;
                }
                TokenKind::Newline if depth == 0 => return Ok(()),
                _ => {}
            }
            self.pos += 1;
        }

        if depth > 0 {
            return Err(ParseError::UnclosedBlock {
                kind: "assignment".to_string(),
                line,
            });
        }
        Ok(())
    }
}
