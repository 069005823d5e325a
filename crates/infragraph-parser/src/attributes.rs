//! Flat scalar attribute extraction from block bodies

use std::collections::BTreeMap;

use infragraph_core::Scalar;

use crate::lexer::{Token, TokenKind, render};

/// A `key = value` statement at body depth 0. Nested blocks are not statements.
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    pub key: &'a str,
    pub value: &'a [Token],
}

/// Split a body into its top-level assignments.
pub fn assignments(body: &[Token]) -> Vec<Assignment<'_>> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut at_line_start = true;
    let mut i = 0;

    while i < body.len() {
        let token = &body[i];

        if depth == 0 && at_line_start {
            if let (Some(key), Some(next)) = (token.ident(), body.get(i + 1)) {
                if next.kind == TokenKind::Equals {
                    let start = i + 2;
                    let end = value_end(body, start);
                    found.push(Assignment {
                        key,
                        value: &body[start..end],
                    });
                    i = end;
                    continue;
                }
            }
        }

        match token.kind {
            TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
        at_line_start = token.kind == TokenKind::Newline;
        i += 1;
    }

    found
}

/// Index just past a value: the first newline outside any nesting, or the end of the body.
fn value_end(body: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, token) in body[start..].iter().enumerate() {
        match token.kind {
            TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Newline if depth == 0 => return start + offset,
            _ => {}
        }
    }
    body.len()
}

/// Interpret a value as a scalar: a string literal, `true`/`false` or an integer.
pub fn scalar_value(value: &[Token]) -> Option<Scalar> {
    match value {
        [token] => match &token.kind {
            TokenKind::Str { value, .. } => Some(Scalar::String(value.clone())),
            TokenKind::Ident(word) if word == "true" => Some(Scalar::Bool(true)),
            TokenKind::Ident(word) if word == "false" => Some(Scalar::Bool(false)),
            TokenKind::Number(digits) => digits.parse().ok().map(Scalar::Integer),
            _ => None,
        },
        [sign, number] if sign.kind == TokenKind::Other('-') => match &number.kind {
            TokenKind::Number(digits) => digits.parse::<i64>().ok().map(|n| Scalar::Integer(-n)),
            _ => None,
        },
        _ => None,
    }
}

/// Every flat scalar attribute of a body. Later assignments of the same key win.
pub fn scalar_attributes(body: &[Token]) -> BTreeMap<String, Scalar> {
    assignments(body)
        .into_iter()
        .filter_map(|a| scalar_value(a.value).map(|v| (a.key.to_string(), v)))
        .collect()
}

/// The raw text of the value assigned to `key`, if any.
pub fn raw_expression(body: &[Token], key: &str) -> Option<String> {
    assignments(body)
        .into_iter()
        .rev()
        .find(|a| a.key == key)
        .map(|a| render(a.value))
}

/// The string value assigned to `key`, if it is a plain string literal.
pub fn string_attribute(body: &[Token], key: &str) -> Option<String> {
    match assignments(body).into_iter().rev().find(|a| a.key == key) {
        Some(Assignment { value: [token], .. }) => match &token.kind {
            TokenKind::Str { value, .. } => Some(value.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_flat_scalars_only() {
        let body = tokenize(
            r#"
  ami           = "ami-0abc"
  instance_type = "t3.micro"
  monitoring    = true
  count         = 2
  offset        = -5
  ratio         = 1.5
  subnet_id     = aws_subnet.public.id
  tags = {
    Name = "web"
  }
  ebs_block_device {
    volume_size = 100
  }
"#,
        )
        .unwrap();

        let attrs = scalar_attributes(&body);
        assert_eq!(attrs.get("ami"), Some(&Scalar::String("ami-0abc".into())));
        assert_eq!(attrs.get("monitoring"), Some(&Scalar::Bool(true)));
        assert_eq!(attrs.get("count"), Some(&Scalar::Integer(2)));
        assert_eq!(attrs.get("offset"), Some(&Scalar::Integer(-5)));
        assert!(!attrs.contains_key("ratio"));
        assert!(!attrs.contains_key("subnet_id"));
        assert!(!attrs.contains_key("Name"));
        assert!(!attrs.contains_key("volume_size"));
        assert_eq!(attrs.len(), 5);
    }

    #[test]
    fn test_raw_expression_and_strings() {
        let body = tokenize("value = aws_instance.web.public_ip\ndescription = \"Public IP\"\n").unwrap();
        assert_eq!(raw_expression(&body, "value").as_deref(), Some("aws_instance.web.public_ip"));
        assert_eq!(string_attribute(&body, "description").as_deref(), Some("Public IP"));
        assert_eq!(string_attribute(&body, "value"), None);
        assert_eq!(raw_expression(&body, "missing"), None);
    }
}
