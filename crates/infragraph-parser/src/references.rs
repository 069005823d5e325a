//! Dependency reference extraction

use std::collections::BTreeSet;

use infragraph_core::ResourceKey;

use crate::lexer::{Token, TokenKind, tokenize};

/// Prefixes that look like `<type>.<name>` but never name a managed resource.
pub const RESERVED_PREFIXES: [&str; 10] = [
    "var",
    "local",
    "data",
    "resource",
    "module",
    "path",
    "self",
    "count",
    "each",
    "terraform",
];

/// Collect every `<type>.<name>` reference in a body, including those inside
/// `${...}` interpolations. Plain string text is never scanned, and names
/// bound by `for` expressions are local variables rather than resource types.
pub fn extract_references(tokens: &[Token]) -> BTreeSet<ResourceKey> {
    let mut found = BTreeSet::new();
    collect(tokens, &BTreeSet::new(), &mut found);
    found
}

fn collect(tokens: &[Token], outer: &BTreeSet<String>, found: &mut BTreeSet<ResourceKey>) {
    let mut bound = outer.clone();
    bound.extend(for_binders(tokens));

    for (i, token) in tokens.iter().enumerate() {
        match &token.kind {
            TokenKind::Str { interpolations, .. } | TokenKind::Heredoc { interpolations, .. } => {
                for expression in interpolations {
                    match tokenize(expression) {
                        Ok(inner) => collect(&inner, &bound, found),
                        Err(e) => tracing::debug!("Skipping interpolation '{}': {}", expression, e),
                    }
                }
            }
            TokenKind::Ident(resource_type) => {
                let preceded_by_dot = i > 0 && tokens[i - 1].kind == TokenKind::Dot;
                if preceded_by_dot || bound.contains(resource_type) || !is_resource_type(resource_type) {
                    continue;
                }
                if let (Some(dot), Some(name)) = (tokens.get(i + 1), tokens.get(i + 2)) {
                    if dot.kind == TokenKind::Dot {
                        if let Some(name) = name.ident() {
                            found.insert(ResourceKey::new(resource_type.as_str(), name));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Names introduced by `for a in ...` and `for k, v in ...`.
fn for_binders(tokens: &[Token]) -> Vec<String> {
    let mut names = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].ident() != Some("for") {
            i += 1;
            continue;
        }
        let mut binders = Vec::new();
        let mut j = i + 1;
        while let Some(token) = tokens.get(j) {
            match (&token.kind, token.ident()) {
                (_, Some("in")) => {
                    names.append(&mut binders);
                    break;
                }
                (TokenKind::Comma, _) => {}
                (TokenKind::Ident(name), _) => binders.push(name.clone()),
                _ => break,
            }
            j += 1;
        }
        i = j.max(i + 1);
    }
    names
}

fn is_resource_type(word: &str) -> bool {
    word.contains('_') && !RESERVED_PREFIXES.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(text: &str) -> Vec<String> {
        extract_references(&tokenize(text).unwrap())
            .into_iter()
            .map(|k| k.to_string())
            .collect()
    }

    #[test]
    fn test_bare_and_interpolated_references() {
        let found = refs(
            r#"
subnet_id  = aws_subnet.public.id
user_data  = "host=${aws_db_instance.orders.address}"
depends_on = [aws_security_group.web, aws_subnet.public]
"#,
        );
        assert_eq!(
            found,
            vec![
                "aws_db_instance.orders",
                "aws_security_group.web",
                "aws_subnet.public",
            ]
        );
    }

    #[test]
    fn test_reserved_prefixes_and_plain_text() {
        let found = refs(
            r#"
ami     = data.aws_ami.ubuntu.id
name    = "${var.env}-${local.suffix}"
cidr    = module.network.aws_vpc_cidr
note    = "see aws_vpc.main for details"
index   = count.index
item    = each.value
"#,
        );
        assert!(found.is_empty(), "unexpected references: {:?}", found);
    }

    #[test]
    fn test_for_expression_variables_are_not_references() {
        let found = refs(
            r#"
subnet_ids = [for sub_net in var.subnets : sub_net.id]
by_zone    = {for zone_key, sub_net in aws_subnet.private : zone_key => sub_net.cidr_block}
names      = [for web_host in aws_instance.pool : "${web_host.name}-${aws_vpc.main.id}"]
"#,
        );
        assert_eq!(found, vec!["aws_instance.pool", "aws_subnet.private", "aws_vpc.main"]);
        assert_eq!(for_binders(&tokenize("[for k, v in x : v]").unwrap()), vec!["k", "v"]);
    }

    #[test]
    fn test_nested_interpolation_and_heredoc() {
        let found = refs(
            "script = <<EOF\nping ${aws_instance.web.private_ip}\nEOF\nlabel = \"${join(\"-\", [\"${aws_s3_bucket.logs.id}\"])}\"\n",
        );
        assert_eq!(found, vec!["aws_instance.web", "aws_s3_bucket.logs"]);
    }
}
