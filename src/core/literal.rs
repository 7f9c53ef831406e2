//! Conversion between the caller-facing literal syntax `"value"^^datatype` and the
//! stored syntax `"value"^^<datatype>`.
//!
//! Both directions are best-effort: anything that does not look like a datatyped
//! literal (IRIs, blank nodes, plain or language-tagged literals, unbalanced input)
//! is returned unchanged.

/// Wraps the datatype of a literal in angle brackets.
///
/// ```
/// use hdt_query::core::literal::to_internal;
///
/// assert_eq!(
///     to_internal("\"5\"^^http://www.w3.org/2001/XMLSchema#integer"),
///     "\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>"
/// );
/// assert_eq!(to_internal("\"chat\"@fr"), "\"chat\"@fr");
/// ```
pub fn to_internal(literal: &str) -> String {
    if !literal.starts_with('"') || literal.ends_with('"') || literal.len() < 2 {
        return literal.to_string();
    }
    // already bracketed
    if literal.ends_with('>') {
        return literal.to_string();
    }
    match literal.rfind(['^', '@']) {
        Some(pos) if literal.as_bytes()[pos] == b'^' => {
            let (head, datatype) = literal.split_at(pos + 1);
            format!("{head}<{datatype}>")
        }
        _ => literal.to_string(),
    }
}

/// Strips the angle brackets around the datatype of a stored literal.
pub fn to_external(literal: &str) -> String {
    if !literal.starts_with('"') || !literal.ends_with('>') {
        return literal.to_string();
    }
    match literal.rfind('<') {
        Some(pos) => {
            let mut external = String::with_capacity(literal.len() - 2);
            external.push_str(&literal[..pos]);
            external.push_str(&literal[pos + 1..literal.len() - 1]);
            external
        }
        None => literal.to_string(),
    }
}

/// Returns true when the term is a literal (quoted) rather than an IRI or blank node.
pub fn is_literal(term: &str) -> bool {
    term.starts_with('"')
}

/// Lexical value of a literal: the text between the opening quote and the last quote.
pub fn lexical_value(literal: &str) -> Option<&str> {
    let rest = literal.strip_prefix('"')?;
    let end = rest.rfind('"')?;
    Some(&rest[..end])
}
