use syn::{Attribute, Expr, ExprLit, Lit, Meta};

/// Collect `///`, `/** */` and `#[doc = "..."]` text into a cleaned docstring.
///
/// Returns an empty string when the item is undocumented.
pub fn docstring(attrs: &[Attribute]) -> String {
    let raw = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    clean_doc(&raw)
}

/// Strip the common indentation and surrounding blank lines of doc text
pub fn clean_doc(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim_end).collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = lines
        .iter()
        .map(|line| {
            line.char_indices()
                .nth(indent)
                .map_or("", |(offset, _)| &line[offset..])
        })
        .collect();

    let start = dedented.iter().position(|l| !l.is_empty());
    let end = dedented.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => dedented[start..=end].join("\n"),
        _ => String::new(),
    }
}
