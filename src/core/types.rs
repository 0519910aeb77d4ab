use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized textual reference to a type, e.g. `Vec<u8>` or `(i64, String)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Render a `syn` type with normalized spacing
    pub fn from_syn(ty: &syn::Type) -> Self {
        Self(render_tokens(&quote::ToTokens::to_token_stream(ty).to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Collapse the spacing `proc_macro2` puts between every token.
///
/// `Vec < u8 >` becomes `Vec<u8>`, `& 'a mut str` becomes `&'a mut str`.
/// Groups arrive pre-joined (`(u8 , u8)`), so only their edges are inspected.
pub(crate) fn render_tokens(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev: Option<&str> = None;
    for token in raw.split_whitespace() {
        if prev.is_some_and(|p| needs_space(p, token)) {
            out.push(' ');
        }
        out.push_str(token);
        prev = Some(token);
    }
    out
}

fn needs_space(prev: &str, next: &str) -> bool {
    if matches!(next, ">" | "::" | "," | ")" | "]" | ";") {
        return false;
    }
    if matches!(prev, "<" | "::" | "(" | "[" | "&" | "*") {
        return false;
    }
    if next == "<" || next.starts_with('(') {
        return !is_word(prev);
    }
    true
}

fn is_word(token: &str) -> bool {
    token
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Describes one typed slot of a callable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub label: Option<String>,
    pub datatype: Option<TypeRef>,
    pub unit: Option<String>,
    pub quantity: Option<String>,
}

impl Annotation {
    /// Annotation carrying only a datatype
    pub fn of(datatype: impl Into<TypeRef>) -> Self {
        Self {
            datatype: Some(datatype.into()),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }
}

/// Identity of a callable's definition site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub module: String,
    pub qualname: String,
    pub version: Option<String>,
}

/// Parameter name to annotation, in declaration order
pub type Inputs = IndexMap<String, Option<Annotation>>;

/// Output label to annotation
pub type Outputs = IndexMap<String, Option<Annotation>>;

/// Synthesized description of a callable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub author_name: String,
    pub author_email: String,
    pub origin: Origin,
    pub source_code: String,
    pub source_code_hash: String,
    pub docstring: String,
    pub inputs: Inputs,
    pub outputs: Outputs,
}

impl Metadata {
    pub fn to_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> crate::errors::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
