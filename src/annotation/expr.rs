use crate::core::TypeRef;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use syn::punctuated::Punctuated;
use syn::{Expr, GenericArgument, Lit, MetaNameValue, PathArguments, Token, Type};

/// Last path segment that marks a tagged wrapper
pub const TAGGED_WRAPPER: &str = "Annotated";

/// Macro name carrying a key/value side channel inside a tagged wrapper
pub const SIDE_CHANNEL_MACRO: &str = "meta";

/// A type-annotation expression, independent of where it was declared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationExpr {
    Bare(TypeRef),
    Tagged {
        base: Box<AnnotationExpr>,
        side_channel: SideChannel,
    },
    Tuple(Vec<AnnotationExpr>),
}

/// Auxiliary payload of a tagged wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideChannel {
    /// Key/value fields merged into the resulting annotation
    Mapping(Map<String, Value>),
    /// Any other payload; carried along but never interpreted
    Opaque(TypeRef),
}

impl AnnotationExpr {
    pub fn bare(name: impl Into<TypeRef>) -> Self {
        Self::Bare(name.into())
    }

    pub fn tagged(base: AnnotationExpr, fields: Map<String, Value>) -> Self {
        Self::Tagged {
            base: Box::new(base),
            side_channel: SideChannel::Mapping(fields),
        }
    }

    pub fn tuple(items: impl IntoIterator<Item = AnnotationExpr>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self, Self::Tagged { .. })
    }

    /// Lower a `syn` type into an annotation expression.
    ///
    /// Only top-level structure is interpreted: a tuple nested inside a
    /// generic argument stays part of a bare type.
    pub fn from_syn(ty: &Type) -> Result<Self> {
        match ty {
            Type::Paren(paren) => Self::from_syn(&paren.elem),
            Type::Group(group) => Self::from_syn(&group.elem),
            Type::Tuple(tuple) if !tuple.elems.is_empty() => tuple
                .elems
                .iter()
                .map(Self::from_syn)
                .collect::<Result<Vec<_>>>()
                .map(Self::Tuple),
            Type::Path(type_path) if type_path.qself.is_none() => {
                match tagged_parts(&type_path.path) {
                    Some((base, payload)) => Ok(Self::Tagged {
                        base: Box::new(Self::from_syn(base)?),
                        side_channel: SideChannel::from_syn(payload)?,
                    }),
                    None => Ok(Self::Bare(TypeRef::from_syn(ty))),
                }
            }
            _ => Ok(Self::Bare(TypeRef::from_syn(ty))),
        }
    }

    /// The type this expression denotes, rendered as a single reference
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Self::Bare(type_ref) => type_ref.clone(),
            Self::Tagged { base, side_channel } => TypeRef::new(format!(
                "{TAGGED_WRAPPER}<{}, {}>",
                base.type_ref(),
                side_channel.render()
            )),
            Self::Tuple(items) if items.len() == 1 => {
                TypeRef::new(format!("({},)", items[0].type_ref()))
            }
            Self::Tuple(items) => TypeRef::new(format!(
                "({})",
                items
                    .iter()
                    .map(|item| item.type_ref().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

impl SideChannel {
    fn from_syn(payload: &Type) -> Result<Self> {
        let Type::Macro(type_macro) = payload else {
            return Ok(Self::Opaque(TypeRef::from_syn(payload)));
        };
        if !type_macro.mac.path.is_ident(SIDE_CHANNEL_MACRO) {
            return Ok(Self::Opaque(TypeRef::from_syn(payload)));
        }

        let pairs = type_macro
            .mac
            .parse_body_with(Punctuated::<MetaNameValue, Token![,]>::parse_terminated)
            .map_err(|e| Error::schema_mismatch(format!("malformed side channel: {e}")))?;

        let mut fields = Map::new();
        for pair in pairs {
            let key = pair
                .path
                .get_ident()
                .map(ToString::to_string)
                .ok_or_else(|| Error::schema_mismatch("side-channel keys must be identifiers"))?;
            let value = literal_value(&key, &pair.value)?;
            fields.insert(key, value);
        }
        Ok(Self::Mapping(fields))
    }

    fn render(&self) -> String {
        match self {
            Self::Mapping(fields) => {
                let body = fields
                    .iter()
                    .map(|(key, value)| format!("{key} = {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{SIDE_CHANNEL_MACRO}!({body})")
            }
            Self::Opaque(type_ref) => type_ref.to_string(),
        }
    }
}

/// Split `Annotated<Base, Payload>` into its two type arguments
fn tagged_parts(path: &syn::Path) -> Option<(&Type, &Type)> {
    let last = path.segments.last()?;
    if last.ident != TAGGED_WRAPPER {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    let mut types = args.args.iter().map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });
    match (types.next(), types.next(), types.next()) {
        (Some(Some(base)), Some(Some(payload)), None) => Some((base, payload)),
        _ => None,
    }
}

fn literal_value(key: &str, expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(Value::String(s.value())),
            Lit::Bool(b) => Ok(Value::Bool(b.value)),
            Lit::Int(i) => i
                .base10_parse::<i64>()
                .map(Value::from)
                .map_err(|e| Error::schema_mismatch(format!("`{key}`: {e}"))),
            Lit::Float(f) => f
                .base10_parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| Error::schema_mismatch(format!("`{key}`: invalid float"))),
            _ => Err(Error::schema_mismatch(format!(
                "unsupported literal for `{key}`"
            ))),
        },
        Expr::Path(path) if path.qself.is_none() => Ok(Value::String(
            crate::core::types::render_tokens(
                &quote::ToTokens::to_token_stream(&path.path).to_string(),
            ),
        )),
        _ => Err(Error::schema_mismatch(format!(
            "unsupported value for `{key}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lower(src: &str) -> AnnotationExpr {
        let ty: Type = syn::parse_str(src).unwrap();
        AnnotationExpr::from_syn(&ty).unwrap()
    }

    #[test]
    fn test_bare_type() {
        assert_eq!(lower("Vec<u8>"), AnnotationExpr::bare("Vec<u8>"));
        assert_eq!(lower("()"), AnnotationExpr::bare("()"));
    }

    #[test]
    fn test_tagged_with_mapping() {
        let expr = lower(r#"Annotated<f64, meta!(label = "speed", unit = "m/s", scale = 2)>"#);
        let AnnotationExpr::Tagged { base, side_channel } = expr else {
            panic!("expected tagged wrapper");
        };
        assert_eq!(*base, AnnotationExpr::bare("f64"));
        let SideChannel::Mapping(fields) = side_channel else {
            panic!("expected mapping");
        };
        assert_eq!(fields["label"], json!("speed"));
        assert_eq!(fields["unit"], json!("m/s"));
        assert_eq!(fields["scale"], json!(2));
    }

    #[test]
    fn test_tagged_with_opaque_payload() {
        let expr = lower("typing::Annotated<u32, Marker>");
        assert_eq!(
            expr,
            AnnotationExpr::Tagged {
                base: Box::new(AnnotationExpr::bare("u32")),
                side_channel: SideChannel::Opaque(TypeRef::new("Marker")),
            }
        );
    }

    #[test]
    fn test_wrong_arity_wrapper_is_bare() {
        assert_eq!(lower("Annotated<u32>"), AnnotationExpr::bare("Annotated<u32>"));
    }

    #[test]
    fn test_tuple_members_are_lowered() {
        let expr = lower(r#"(i64, Annotated<String, meta!(label = "name")>)"#);
        let AnnotationExpr::Tuple(items) = expr else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], AnnotationExpr::bare("i64"));
        assert!(items[1].is_tagged());
    }

    #[test]
    fn test_nested_tuple_in_generic_stays_bare() {
        assert_eq!(lower("Vec<(u8, u8)>"), AnnotationExpr::bare("Vec<(u8, u8)>"));
    }

    #[test]
    fn test_unsupported_side_channel_value() {
        let ty: Type = syn::parse_str(r#"Annotated<f64, meta!(label = 1 + 2)>"#).unwrap();
        let err = AnnotationExpr::from_syn(&ty).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_type_ref_rendering() {
        let expr = AnnotationExpr::tuple([
            AnnotationExpr::bare("i64"),
            AnnotationExpr::tagged(
                AnnotationExpr::bare("String"),
                json!({"label": "name"}).as_object().cloned().unwrap(),
            ),
        ]);
        assert_eq!(
            expr.type_ref().as_str(),
            r#"(i64, Annotated<String, meta!(label = "name")>)"#
        );
        let single = AnnotationExpr::tuple([AnnotationExpr::bare("u8")]);
        assert_eq!(single.type_ref().as_str(), "(u8,)");
    }
}
