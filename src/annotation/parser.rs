use super::expr::{AnnotationExpr, SideChannel};
use crate::core::{Annotation, TypeRef};
use crate::errors::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Side-channel keys accepted by the annotation schema
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SideChannelFields {
    label: Option<String>,
    datatype: Option<String>,
    unit: Option<String>,
    quantity: Option<String>,
}

/// Interpret a single annotation expression.
///
/// - absent expression: `Ok(None)`
/// - bare type or tuple: annotation with only `datatype` set
/// - tagged wrapper: `datatype` is the base type; a mapping side channel is
///   then merged on top, and any field it sets wins, `datatype` included
///
/// Exactly one level of tagging is unwrapped. A tagged base stays whole and
/// becomes the datatype.
///
/// # Errors
///
/// Returns [`Error::SchemaMismatch`] when the side channel has a key outside
/// `label`, `datatype`, `unit`, `quantity`, a non-string value, or a
/// `datatype` that does not name a type.
pub fn parse_annotation(expr: Option<&AnnotationExpr>) -> Result<Option<Annotation>> {
    let Some(expr) = expr else {
        return Ok(None);
    };

    match expr {
        AnnotationExpr::Tagged { base, side_channel } => {
            let mut annotation = Annotation::of(base.type_ref());
            if let SideChannel::Mapping(fields) = side_channel {
                merge_side_channel(&mut annotation, fields)?;
            }
            Ok(Some(annotation))
        }
        other => Ok(Some(Annotation::of(other.type_ref()))),
    }
}

fn merge_side_channel(annotation: &mut Annotation, fields: &Map<String, Value>) -> Result<()> {
    let parsed: SideChannelFields = serde_json::from_value(Value::Object(fields.clone()))
        .map_err(|e| Error::schema_mismatch(e.to_string()))?;

    if let Some(label) = parsed.label {
        annotation.label = Some(label);
    }
    if let Some(datatype) = parsed.datatype {
        annotation.datatype = Some(parse_datatype(&datatype)?);
    }
    if let Some(unit) = parsed.unit {
        annotation.unit = Some(unit);
    }
    if let Some(quantity) = parsed.quantity {
        annotation.quantity = Some(quantity);
    }
    Ok(())
}

fn parse_datatype(raw: &str) -> Result<TypeRef> {
    syn::parse_str::<syn::Type>(raw)
        .map(|ty| TypeRef::from_syn(&ty))
        .map_err(|_| Error::schema_mismatch(format!("`datatype` must name a type, got `{raw}`")))
}
