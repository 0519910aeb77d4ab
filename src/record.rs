//! Bridges between record types and positional field tuples.
//!
//! A record type is a struct with named, ordered fields. The constructor
//! adapter builds a record from positional values; the decomposer adapter
//! turns a record back into its values in declaration order. Both keep a
//! reference to the record type so a workflow can treat "returns a record"
//! and "returns a tuple" interchangeably.

use crate::annotation::AnnotationExpr;
use crate::errors::{Error, Result};
use crate::introspect::docs::docstring;
use crate::introspect::{Callable, CallableKind, Definition};
use crate::signature::Signature;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use syn::{Fields, Item};

/// One named field of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub annotation: Option<AnnotationExpr>,
}

impl RecordField {
    pub fn new(name: impl Into<String>, annotation: Option<AnnotationExpr>) -> Self {
        Self {
            name: name.into(),
            annotation,
        }
    }
}

/// Descriptor of a struct with named fields
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    name: String,
    module_path: String,
    fields: Vec<RecordField>,
    docs: String,
    source: Option<String>,
}

impl RecordType {
    /// Declare a record type directly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARecordType`] if two fields share a name.
    pub fn new(
        module_path: impl Into<String>,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = RecordField>,
    ) -> Result<Self> {
        let name = name.into();
        let fields: Vec<RecordField> = fields.into_iter().collect();
        let mut seen = HashSet::new();
        if let Some(dup) = fields.iter().find(|f| !seen.insert(f.name.as_str())) {
            return Err(Error::NotARecordType(format!(
                "{name} (duplicate field `{}`)",
                dup.name
            )));
        }
        Ok(Self {
            name,
            module_path: module_path.into(),
            fields,
            docs: String::new(),
            source: None,
        })
    }

    /// Describe a parsed item, which must be a struct with named fields
    pub fn from_item(module_path: &str, item: &Item) -> Result<Self> {
        let Item::Struct(item_struct) = item else {
            return Err(Error::NotARecordType(item_label(item)));
        };
        let Fields::Named(named) = &item_struct.fields else {
            return Err(Error::NotARecordType(item_struct.ident.to_string()));
        };

        let fields = named
            .named
            .iter()
            .map(|field| {
                let name = field
                    .ident
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                Ok(RecordField::new(name, Some(AnnotationExpr::from_syn(&field.ty)?)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut record = Self::new(module_path, item_struct.ident.to_string(), fields)?;
        record.docs = docstring(&item_struct.attrs);
        Ok(record)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn docs(&self) -> &str {
        &self.docs
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn callable(&self, kind: CallableKind, name: &str, signature: Signature) -> Callable {
        let mut callable = Callable::new(kind, self.module_path.clone(), name)
            .with_qualname(format!("{}::{name}", self.name))
            .with_owner(self.name.clone())
            .with_docs(self.docs.clone())
            .with_signature(signature);
        if let Some(source) = &self.source {
            callable = callable.with_source(source.clone());
        }
        callable
    }
}

fn item_label(item: &Item) -> String {
    let ident = match item {
        Item::Enum(i) => Some(&i.ident),
        Item::Union(i) => Some(&i.ident),
        Item::Trait(i) => Some(&i.ident),
        Item::Type(i) => Some(&i.ident),
        Item::Const(i) => Some(&i.ident),
        Item::Static(i) => Some(&i.ident),
        Item::Fn(i) => Some(&i.sig.ident),
        Item::Mod(i) => Some(&i.ident),
        _ => None,
    };
    ident.map_or_else(|| "item".to_string(), ToString::to_string)
}

/// An instance of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    record_type: Arc<RecordType>,
    values: Vec<Value>,
}

impl Record {
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Field values in declaration order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record_type
            .fields
            .iter()
            .position(|f| f.name == field)
            .map(|i| &self.values[i])
    }

    /// The record as a JSON object keyed by field name
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.record_type
                .fields
                .iter()
                .zip(&self.values)
                .map(|(f, v)| (f.name.clone(), v.clone()))
                .collect(),
        )
    }
}

fn require_record(definition: &Definition) -> Result<Arc<RecordType>> {
    match definition {
        Definition::Record(record) => Ok(Arc::clone(record)),
        other => Err(Error::NotARecordType(other.name().to_string())),
    }
}

/// Builds records from positional field values
#[derive(Debug, Clone)]
pub struct RecordConstructor {
    record_type: Arc<RecordType>,
}

/// Adapter taking the record's fields as parameters and returning the record.
///
/// # Errors
///
/// Returns [`Error::NotARecordType`] unless `definition` is a record type.
pub fn to_record_constructor(definition: &Definition) -> Result<RecordConstructor> {
    Ok(RecordConstructor {
        record_type: require_record(definition)?,
    })
}

impl RecordConstructor {
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Build a record from values in field order
    pub fn call(&self, args: Vec<Value>) -> Result<Record> {
        let expected = self.record_type.fields.len();
        if args.len() != expected {
            return Err(Error::argument_mismatch(
                &self.record_type.name,
                format!("expected {expected} values, got {}", args.len()),
            ));
        }
        Ok(Record {
            record_type: Arc::clone(&self.record_type),
            values: args,
        })
    }

    /// Build a record from values keyed by field name
    pub fn call_named(&self, mut args: Map<String, Value>) -> Result<Record> {
        let mut values = Vec::with_capacity(self.record_type.fields.len());
        for field in &self.record_type.fields {
            let value = args.remove(&field.name).ok_or_else(|| {
                Error::argument_mismatch(
                    &self.record_type.name,
                    format!("missing field `{}`", field.name),
                )
            })?;
            values.push(value);
        }
        if let Some(extra) = args.keys().next() {
            return Err(Error::argument_mismatch(
                &self.record_type.name,
                format!("unexpected field `{extra}`"),
            ));
        }
        self.call(values)
    }

    /// Fields as parameters, the record type as the single output
    pub fn signature(&self) -> Signature {
        self.record_type
            .fields
            .iter()
            .fold(Signature::new(), |sig, field| {
                sig.with_parameter(field.name.clone(), field.annotation.clone())
            })
            .returning(AnnotationExpr::bare(self.record_type.name.as_str()))
    }

    /// The constructor as a registrable callable named `Record::new`
    pub fn as_callable(&self) -> Callable {
        self.record_type
            .callable(CallableKind::Constructor, "new", self.signature())
    }
}

/// Splits records back into positional field values
#[derive(Debug, Clone)]
pub struct RecordDecomposer {
    record_type: Arc<RecordType>,
}

/// Adapter taking one record and returning its field values in order.
///
/// # Errors
///
/// Returns [`Error::NotARecordType`] unless `definition` is a record type.
pub fn from_record_decomposer(definition: &Definition) -> Result<RecordDecomposer> {
    Ok(RecordDecomposer {
        record_type: require_record(definition)?,
    })
}

impl RecordDecomposer {
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn call(&self, record: &Record) -> Result<Vec<Value>> {
        if *record.record_type != *self.record_type {
            return Err(Error::argument_mismatch(
                &self.record_type.name,
                format!("got an instance of `{}`", record.record_type.name),
            ));
        }
        Ok(record.values.clone())
    }

    /// `input: Record` in, one tuple member per field out
    pub fn signature(&self) -> Signature {
        let members = self.record_type.fields.iter().map(|field| {
            field
                .annotation
                .clone()
                .unwrap_or_else(|| AnnotationExpr::bare("_"))
        });
        Signature::new()
            .with_parameter(
                "input",
                Some(AnnotationExpr::bare(self.record_type.name.as_str())),
            )
            .returning(AnnotationExpr::tuple(members))
    }

    /// The decomposer as a registrable callable named `Record::into_fields`
    pub fn as_callable(&self) -> Callable {
        self.record_type
            .callable(CallableKind::Decomposer, "into_fields", self.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::ItemKind;
    use serde_json::json;

    fn person() -> Definition {
        RecordType::new(
            "demo",
            "Person",
            [
                RecordField::new("name", Some(AnnotationExpr::bare("String"))),
                RecordField::new("age", Some(AnnotationExpr::bare("u32"))),
            ],
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_constructor_builds_record() {
        let ctor = to_record_constructor(&person()).unwrap();
        let record = ctor.call(vec![json!("Alice"), json!(30)]).unwrap();
        assert_eq!(record.get("name"), Some(&json!("Alice")));
        assert_eq!(record.to_json(), json!({"name": "Alice", "age": 30}));
        assert!(Arc::ptr_eq(record.record_type(), ctor.record_type()));
    }

    #[test]
    fn test_named_call_matches_positional() {
        let ctor = to_record_constructor(&person()).unwrap();
        let named = ctor
            .call_named(json!({"age": 30, "name": "Alice"}).as_object().cloned().unwrap())
            .unwrap();
        assert_eq!(named, ctor.call(vec![json!("Alice"), json!(30)]).unwrap());
    }

    #[test]
    fn test_constructor_arity_mismatch() {
        let ctor = to_record_constructor(&person()).unwrap();
        let err = ctor.call(vec![json!("Alice")]).unwrap_err();
        assert!(matches!(err, Error::ArgumentMismatch { .. }));
    }

    #[test]
    fn test_decomposer_returns_values_in_order() {
        let def = person();
        let record = to_record_constructor(&def)
            .unwrap()
            .call(vec![json!("Alice"), json!(30)])
            .unwrap();
        let values = from_record_decomposer(&def).unwrap().call(&record).unwrap();
        assert_eq!(values, vec![json!("Alice"), json!(30)]);
    }

    #[test]
    fn test_decomposer_rejects_other_record() {
        let other: Definition = RecordType::new("demo", "Pet", [RecordField::new("name", None)])
            .unwrap()
            .into();
        let pet = to_record_constructor(&other)
            .unwrap()
            .call(vec![json!("Rex")])
            .unwrap();
        let err = from_record_decomposer(&person()).unwrap().call(&pet).unwrap_err();
        assert!(matches!(err, Error::ArgumentMismatch { .. }));
    }

    #[test]
    fn test_non_record_is_rejected() {
        let def = Definition::Item {
            name: "Mode".into(),
            kind: ItemKind::Enum,
        };
        assert!(matches!(
            to_record_constructor(&def),
            Err(Error::NotARecordType(n)) if n == "Mode"
        ));
        assert!(matches!(from_record_decomposer(&def), Err(Error::NotARecordType(_))));
    }

    #[test]
    fn test_from_item_requires_named_fields() {
        let tuple: Item = syn::parse_str("struct Meters(f64);").unwrap();
        assert!(matches!(
            RecordType::from_item("demo", &tuple),
            Err(Error::NotARecordType(n)) if n == "Meters"
        ));
        let named: Item = syn::parse_str("/// A point.\nstruct Point { x: f64, y: f64 }").unwrap();
        let record = RecordType::from_item("demo", &named).unwrap();
        assert_eq!(record.fields().len(), 2);
        assert_eq!(record.docs(), "A point.");
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let result = RecordType::new(
            "demo",
            "Bad",
            [RecordField::new("a", None), RecordField::new("a", None)],
        );
        assert!(matches!(result, Err(Error::NotARecordType(_))));
    }

    #[test]
    fn test_adapter_signatures() {
        let def = person();
        let ctor = to_record_constructor(&def).unwrap().signature();
        let names: Vec<_> = ctor.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(ctor.return_annotation, Some(AnnotationExpr::bare("Person")));

        let decomp = from_record_decomposer(&def).unwrap().signature();
        assert_eq!(decomp.parameters[0].name, "input");
        assert_eq!(
            decomp.return_annotation,
            Some(AnnotationExpr::tuple([
                AnnotationExpr::bare("String"),
                AnnotationExpr::bare("u32"),
            ]))
        );
    }
}
