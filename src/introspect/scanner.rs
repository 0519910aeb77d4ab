use super::callable::{Callable, CallableKind};
use super::docs::docstring;
use crate::core::parsing::{reset_span_locations, source_text, span_bounds};
use crate::errors::{Error, Result, ResultExt};
use crate::record::RecordType;
use crate::signature::Signature;
use quote::ToTokens;
use std::path::{Component, Path};
use std::sync::Arc;
use syn::{Attribute, ForeignItem, ImplItem, Item, Meta, TraitItem, Type};
use tracing::{debug, debug_span};

/// Kind of a non-callable item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    TupleStruct,
    UnitStruct,
    Enum,
    Union,
    Const,
    Static,
    Trait,
    TypeAlias,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TupleStruct => "tuple struct",
            Self::UnitStruct => "unit struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Const => "const",
            Self::Static => "static",
            Self::Trait => "trait",
            Self::TypeAlias => "type alias",
        }
    }
}

/// An item discovered in a source file
#[derive(Debug, Clone)]
pub enum Definition {
    Callable(Arc<Callable>),
    Record(Arc<RecordType>),
    Item { name: String, kind: ItemKind },
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Self::Callable(callable) => callable.name(),
            Self::Record(record) => record.name(),
            Self::Item { name, .. } => name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Callable(_) => "function",
            Self::Record(_) => "struct",
            Self::Item { kind, .. } => kind.as_str(),
        }
    }

    pub fn as_callable(&self) -> Option<&Arc<Callable>> {
        match self {
            Self::Callable(callable) => Some(callable),
            _ => None,
        }
    }
}

impl From<Callable> for Definition {
    fn from(callable: Callable) -> Self {
        Self::Callable(Arc::new(callable))
    }
}

impl From<RecordType> for Definition {
    fn from(record: RecordType) -> Self {
        Self::Record(Arc::new(record))
    }
}

/// Derive the module path of a file from its path relative to the crate.
///
/// `src/lib.rs` and `src/main.rs` are the crate root, `mod.rs` names its
/// directory, any other file names itself.
pub fn module_path_for(root: &str, relative: &Path) -> String {
    let mut segments = vec![root.replace('-', "_")];
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let parts = match parts.first().map(String::as_str) {
        Some("src") => &parts[1..],
        _ => &parts[..],
    };

    for (i, part) in parts.iter().enumerate() {
        let is_file = i + 1 == parts.len();
        if !is_file {
            segments.push(part.clone());
            continue;
        }
        let stem = part.strip_suffix(".rs").unwrap_or(part);
        let is_root = i == 0 && (stem == "lib" || stem == "main");
        if !is_root && stem != "mod" {
            segments.push(stem.to_string());
        }
    }
    segments.join("::")
}

/// Walks a parsed file and reports every item as a [`Definition`]
#[derive(Debug, Clone)]
pub struct SourceScanner {
    module_root: String,
    version: Option<String>,
}

impl SourceScanner {
    pub fn new(module_root: impl Into<String>) -> Self {
        Self {
            module_root: module_root.into(),
            version: None,
        }
    }

    /// Version recorded in the origin of every callable found
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Scan a file whose path is relative to the crate directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the content is not valid Rust, or a
    /// schema error if a side channel cannot be lowered.
    pub fn scan(&self, relative: &Path, content: &str) -> Result<Vec<Definition>> {
        let module_path = module_path_for(&self.module_root, relative);
        self.scan_module(&module_path, relative, content)
    }

    /// Scan a file with an explicit module path
    pub fn scan_module(
        &self,
        module_path: &str,
        file: &Path,
        content: &str,
    ) -> Result<Vec<Definition>> {
        let _span = debug_span!("scan_file", path = %file.display()).entered();

        let ast = syn::parse_file(content).map_err(|e| {
            let start = e.span().start();
            Error::parse(file, start.line, start.column, e.to_string())
        })?;

        let walker = ItemWalker {
            content,
            version: self.version.as_deref(),
        };
        let mut definitions = Vec::new();
        let result = walker.walk(&ast.items, module_path, &mut definitions);

        // Spans are no longer needed once source text has been sliced out
        reset_span_locations();
        result?;

        debug!(
            path = %file.display(),
            definitions = definitions.len(),
            "Scanned file"
        );
        Ok(definitions)
    }
}

struct ItemWalker<'a> {
    content: &'a str,
    version: Option<&'a str>,
}

impl ItemWalker<'_> {
    fn walk(&self, items: &[Item], module_path: &str, out: &mut Vec<Definition>) -> Result<()> {
        for item in items {
            match item {
                Item::Fn(item_fn) => {
                    let callable = self
                        .callable(
                            CallableKind::Function,
                            module_path,
                            &item_fn.sig,
                            &item_fn.attrs,
                            item.to_token_stream(),
                            None,
                        )
                        .context(format!("in `{}`", item_fn.sig.ident))?;
                    out.push(callable.into());
                }
                Item::Impl(item_impl) => {
                    let owner = owner_name(&item_impl.self_ty);
                    for impl_item in &item_impl.items {
                        if let ImplItem::Fn(method) = impl_item {
                            let callable = self
                                .callable(
                                    CallableKind::Method,
                                    module_path,
                                    &method.sig,
                                    &method.attrs,
                                    method.to_token_stream(),
                                    Some(&owner),
                                )
                                .context(format!("in `{owner}::{}`", method.sig.ident))?;
                            out.push(callable.into());
                        }
                    }
                }
                Item::Trait(item_trait) => {
                    let owner = item_trait.ident.to_string();
                    for trait_item in &item_trait.items {
                        if let TraitItem::Fn(method) = trait_item {
                            // Required methods have no body to describe
                            if method.default.is_none() {
                                continue;
                            }
                            let callable = self
                                .callable(
                                    CallableKind::Method,
                                    module_path,
                                    &method.sig,
                                    &method.attrs,
                                    method.to_token_stream(),
                                    Some(&owner),
                                )
                                .context(format!("in `{owner}::{}`", method.sig.ident))?;
                            out.push(callable.into());
                        }
                    }
                    out.push(non_callable(&item_trait.ident, ItemKind::Trait));
                }
                Item::ForeignMod(foreign) => {
                    for foreign_item in &foreign.items {
                        if let ForeignItem::Fn(func) = foreign_item {
                            let signature = Signature::from_syn(&func.sig)
                                .context(format!("in `{}`", func.sig.ident))?;
                            let name = func.sig.ident.to_string();
                            let callable =
                                Callable::new(CallableKind::Foreign, module_path, name.clone())
                                    .with_qualname(name)
                                    .with_signature(signature)
                                    .with_docs(docstring(&func.attrs))
                                    .with_version(self.version.map(str::to_string));
                            out.push(callable.into());
                        }
                    }
                }
                Item::Struct(item_struct) => match &item_struct.fields {
                    syn::Fields::Named(_) => {
                        let mut record = RecordType::from_item(module_path, item)?;
                        if let Some(source) = self.source_of(item.to_token_stream()) {
                            record = record.with_source(source);
                        }
                        out.push(record.into());
                    }
                    syn::Fields::Unnamed(_) => {
                        out.push(non_callable(&item_struct.ident, ItemKind::TupleStruct))
                    }
                    syn::Fields::Unit => {
                        out.push(non_callable(&item_struct.ident, ItemKind::UnitStruct))
                    }
                },
                Item::Enum(item) => out.push(non_callable(&item.ident, ItemKind::Enum)),
                Item::Union(item) => out.push(non_callable(&item.ident, ItemKind::Union)),
                Item::Const(item) => out.push(non_callable(&item.ident, ItemKind::Const)),
                Item::Static(item) => out.push(non_callable(&item.ident, ItemKind::Static)),
                Item::Type(item) => out.push(non_callable(&item.ident, ItemKind::TypeAlias)),
                Item::Mod(item_mod) => {
                    if is_test_module(&item_mod.attrs) {
                        continue;
                    }
                    if let Some((_, items)) = &item_mod.content {
                        let nested = format!("{module_path}::{}", item_mod.ident);
                        self.walk(items, &nested, out)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn callable(
        &self,
        kind: CallableKind,
        module_path: &str,
        sig: &syn::Signature,
        attrs: &[Attribute],
        tokens: proc_macro2::TokenStream,
        owner: Option<&str>,
    ) -> Result<Callable> {
        let name = sig.ident.to_string();
        let qualname = match owner {
            Some(owner) => format!("{owner}::{name}"),
            None => name.clone(),
        };

        let mut callable = Callable::new(kind, module_path, name)
            .with_qualname(qualname)
            .with_signature(Signature::from_syn(sig)?)
            .with_docs(docstring(attrs))
            .with_version(self.version.map(str::to_string));
        if let Some(owner) = owner {
            callable = callable.with_owner(owner);
        }
        if let Some(source) = self.source_of(tokens) {
            callable = callable.with_source(source);
        }
        Ok(callable)
    }

    fn source_of(&self, tokens: proc_macro2::TokenStream) -> Option<String> {
        let (start, end) = span_bounds(tokens)?;
        source_text(self.content, start, end)
    }
}

fn non_callable(ident: &syn::Ident, kind: ItemKind) -> Definition {
    Definition::Item {
        name: ident.to_string(),
        kind,
    }
}

/// Name of an impl's self type without generic arguments
fn owner_name(self_ty: &Type) -> String {
    match self_ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default(),
        other => crate::core::TypeRef::from_syn(other).to_string(),
    }
}

/// Whether the attributes include exactly `#[cfg(test)]`
fn is_test_module(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && matches!(attr.parse_args::<Meta>(), Ok(Meta::Path(path)) if path.is_ident("test"))
    })
}
