//! `#[jsonmap(...)]` field attribute parsing

use syn::ext::IdentExt;
use syn::{Attribute, Field, LitStr};

/// How a field is transcoded, as declared by its attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Direct,
    Nested,
    Enumerated(String),
}

/// A participating field after attribute parsing
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub ident: syn::Ident,
    pub wire_name: String,
    pub kind: FieldKind,
}

#[derive(Default)]
struct FieldArgs {
    rename: Option<LitStr>,
    map: Option<LitStr>,
    nested: bool,
    skip: bool,
}

/// Parse a named field; `Ok(None)` for `#[jsonmap(skip)]`
pub fn parse_field(field: &Field) -> syn::Result<Option<FieldSpec>> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "Field must have a name"));
    };

    let mut args = FieldArgs::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("jsonmap")) {
        parse_jsonmap_attribute(attr, &mut args)?;
    }

    if args.skip {
        if args.rename.is_some() || args.map.is_some() || args.nested {
            return Err(syn::Error::new_spanned(
                field,
                "#[jsonmap(skip)] cannot be combined with other jsonmap options",
            ));
        }
        return Ok(None);
    }

    let kind = match (&args.map, args.nested) {
        (Some(spec), true) if !spec.value().is_empty() => {
            return Err(syn::Error::new_spanned(
                spec,
                "#[jsonmap(nested)] cannot be combined with a non-empty map",
            ))
        }
        (_, true) => FieldKind::Nested,
        (Some(spec), false) if spec.value().is_empty() => FieldKind::Nested,
        (Some(spec), false) => FieldKind::Enumerated(spec.value()),
        (None, false) => FieldKind::Direct,
    };

    let wire_name = match &args.rename {
        Some(name) if name.value().is_empty() => {
            return Err(syn::Error::new_spanned(name, "wire name must not be empty"))
        }
        Some(name) => name.value(),
        None => ident.unraw().to_string(),
    };

    Ok(Some(FieldSpec {
        ident,
        wire_name,
        kind,
    }))
}

fn parse_jsonmap_attribute(attr: &Attribute, args: &mut FieldArgs) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("rename") {
            args.rename = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("map") {
            args.map = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("nested") {
            args.nested = true;
            Ok(())
        } else if meta.path.is_ident("skip") {
            args.skip = true;
            Ok(())
        } else {
            Err(meta.error("unknown jsonmap option, expected `rename`, `map`, `nested` or `skip`"))
        }
    })
}
