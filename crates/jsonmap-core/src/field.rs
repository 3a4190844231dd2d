//! Per-field strategy execution
//!
//! `Record` impls call one encode and one decode helper per field, picked by
//! the field's annotation. Each helper resolves the field through the mapper
//! first, so the parsed table comes from the cache and a `Record` impl that
//! disagrees with its own descriptor fails with `StrategyMismatch`.
//!
//! Copyright (c) 2025 Jsonmap Team
//! Licensed under the Apache-2.0 license

use crate::coerce::{self, CoerceError};
use crate::descriptor::FieldDescriptor;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::record::Nested;
use crate::scalar::{label_text, Scalar};
use crate::strategy::{Strategy, StrategyKind};
use crate::table::SubstitutionTable;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Serialize a direct field verbatim
pub fn encode_direct<T: Serialize + ?Sized>(
    mapper: &mut Mapper,
    field: &FieldDescriptor,
    value: &T,
) -> Result<Value> {
    mapper.resolve(field)?.expect(StrategyKind::Direct, field)?;
    to_wire::<T>(field, value)
}

/// Coerce a wire value into a direct field
///
/// `null` clears fields that can hold it (`Option`, `Value`) and leaves any
/// other field untouched.
pub fn decode_direct<T: DeserializeOwned>(
    mapper: &mut Mapper,
    field: &FieldDescriptor,
    wire: &Value,
    slot: &mut T,
) -> Result<()> {
    mapper.resolve(field)?.expect(StrategyKind::Direct, field)?;
    if wire.is_null() {
        if let Ok(cleared) = coerce::from_value::<T>(wire) {
            *slot = cleared;
        }
        return Ok(());
    }
    *slot = coerce::from_value(wire).map_err(|e| coercion_error(field, e))?;
    Ok(())
}

/// Replace a field's native code with its wire label
pub fn encode_enumerated<T: Serialize + ?Sized>(
    mapper: &mut Mapper,
    field: &FieldDescriptor,
    value: &T,
) -> Result<Value> {
    let table = enumerated_table(mapper, field)?;
    let native = to_wire::<T>(field, value)?;

    let code = Scalar::from_value(&native).ok_or_else(|| Error::unmapped_code(field, &native))?;
    table
        .label_for(&code)
        .map(|label| Value::String(label.to_string()))
        .ok_or_else(|| Error::unmapped_code(field, &code))
}

/// Replace a wire label with its native code
///
/// The code is converted from its parsed scalar form first and, failing
/// that, from its raw text as a string, so a `String` field may use codes
/// that happen to look like numbers.
pub fn decode_enumerated<T: DeserializeOwned>(
    mapper: &mut Mapper,
    field: &FieldDescriptor,
    wire: &Value,
    slot: &mut T,
) -> Result<()> {
    let table = enumerated_table(mapper, field)?;
    let label = label_text(wire);
    let entry = table
        .code_for(&label)
        .ok_or_else(|| Error::unmapped_label(field, &label))?;

    let native = match coerce::from_value::<T>(&entry.code.to_value()) {
        Ok(native) => native,
        Err(first) => coerce::from_value::<T>(&Value::String(entry.raw_code.clone()))
            .map_err(|_| coercion_error(field, first))?,
    };
    *slot = native;
    Ok(())
}

/// Encode a nested record through the same mapper
pub fn encode_nested<N: Nested>(mapper: &mut Mapper, field: &FieldDescriptor, value: &N) -> Result<Value> {
    mapper.resolve(field)?.expect(StrategyKind::Nested, field)?;
    value.encode_nested(mapper)
}

/// Decode a nested record and assign it to the field
///
/// `null` empties optional and sequence fields; a bare record keeps its
/// current value.
pub fn decode_nested<N: Nested>(
    mapper: &mut Mapper,
    field: &FieldDescriptor,
    wire: &Value,
    slot: &mut N,
) -> Result<()> {
    mapper.resolve(field)?.expect(StrategyKind::Nested, field)?;
    if wire.is_null() {
        if let Some(cleared) = N::from_null() {
            *slot = cleared;
        }
        return Ok(());
    }
    *slot = N::decode_nested(mapper, field, wire)?;
    Ok(())
}

fn enumerated_table(mapper: &mut Mapper, field: &FieldDescriptor) -> Result<Arc<SubstitutionTable>> {
    match mapper.resolve(field)? {
        Strategy::Enumerated(table) => Ok(table),
        other => {
            other.expect(StrategyKind::Enumerated, field)?;
            Err(Error::internal("enumerated strategy without a table"))
        }
    }
}

fn to_wire<T: Serialize + ?Sized>(field: &FieldDescriptor, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Encode {
        field: field.qualified_name(),
        value: std::any::type_name::<T>().to_string(),
        message: format!("cannot be serialized: {}", e),
    })
}

fn coercion_error(field: &FieldDescriptor, err: CoerceError) -> Error {
    match err {
        CoerceError::Narrowing { value, target } => Error::Coercion {
            field: field.qualified_name(),
            value,
            target: target.to_string(),
        },
        CoerceError::Invalid(message) => Error::decode(field, message),
    }
}
