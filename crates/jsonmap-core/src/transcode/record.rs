//! Struct transcoder
//!
//! Encoding walks the descriptor in declaration order and emits one object
//! entry per field under its wire name; `serde_json` is built with
//! `preserve_order`, so that order reaches the output bytes.
//!
//! Decoding skips fields absent from the wire object and leaves them
//! untouched. Under [`DecodeMode::AllOrNothing`] the fields are decoded into a
//! staging record and swapped into the destination only once every present
//! field has decoded (a `null` field is then reapplied to the destination
//! itself); under [`DecodeMode::LeavePartial`] they are assigned in
//! place and earlier assignments survive a later failure.

use super::describe;
use crate::config::DecodeMode;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::record::Record;
use serde_json::{Map, Value};

impl Mapper {
    /// Encode one record as a JSON object
    pub fn encode_record<R: Record>(&mut self, record: &R) -> Result<Map<String, Value>> {
        let descriptor = R::descriptor();
        let mut object = Map::with_capacity(descriptor.fields().len());

        for field in descriptor.fields() {
            let wire = record.encode_field(self, field)?;
            object.insert(field.wire_name().to_string(), wire);
        }

        Ok(object)
    }

    /// Decode a fresh record from a JSON object
    pub fn decode_record<R: Record>(&mut self, wire: &Value) -> Result<R> {
        let mut record = R::default();
        self.decode_object(expect_object::<R>(wire)?, &mut record)?;
        Ok(record)
    }

    /// Decode a JSON object into an existing record
    ///
    /// Fields missing from the object keep their current values.
    pub fn decode_record_into<R: Record>(&mut self, wire: &Value, record: &mut R) -> Result<()> {
        let object = expect_object::<R>(wire)?;

        match self.config.decode_mode {
            DecodeMode::LeavePartial => self.decode_object(object, record),
            DecodeMode::AllOrNothing => {
                let mut staging = R::default();
                if let Err(err) = self.decode_object(object, &mut staging) {
                    tracing::debug!(
                        record = R::descriptor().name(),
                        error = %err,
                        "discarding partially decoded record"
                    );
                    return Err(err);
                }

                // Nulls are replayed in place: some of them keep the current value
                for field in R::descriptor().fields() {
                    match object.get(field.wire_name()) {
                        Some(Value::Null) => record.decode_field(self, field, &Value::Null)?,
                        Some(_) => record.swap_field(&mut staging, field)?,
                        None => {}
                    }
                }
                Ok(())
            }
        }
    }

    /// Assign every field present in `object`, in declaration order
    pub(crate) fn decode_object<R: Record>(&mut self, object: &Map<String, Value>, record: &mut R) -> Result<()> {
        for field in R::descriptor().fields() {
            if let Some(wire) = object.get(field.wire_name()) {
                record.decode_field(self, field, wire)?;
            }
        }
        Ok(())
    }
}

fn expect_object<R: Record>(wire: &Value) -> Result<&Map<String, Value>> {
    match wire {
        Value::Object(object) => Ok(object),
        other => Err(Error::Decode {
            field: R::descriptor().name().to_string(),
            label: None,
            message: format!("expected a JSON object, found {}", describe(other)),
        }),
    }
}
