//! Top-level dispatcher
//!
//! Routes the root value by shape: a record to the struct transcoder, a
//! sequence to the collection transcoder. Any other Rust type is rejected at
//! compile time by the [`Root`] and [`Destination`] bounds; at run time only
//! an absent root (`None`) is left to reject.

use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::record::{Destination, DestinationSlot, Record, Root, RootShape};
use serde_json::Value;

impl Mapper {
    /// Encode a record or a sequence of records into a JSON tree
    pub fn encode_value<T: Root + ?Sized>(&mut self, value: &T) -> Result<Value> {
        let record = <T::Record as Record>::descriptor().name();
        match value.shape() {
            RootShape::Record(inner) => {
                tracing::trace!(record = %record, shape = "record", "dispatching encode");
                self.encode_record(inner).map(Value::Object)
            }
            RootShape::Sequence(items) => {
                tracing::trace!(record = %record, shape = "sequence", len = items.len(), "dispatching encode");
                self.encode_sequence(items).map(Value::Array)
            }
            RootShape::Nil => Err(Error::unsupported_shape(
                "nil",
                format!("an absent `{}` has nothing to encode", record),
            )),
        }
    }

    /// Decode a JSON tree into a record or a sequence of records
    pub fn decode_value<D: Destination + ?Sized>(&mut self, wire: &Value, destination: &mut D) -> Result<()> {
        let record = <D::Record as Record>::descriptor().name();
        match destination.slot() {
            DestinationSlot::Record(inner) => {
                tracing::trace!(record = %record, shape = "record", "dispatching decode");
                self.decode_record_into(wire, inner)
            }
            DestinationSlot::Optional(slot) => {
                tracing::trace!(record = %record, shape = "optional", "dispatching decode");
                if let Some(inner) = slot.as_mut() {
                    return self.decode_record_into(wire, inner);
                }
                *slot = Some(self.decode_record(wire)?);
                Ok(())
            }
            DestinationSlot::Sequence(items) => {
                tracing::trace!(record = %record, shape = "sequence", "dispatching decode");
                self.decode_sequence_into(wire, items)
            }
        }
    }
}
