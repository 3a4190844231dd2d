//! Collection transcoder

use super::describe;
use crate::config::DecodeMode;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::record::Record;
use serde_json::Value;

impl Mapper {
    /// Encode records as a JSON array in sequence order
    ///
    /// Stops at the first element that fails, reporting its index.
    pub fn encode_sequence<R: Record>(&mut self, records: &[R]) -> Result<Vec<Value>> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                self.encode_record(record)
                    .map(Value::Object)
                    .map_err(|e| Error::element(index, e))
            })
            .collect()
    }

    /// Decode a JSON array, appending one record per element
    ///
    /// `null` appends nothing. A failing element aborts the decode with its
    /// index; whether earlier elements stay appended follows the decode mode.
    pub fn decode_sequence_into<R: Record>(&mut self, wire: &Value, records: &mut Vec<R>) -> Result<()> {
        let items = match wire {
            Value::Null => return Ok(()),
            Value::Array(items) => items,
            other => {
                return Err(Error::Decode {
                    field: R::descriptor().name().to_string(),
                    label: None,
                    message: format!("expected a JSON array, found {}", describe(other)),
                })
            }
        };

        match self.config.decode_mode {
            DecodeMode::LeavePartial => {
                records.reserve(items.len());
                for (index, item) in items.iter().enumerate() {
                    let record = self.decode_record(item).map_err(|e| Error::element(index, e))?;
                    records.push(record);
                }
            }
            DecodeMode::AllOrNothing => {
                let decoded = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.decode_record(item).map_err(|e| Error::element(index, e)))
                    .collect::<Result<Vec<R>>>()
                    .map_err(|err| {
                        tracing::debug!(
                            record = R::descriptor().name(),
                            error = %err,
                            "discarding partially decoded sequence"
                        );
                        err
                    })?;
                records.extend(decoded);
            }
        }

        Ok(())
    }
}
