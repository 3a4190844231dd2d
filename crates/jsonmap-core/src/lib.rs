//! Jsonmap Core - Field-level JSON transcoding with value substitution tables
//!
//! This crate sits between `serde_json` and application record types and lets
//! a field's wire representation differ from its native one. Each field of a
//! record follows one of three strategies:
//!
//! - **Direct**: the value passes through with ordinary (range-checked) coercion
//! - **Nested**: the value is itself a record, transcoded recursively
//! - **Enumerated**: the value is substituted through a `code:label;...` table
//!
//! Parsed tables are cached per field per record type inside a [`Mapper`].
//!
//! # Example
//!
//! ```
//! use jsonmap_core::{Mapper, Record, Result};
//!
//! #[derive(Debug, Default, PartialEq, Record)]
//! struct Animal {
//!     name: String,
//!     #[jsonmap(rename = "type", map = "0:dog;1:cat;2:cow;3:others")]
//!     kind: u8,
//! }
//!
//! fn example() -> Result<()> {
//!     let mut mapper = Mapper::new();
//!     let cow = Animal { name: "Daisy".into(), kind: 2 };
//!
//!     let bytes = mapper.encode(&cow)?;
//!     assert_eq!(bytes, br#"{"name":"Daisy","type":"cow"}"#);
//!
//!     let mut back = Animal::default();
//!     mapper.decode(&bytes, &mut back)?;
//!     assert_eq!(back, cow);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

extern crate self as jsonmap_core;

pub mod cache;
pub mod coerce;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod mapper;
pub mod record;
pub mod scalar;
pub mod shared;
pub mod strategy;
pub mod table;
pub mod transcode;
pub mod wrap;

// Re-export main types for convenience
pub use cache::CacheStats;
pub use config::{DecodeMode, DuplicateLabelPolicy, MapperConfig};
pub use descriptor::{FieldDescriptor, RecordDescriptor, TypeKey};
pub use error::{Error, ErrorKind, Result};
pub use mapper::Mapper;
pub use record::{Destination, DestinationSlot, Nested, Record, Root, RootShape};
pub use scalar::Scalar;
pub use shared::SharedMapper;
pub use strategy::{Strategy, StrategyKind};
pub use table::{Substitution, SubstitutionTable};
pub use wrap::{Mapped, Wrap};

#[cfg(feature = "derive")]
pub use jsonmap_derive::Record;

// Used by generated code
pub use serde_json;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Encode with a fresh [`Mapper`]
pub fn encode<T: Root + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Mapper::new().encode(value)
}

/// Indented encode with a fresh [`Mapper`]
pub fn encode_indent<T: Root + ?Sized>(value: &T, prefix: &str, indent: &str) -> Result<Vec<u8>> {
    Mapper::new().encode_indent(value, prefix, indent)
}

/// Decode with a fresh [`Mapper`]
pub fn decode<D: Destination + ?Sized>(bytes: &[u8], destination: &mut D) -> Result<()> {
    Mapper::new().decode(bytes, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::Switch;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_free_functions_forward() {
        let hall = Switch {
            label: "hall".to_string(),
            state: 1,
        };

        let bytes = encode(&hall).unwrap();
        assert_eq!(bytes, br#"{"label":"hall","state":"on"}"#.to_vec());

        let mut back = Switch::default();
        decode(&bytes, &mut back).unwrap();
        assert_eq!(back, hall);

        let pretty = encode_indent(&hall, "", "  ").unwrap();
        assert_eq!(
            String::from_utf8(pretty).unwrap(),
            "{\n  \"label\": \"hall\",\n  \"state\": \"on\"\n}"
        );
    }
}
