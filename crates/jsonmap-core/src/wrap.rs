//! Serde adapters
//!
//! [`Wrap`] and [`Mapped`] route a record through a fresh [`Mapper`] when
//! serde reaches it, so mapped records can sit inside ordinary
//! `#[derive(Serialize, Deserialize)]` types or go straight to
//! `serde_json::to_writer`. Each call gets its own cache.

use crate::mapper::Mapper;
use crate::record::{Destination, Root};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

/// Borrowing serialize adapter
#[derive(Debug, Clone, Copy)]
pub struct Wrap<'a, T: ?Sized>(pub &'a T);

impl<T: Root + ?Sized> Serialize for Wrap<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_with_fresh_mapper(self.0, serializer)
    }
}

/// Owning adapter for fields of serde-derived types
///
/// Serializes like [`Wrap`]. Deserializing reads a JSON value and decodes it
/// into `T::default()`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mapped<T>(pub T);

impl<T> Mapped<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Mapped<T> {
    fn from(value: T) -> Self {
        Mapped(value)
    }
}

impl<T> Deref for Mapped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Mapped<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Root> Serialize for Mapped<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_with_fresh_mapper(&self.0, serializer)
    }
}

impl<'de, T: Destination + Default> Deserialize<'de> for Mapped<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Value::deserialize(deserializer)?;
        let mut inner = T::default();
        Mapper::new()
            .decode_value(&wire, &mut inner)
            .map_err(serde::de::Error::custom)?;
        Ok(Mapped(inner))
    }
}

fn encode_with_fresh_mapper<T: Root + ?Sized, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    let wire = Mapper::new()
        .encode_value(value)
        .map_err(serde::ser::Error::custom)?;
    wire.serialize(serializer)
}
