//! Mapper shared across threads
//!
//! [`SharedMapper`] guards one [`Mapper`] with a mutex so pooled workers fill
//! a single cache. Each operation holds the lock for its whole duration.

use crate::cache::CacheStats;
use crate::config::MapperConfig;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::record::{Destination, Root};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Cloneable handle to a mutex-guarded [`Mapper`]
#[derive(Debug, Clone, Default)]
pub struct SharedMapper {
    inner: Arc<Mutex<Mapper>>,
}

impl SharedMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Mapper::with_config(config).into()
    }

    /// Run `f` with exclusive access to the mapper
    pub fn with<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Mapper) -> Result<T>,
    {
        let mut mapper = self
            .inner
            .lock()
            .map_err(|_| Error::internal("shared mapper lock poisoned"))?;
        f(&mut mapper)
    }

    pub fn encode<T: Root + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        self.with(|mapper| mapper.encode(value))
    }

    pub fn encode_indent<T: Root + ?Sized>(&self, value: &T, prefix: &str, indent: &str) -> Result<Vec<u8>> {
        self.with(|mapper| mapper.encode_indent(value, prefix, indent))
    }

    pub fn decode<D: Destination + ?Sized>(&self, bytes: &[u8], destination: &mut D) -> Result<()> {
        self.with(|mapper| mapper.decode(bytes, destination))
    }

    pub fn encode_value<T: Root + ?Sized>(&self, value: &T) -> Result<Value> {
        self.with(|mapper| mapper.encode_value(value))
    }

    pub fn decode_value<D: Destination + ?Sized>(&self, wire: &Value, destination: &mut D) -> Result<()> {
        self.with(|mapper| mapper.decode_value(wire, destination))
    }

    pub fn stats(&self) -> Result<CacheStats> {
        self.with(|mapper| Ok(mapper.stats()))
    }
}

impl From<Mapper> for SharedMapper {
    fn from(mapper: Mapper) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mapper)),
        }
    }
}
