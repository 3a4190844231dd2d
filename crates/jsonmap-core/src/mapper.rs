//! Transcoding session
//!
//! A [`Mapper`] owns one [`TranscodingCache`] and the [`MapperConfig`] it was
//! built with. Every operation takes `&mut self`, so a mapper is used by one
//! thread at a time; share one across threads through
//! [`SharedMapper`](crate::SharedMapper).
//!
//! Copyright (c) 2025 Jsonmap Team
//! Licensed under the Apache-2.0 license

use crate::cache::{CacheStats, TranscodingCache};
use crate::config::MapperConfig;
use crate::error::{Error, Result};
use crate::record::{Destination, Root};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// One unit of ownership over a transcoding cache
#[derive(Debug, Default)]
pub struct Mapper {
    pub(crate) config: MapperConfig,
    pub(crate) cache: TranscodingCache,
}

impl Mapper {
    /// Create a mapper with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper with an explicit configuration
    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            config,
            cache: TranscodingCache::new(),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Cache counters, including how many substitution specs were parsed
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Encode a record or a sequence of records as compact JSON
    pub fn encode<T: Root + ?Sized>(&mut self, value: &T) -> Result<Vec<u8>> {
        let tree = self.encode_value(value)?;
        serde_json::to_vec(&tree).map_err(|e| Error::internal(format!("failed to write JSON: {}", e)))
    }

    /// Encode as indented JSON
    ///
    /// Every line after the first starts with `prefix`, followed by one copy
    /// of `indent` per level of nesting.
    pub fn encode_indent<T: Root + ?Sized>(
        &mut self,
        value: &T,
        prefix: &str,
        indent: &str,
    ) -> Result<Vec<u8>> {
        let tree = self.encode_value(value)?;

        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        tree.serialize(&mut serializer)
            .map_err(|e| Error::internal(format!("failed to write JSON: {}", e)))?;

        Ok(apply_prefix(out, prefix.as_bytes()))
    }

    /// Decode JSON bytes into a record or a sequence of records
    pub fn decode<D: Destination + ?Sized>(&mut self, bytes: &[u8], destination: &mut D) -> Result<()> {
        let wire: Value = serde_json::from_slice(bytes)?;
        self.decode_value(&wire, destination)
    }
}

/// Insert `prefix` after every line break of pretty-printed JSON
///
/// String contents never hold a raw newline once escaped, so every `\n` in
/// the output is a line break of the layout.
fn apply_prefix(pretty: Vec<u8>, prefix: &[u8]) -> Vec<u8> {
    if prefix.is_empty() {
        return pretty;
    }

    let lines = pretty.iter().filter(|&&b| b == b'\n').count();
    let mut out = Vec::with_capacity(pretty.len() + lines * prefix.len());
    for byte in pretty {
        out.push(byte);
        if byte == b'\n' {
            out.extend_from_slice(prefix);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeMode;

    #[test]
    fn test_new_mapper_is_empty() {
        let mapper = Mapper::new();
        assert_eq!(mapper.stats(), CacheStats::default());
        assert_eq!(mapper.config(), &MapperConfig::default());
    }

    #[test]
    fn test_with_config() {
        let config = MapperConfig::default().with_decode_mode(DecodeMode::LeavePartial);
        let mapper = Mapper::with_config(config);
        assert_eq!(mapper.config().decode_mode, DecodeMode::LeavePartial);
    }

    #[test]
    fn test_apply_prefix() {
        let pretty = b"{\n  \"a\": 1\n}".to_vec();
        assert_eq!(apply_prefix(pretty.clone(), b""), pretty);
        assert_eq!(
            String::from_utf8(apply_prefix(pretty, b">>")).unwrap(),
            "{\n>>  \"a\": 1\n>>}"
        );
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let mut mapper = Mapper::new();
        let mut out: Vec<crate::record::tests::Switch> = Vec::new();
        let err = mapper.decode(b"[{", &mut out).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
