//! Transcoding cache
//!
//! Per-session memo of resolved field strategies keyed by record type and
//! field position. Entries are only ever added; a cache lives exactly as long
//! as the [`Mapper`](crate::Mapper) that owns it.
//!
//! Copyright (c) 2025 Jsonmap Team
//! Licensed under the Apache-2.0 license

use crate::descriptor::TypeKey;
use crate::strategy::Strategy;
use serde::Serialize;
use std::collections::HashMap;

/// Counters describing cache use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Record types with at least one resolved field
    pub record_types: usize,
    /// Resolved fields across all record types
    pub fields: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to resolve the field
    pub misses: u64,
    /// Substitution specs handed to the parser, failed parses included
    pub tables_parsed: u64,
}

/// Resolved strategies by record type and field position
#[derive(Debug, Default)]
pub struct TranscodingCache {
    entries: HashMap<TypeKey, HashMap<usize, Strategy>>,
    hits: u64,
    misses: u64,
    tables_parsed: u64,
}

impl TranscodingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached strategy, counting the lookup as a hit or a miss
    pub fn get(&mut self, key: TypeKey, position: usize) -> Option<Strategy> {
        let found = self
            .entries
            .get(&key)
            .and_then(|fields| fields.get(&position))
            .cloned();

        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Store a resolved strategy
    pub fn insert(&mut self, key: TypeKey, position: usize, strategy: Strategy) {
        self.entries.entry(key).or_default().insert(position, strategy);
    }

    /// Count one substitution spec parse, successful or not
    pub fn record_parse(&mut self) {
        self.tables_parsed += 1;
    }

    /// Whether a strategy is cached for the field
    pub fn contains(&self, key: TypeKey, position: usize) -> bool {
        self.entries
            .get(&key)
            .map_or(false, |fields| fields.contains_key(&position))
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            record_types: self.entries.len(),
            fields: self.entries.values().map(HashMap::len).sum(),
            hits: self.hits,
            misses: self.misses,
            tables_parsed: self.tables_parsed,
        }
    }
}
