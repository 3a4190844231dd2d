//! Field strategy resolver
//!
//! Classifies a field by its substitution annotation, in this order:
//!
//! 1. no annotation: [`Strategy::Direct`], the value passes through
//! 2. annotation with an empty spec: [`Strategy::Nested`], the value is a
//!    record transcoded recursively with the same mapper
//! 3. annotation with a non-empty spec: [`Strategy::Enumerated`], the value is
//!    substituted through the parsed table
//!
//! Resolution consults the mapper's cache first, so a spec is parsed at most
//! once per field per mapper.
//!
//! Copyright (c) 2025 Jsonmap Team
//! Licensed under the Apache-2.0 license

use crate::descriptor::FieldDescriptor;
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::table::SubstitutionTable;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Strategy class of a field, without its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Direct,
    Nested,
    Enumerated,
}

/// Resolved encode/decode strategy of one field
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Pass the value through with ordinary serde conversion
    Direct,
    /// Transcode the value as a nested record
    Nested,
    /// Substitute the value through a table
    Enumerated(Arc<SubstitutionTable>),
}

impl StrategyKind {
    /// Classify a substitution annotation
    pub fn classify(substitution: Option<&str>) -> Self {
        match substitution {
            None => StrategyKind::Direct,
            Some("") => StrategyKind::Nested,
            Some(_) => StrategyKind::Enumerated,
        }
    }
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Direct => StrategyKind::Direct,
            Strategy::Nested => StrategyKind::Nested,
            Strategy::Enumerated(_) => StrategyKind::Enumerated,
        }
    }

    /// Table of an enumerated strategy
    pub fn table(&self) -> Option<&SubstitutionTable> {
        match self {
            Strategy::Enumerated(table) => Some(table),
            _ => None,
        }
    }

    /// Fail unless this strategy is of the expected kind
    pub fn expect(&self, expected: StrategyKind, field: &FieldDescriptor) -> Result<()> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(Error::StrategyMismatch {
                field: field.qualified_name(),
                resolved: self.kind(),
                expected,
            })
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Direct => write!(f, "direct"),
            StrategyKind::Nested => write!(f, "nested"),
            StrategyKind::Enumerated => write!(f, "enumerated"),
        }
    }
}

impl Mapper {
    /// Resolve the strategy of a field, parsing its spec on first use
    pub fn resolve(&mut self, field: &FieldDescriptor) -> Result<Strategy> {
        if let Some(strategy) = self.cache.get(field.key(), field.position()) {
            tracing::trace!(field = %field.qualified_name(), kind = %strategy.kind(), "strategy cache hit");
            return Ok(strategy);
        }

        let strategy = match (StrategyKind::classify(field.substitution()), field.substitution()) {
            (StrategyKind::Enumerated, Some(spec)) => {
                let name = field.qualified_name();
                let parsed = SubstitutionTable::parse(spec, &name, self.config.duplicate_labels);
                self.cache.record_parse();
                let table = parsed?;
                tracing::debug!(
                    field = %name,
                    pairs = table.len(),
                    policy = %self.config.duplicate_labels,
                    "parsed substitution table"
                );
                Strategy::Enumerated(Arc::new(table))
            }
            (StrategyKind::Nested, _) => Strategy::Nested,
            _ => Strategy::Direct,
        };

        self.cache.insert(field.key(), field.position(), strategy.clone());
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicateLabelPolicy, MapperConfig};
    use crate::descriptor::RecordDescriptor;
    use crate::error::ErrorKind;

    fn descriptor() -> RecordDescriptor {
        RecordDescriptor::new(
            "Pet",
            vec![
                FieldDescriptor::direct("name"),
                FieldDescriptor::nested("owner"),
                FieldDescriptor::enumerated("type", "0:dog;1:cat"),
                FieldDescriptor::enumerated("mood", "0:calm;1:calm"),
            ],
        )
    }

    #[test]
    fn test_classify_order() {
        assert_eq!(StrategyKind::classify(None), StrategyKind::Direct);
        assert_eq!(StrategyKind::classify(Some("")), StrategyKind::Nested);
        assert_eq!(StrategyKind::classify(Some("0:a")), StrategyKind::Enumerated);
    }

    #[test]
    fn test_resolve_each_kind() {
        let desc = descriptor();
        let mut mapper = Mapper::new();

        let kinds: Vec<_> = desc.fields()[..3]
            .iter()
            .map(|f| mapper.resolve(f).unwrap().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![StrategyKind::Direct, StrategyKind::Nested, StrategyKind::Enumerated]
        );

        let strategy = mapper.resolve(&desc.fields()[2]).unwrap();
        assert_eq!(strategy.table().unwrap().code_for("cat").unwrap().raw_code, "1");
    }

    #[test]
    fn test_resolve_parses_once() {
        let desc = descriptor();
        let mut mapper = Mapper::new();

        for _ in 0..5 {
            mapper.resolve(&desc.fields()[2]).unwrap();
        }

        let stats = mapper.stats();
        assert_eq!(stats.tables_parsed, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 4);
    }

    #[test]
    fn test_resolve_format_error_is_not_cached() {
        let desc = descriptor();
        let mut mapper = Mapper::with_config(
            MapperConfig::default().with_duplicate_labels(DuplicateLabelPolicy::Reject),
        );

        let err = mapper.resolve(&desc.fields()[3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("Pet.mood"));
        assert_eq!(mapper.stats().fields, 0);
    }

    #[test]
    fn test_failed_parses_are_counted() {
        let desc = descriptor();
        let mut mapper = Mapper::with_config(
            MapperConfig::default().with_duplicate_labels(DuplicateLabelPolicy::Reject),
        );

        for _ in 0..3 {
            mapper.resolve(&desc.fields()[3]).unwrap_err();
        }

        let stats = mapper.stats();
        assert_eq!(stats.tables_parsed, 3);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.fields, 0);
    }

    #[test]
    fn test_expect_reports_mismatch() {
        let field = FieldDescriptor::direct("name");
        let err = Strategy::Nested.expect(StrategyKind::Direct, &field).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(Strategy::Direct.expect(StrategyKind::Direct, &field).is_ok());
    }
}
