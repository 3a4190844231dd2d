//! Record type identity and field descriptors
//!
//! A [`RecordDescriptor`] is the static field table of one record type. It is
//! built once per type (normally by `#[derive(Record)]` into a `OnceLock`) and
//! stamped with a [`TypeKey`] drawn from a process-wide counter, which the
//! transcoding cache uses as its key.
//!
//! Copyright (c) 2025 Jsonmap Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique token identifying a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u64);

impl TypeKey {
    /// Key of fields not yet attached to a record descriptor
    pub const DETACHED: TypeKey = TypeKey(0);

    /// Allocate a fresh key; no two calls in one process return the same key
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TypeKey(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value of the key
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata of one participating field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    key: TypeKey,
    record: &'static str,
    position: usize,
    wire_name: &'static str,
    substitution: Option<&'static str>,
}

impl FieldDescriptor {
    /// Field with an optional substitution annotation
    ///
    /// `None` marks a direct field, `Some("")` a nested record and any other
    /// string an enumerated field with a `code:label;...` spec.
    pub fn new(wire_name: &'static str, substitution: Option<&'static str>) -> Self {
        Self {
            key: TypeKey::DETACHED,
            record: "",
            position: 0,
            wire_name,
            substitution,
        }
    }

    pub fn direct(wire_name: &'static str) -> Self {
        Self::new(wire_name, None)
    }

    pub fn nested(wire_name: &'static str) -> Self {
        Self::new(wire_name, Some(""))
    }

    pub fn enumerated(wire_name: &'static str, spec: &'static str) -> Self {
        Self::new(wire_name, Some(spec))
    }

    /// Type key of the owning record
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Name of the owning record type
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Declaration position among the participating fields
    pub fn position(&self) -> usize {
        self.position
    }

    /// Key of this field in the wire object
    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    /// Raw substitution annotation, if any
    pub fn substitution(&self) -> Option<&'static str> {
        self.substitution
    }

    /// `Record.wire_name`, used in error messages
    pub fn qualified_name(&self) -> String {
        if self.record.is_empty() {
            self.wire_name.to_string()
        } else {
            format!("{}.{}", self.record, self.wire_name)
        }
    }
}

/// Static field table of one record type
#[derive(Debug)]
pub struct RecordDescriptor {
    key: TypeKey,
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Build a descriptor, assigning positions in declaration order
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        let key = TypeKey::next();
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(position, field)| FieldDescriptor {
                key,
                record: name,
                position,
                ..field
            })
            .collect();

        Self {
            key,
            name,
            fields,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, position: usize) -> Option<&FieldDescriptor> {
        self.fields.get(position)
    }

    /// Look up a field by its wire name
    pub fn field_by_wire_name(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_keys_are_unique() {
        let a = TypeKey::next();
        let b = TypeKey::next();
        assert_ne!(a, b);
        assert_ne!(a, TypeKey::DETACHED);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_descriptor_assigns_positions() {
        let desc = RecordDescriptor::new(
            "Animal",
            vec![
                FieldDescriptor::direct("name"),
                FieldDescriptor::enumerated("type", "0:dog;1:cat"),
                FieldDescriptor::nested("owner"),
            ],
        );

        let positions: Vec<_> = desc.fields().iter().map(|f| f.position()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(desc.field(1).unwrap().qualified_name(), "Animal.type");
        assert_eq!(desc.field(2).unwrap().substitution(), Some(""));
        assert_eq!(desc.field_by_wire_name("type").unwrap().position(), 1);
        assert!(desc.fields().iter().all(|f| f.key() == desc.key()));
        assert!(desc.field(3).is_none());
    }

    #[test]
    fn test_distinct_descriptors_get_distinct_keys() {
        let a = RecordDescriptor::new("A", vec![]);
        let b = RecordDescriptor::new("A", vec![]);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_unattached_field_name() {
        let field = FieldDescriptor::direct("free");
        assert_eq!(field.qualified_name(), "free");
        assert_eq!(field.record(), "");
        assert_eq!(field.key(), TypeKey::DETACHED);
    }
}
