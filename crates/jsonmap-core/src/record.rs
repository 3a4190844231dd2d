//! Record model
//!
//! [`Record`] is the compile-time replacement for reflecting over a struct's
//! fields: it exposes a static [`RecordDescriptor`] and typed access to each
//! participating field by position. `#[derive(Record)]` writes it; a manual
//! impl pairs it with [`record_shapes!`](crate::record_shapes) to get the
//! [`Nested`], [`Root`] and [`Destination`] impls.
//!
//! Copyright (c) 2025 Jsonmap Team
//! Licensed under the Apache-2.0 license

use crate::descriptor::{FieldDescriptor, RecordDescriptor};
use crate::error::{Error, Result};
use crate::mapper::Mapper;
use crate::transcode::describe;
use serde_json::Value;

/// A fixed-shape struct whose fields can be transcoded one at a time
///
/// Implementations dispatch on [`FieldDescriptor::position`] and delegate to
/// the helpers in [`crate::field`] matching the field's annotation.
pub trait Record: Default + 'static {
    /// Static field table, built once per type
    fn descriptor() -> &'static RecordDescriptor;

    /// Produce the wire value of one field
    fn encode_field(&self, mapper: &mut Mapper, field: &FieldDescriptor) -> Result<Value>;

    /// Assign one field from its wire value
    fn decode_field(&mut self, mapper: &mut Mapper, field: &FieldDescriptor, wire: &Value) -> Result<()>;

    /// Exchange one field's value with another instance
    fn swap_field(&mut self, other: &mut Self, field: &FieldDescriptor) -> Result<()>;
}

/// A value that can sit in a nested field
pub trait Nested: Sized {
    fn encode_nested(&self, mapper: &mut Mapper) -> Result<Value>;

    fn decode_nested(mapper: &mut Mapper, field: &FieldDescriptor, wire: &Value) -> Result<Self>;

    /// Value a `null` wire assigns to the field, `None` to leave it as is
    fn from_null() -> Option<Self> {
        None
    }
}

/// Shape of a value handed to the encode dispatcher
#[derive(Debug)]
pub enum RootShape<'a, R> {
    Record(&'a R),
    Sequence(&'a [R]),
    /// Absent value with no record to encode
    Nil,
}

/// A value the encode dispatcher accepts at the top level
pub trait Root {
    type Record: Record;

    fn shape(&self) -> RootShape<'_, Self::Record>;
}

/// Storage the decode dispatcher writes into
#[derive(Debug)]
pub enum DestinationSlot<'a, R> {
    Record(&'a mut R),
    /// Record allocated on demand
    Optional(&'a mut Option<R>),
    /// Decoded elements are appended
    Sequence(&'a mut Vec<R>),
}

/// A value the decode dispatcher accepts as a destination
pub trait Destination {
    type Record: Record;

    fn slot(&mut self) -> DestinationSlot<'_, Self::Record>;
}

/// Encode a record held in a nested field
pub fn encode_nested_record<R: Record>(mapper: &mut Mapper, record: &R) -> Result<Value> {
    mapper.encode_record(record).map(Value::Object)
}

/// Decode a freshly allocated record for a nested field
///
/// `null` gives the default; this only happens for sequence elements and
/// direct calls, since [`field::decode_nested`](crate::field::decode_nested)
/// leaves a bare record field alone on `null`.
pub fn decode_nested_record<R: Record>(
    mapper: &mut Mapper,
    field: &FieldDescriptor,
    wire: &Value,
) -> Result<R> {
    match wire {
        Value::Null => Ok(R::default()),
        Value::Object(object) => {
            let mut record = R::default();
            mapper.decode_object(object, &mut record)?;
            Ok(record)
        }
        other => Err(Error::decode(
            field,
            format!(
                "expected an object for nested record `{}`, found {}",
                R::descriptor().name(),
                describe(other)
            ),
        )),
    }
}

impl<N: Nested> Nested for Option<N> {
    fn encode_nested(&self, mapper: &mut Mapper) -> Result<Value> {
        match self {
            Some(inner) => inner.encode_nested(mapper),
            None => Ok(Value::Null),
        }
    }

    fn decode_nested(mapper: &mut Mapper, field: &FieldDescriptor, wire: &Value) -> Result<Self> {
        match wire {
            Value::Null => Ok(None),
            other => N::decode_nested(mapper, field, other).map(Some),
        }
    }

    fn from_null() -> Option<Self> {
        Some(None)
    }
}

impl<N: Nested> Nested for Box<N> {
    fn encode_nested(&self, mapper: &mut Mapper) -> Result<Value> {
        (**self).encode_nested(mapper)
    }

    fn decode_nested(mapper: &mut Mapper, field: &FieldDescriptor, wire: &Value) -> Result<Self> {
        N::decode_nested(mapper, field, wire).map(Box::new)
    }

    fn from_null() -> Option<Self> {
        N::from_null().map(Box::new)
    }
}

impl<N: Nested> Nested for Vec<N> {
    fn encode_nested(&self, mapper: &mut Mapper) -> Result<Value> {
        self.iter()
            .enumerate()
            .map(|(index, item)| item.encode_nested(mapper).map_err(|e| Error::element(index, e)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn decode_nested(mapper: &mut Mapper, field: &FieldDescriptor, wire: &Value) -> Result<Self> {
        match wire {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    N::decode_nested(mapper, field, item).map_err(|e| Error::element(index, e))
                })
                .collect(),
            other => Err(Error::decode(
                field,
                format!("expected an array of records, found {}", describe(other)),
            )),
        }
    }

    fn from_null() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: Root + ?Sized> Root for &T {
    type Record = T::Record;

    fn shape(&self) -> RootShape<'_, Self::Record> {
        (**self).shape()
    }
}

impl<T: Root + ?Sized> Root for Box<T> {
    type Record = T::Record;

    fn shape(&self) -> RootShape<'_, Self::Record> {
        (**self).shape()
    }
}

impl<T: Root> Root for Option<T> {
    type Record = T::Record;

    fn shape(&self) -> RootShape<'_, Self::Record> {
        match self {
            Some(inner) => inner.shape(),
            None => RootShape::Nil,
        }
    }
}

impl<R: Record> Root for Vec<R> {
    type Record = R;

    fn shape(&self) -> RootShape<'_, R> {
        RootShape::Sequence(self)
    }
}

impl<R: Record> Root for [R] {
    type Record = R;

    fn shape(&self) -> RootShape<'_, R> {
        RootShape::Sequence(self)
    }
}

impl<T: Destination + ?Sized> Destination for Box<T> {
    type Record = T::Record;

    fn slot(&mut self) -> DestinationSlot<'_, Self::Record> {
        (**self).slot()
    }
}

impl<R: Record> Destination for Option<R> {
    type Record = R;

    fn slot(&mut self) -> DestinationSlot<'_, R> {
        DestinationSlot::Optional(self)
    }
}

impl<R: Record> Destination for Vec<R> {
    type Record = R;

    fn slot(&mut self) -> DestinationSlot<'_, R> {
        DestinationSlot::Sequence(self)
    }
}

/// Implement [`Nested`], [`Root`] and [`Destination`] for a [`Record`] type
///
/// `#[derive(Record)]` emits this itself; hand-written `Record` impls call it
/// once after the impl.
#[macro_export]
macro_rules! record_shapes {
    ($record:ty) => {
        impl $crate::record::Nested for $record {
            fn encode_nested(&self, mapper: &mut $crate::Mapper) -> $crate::Result<$crate::serde_json::Value> {
                $crate::record::encode_nested_record(mapper, self)
            }

            fn decode_nested(
                mapper: &mut $crate::Mapper,
                field: &$crate::FieldDescriptor,
                wire: &$crate::serde_json::Value,
            ) -> $crate::Result<Self> {
                $crate::record::decode_nested_record(mapper, field, wire)
            }
        }

        impl $crate::record::Root for $record {
            type Record = $record;

            fn shape(&self) -> $crate::record::RootShape<'_, $record> {
                $crate::record::RootShape::Record(self)
            }
        }

        impl $crate::record::Destination for $record {
            type Record = $record;

            fn slot(&mut self) -> $crate::record::DestinationSlot<'_, $record> {
                $crate::record::DestinationSlot::Record(self)
            }
        }
    };
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::field;
    use serde_json::json;
    use std::sync::OnceLock;

    /// Hand-written record, the shape `#[derive(Record)]` produces
    #[derive(Debug, Default, Clone, PartialEq)]
    pub(crate) struct Switch {
        pub label: String,
        pub state: u8,
    }

    impl Record for Switch {
        fn descriptor() -> &'static RecordDescriptor {
            static DESCRIPTOR: OnceLock<RecordDescriptor> = OnceLock::new();
            DESCRIPTOR.get_or_init(|| {
                RecordDescriptor::new(
                    "Switch",
                    vec![
                        FieldDescriptor::direct("label"),
                        FieldDescriptor::enumerated("state", "0:off;1:on"),
                    ],
                )
            })
        }

        fn encode_field(&self, mapper: &mut Mapper, field: &FieldDescriptor) -> Result<Value> {
            match field.position() {
                0 => field::encode_direct(mapper, field, &self.label),
                1 => field::encode_enumerated(mapper, field, &self.state),
                _ => Err(Error::unknown_field(field)),
            }
        }

        fn decode_field(&mut self, mapper: &mut Mapper, field: &FieldDescriptor, wire: &Value) -> Result<()> {
            match field.position() {
                0 => field::decode_direct(mapper, field, wire, &mut self.label),
                1 => field::decode_enumerated(mapper, field, wire, &mut self.state),
                _ => Err(Error::unknown_field(field)),
            }
        }

        fn swap_field(&mut self, other: &mut Self, field: &FieldDescriptor) -> Result<()> {
            match field.position() {
                0 => std::mem::swap(&mut self.label, &mut other.label),
                1 => std::mem::swap(&mut self.state, &mut other.state),
                _ => return Err(Error::unknown_field(field)),
            }
            Ok(())
        }
    }

    crate::record_shapes!(Switch);

    fn switch(label: &str, state: u8) -> Switch {
        Switch {
            label: label.to_string(),
            state,
        }
    }

    #[test]
    fn test_option_nested_null() {
        let mut mapper = Mapper::new();
        let field = FieldDescriptor::nested("main");

        assert_eq!(None::<Switch>.encode_nested(&mut mapper).unwrap(), Value::Null);
        let decoded = Option::<Switch>::decode_nested(&mut mapper, &field, &Value::Null).unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn test_bare_record_decodes_null_as_default() {
        let mut mapper = Mapper::new();
        let field = FieldDescriptor::nested("main");
        let decoded = Switch::decode_nested(&mut mapper, &field, &Value::Null).unwrap();
        assert_eq!(decoded, Switch::default());
    }

    #[test]
    fn test_from_null_per_container() {
        assert_eq!(Switch::from_null(), None);
        assert_eq!(Box::<Switch>::from_null(), None);
        assert_eq!(Option::<Switch>::from_null(), Some(None));
        assert_eq!(Vec::<Switch>::from_null(), Some(Vec::new()));
        assert_eq!(Box::<Option<Switch>>::from_null(), Some(Box::new(None)));
    }

    #[test]
    fn test_vec_nested_round_trip() {
        let mut mapper = Mapper::new();
        let field = FieldDescriptor::nested("switches");
        let switches = vec![switch("hall", 1), switch("porch", 0)];

        let wire = switches.encode_nested(&mut mapper).unwrap();
        assert_eq!(
            wire,
            json!([{"label": "hall", "state": "on"}, {"label": "porch", "state": "off"}])
        );

        let decoded = Vec::<Switch>::decode_nested(&mut mapper, &field, &wire).unwrap();
        assert_eq!(decoded, switches);
    }

    #[test]
    fn test_vec_nested_reports_element_index() {
        let mut mapper = Mapper::new();
        let switches = vec![switch("hall", 1), switch("attic", 7)];

        let err = switches.encode_nested(&mut mapper).unwrap_err();
        assert_eq!(err.element_path(), vec![1]);
        assert!(matches!(err.root_cause(), Error::Encode { field, .. } if field == "Switch.state"));
    }

    #[test]
    fn test_nested_rejects_scalar() {
        let mut mapper = Mapper::new();
        let field = FieldDescriptor::nested("main");
        let err = Switch::decode_nested(&mut mapper, &field, &json!(3)).unwrap_err();
        assert!(err.to_string().contains("expected an object for nested record `Switch`, found a number"));
    }

    #[test]
    fn test_root_shapes() {
        let one = switch("hall", 1);
        let many = vec![one.clone()];

        assert!(matches!(one.shape(), RootShape::Record(_)));
        assert!(matches!((&one).shape(), RootShape::Record(_)));
        assert!(matches!(Box::new(one.clone()).shape(), RootShape::Record(_)));
        assert!(matches!(many.shape(), RootShape::Sequence(s) if s.len() == 1));
        assert!(matches!(many[..].shape(), RootShape::Sequence(_)));
        assert!(matches!(None::<Switch>.shape(), RootShape::Nil));
    }
}
