//! Substitution table builder
//!
//! Parses a field's `code:label;code:label...` spec into an immutable table
//! with one lookup per direction: code to label for encoding, label to code
//! for decoding. Pairs split on `;`, then on the first `:`, so labels may
//! contain `:` but codes may not. No whitespace is trimmed.
//!
//! Duplicates are governed by [`DuplicateLabelPolicy`]: under
//! `LastDeclaredWins` the later pair replaces the earlier one in the lookup
//! direction it collides in, under `Reject` a repeated code or label fails the
//! build.
//!
//! Copyright (c) 2025 Jsonmap Team
//! Licensed under the Apache-2.0 license

use crate::config::DuplicateLabelPolicy;
use crate::error::{Error, Result};
use crate::scalar::Scalar;
use std::collections::HashMap;

/// Separator between pairs
pub const PAIR_SEPARATOR: char = ';';

/// Separator between the code and label of one pair
pub const CODE_SEPARATOR: char = ':';

/// One `code:label` pair in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Code text exactly as written in the spec
    pub raw_code: String,
    /// Code parsed as a scalar
    pub code: Scalar,
    /// Wire label
    pub label: String,
}

/// Parsed substitution spec of one field
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionTable {
    entries: Vec<Substitution>,
    code_to_label: HashMap<String, usize>,
    label_to_code: HashMap<String, usize>,
}

impl SubstitutionTable {
    /// Parse a substitution spec for the named field
    pub fn parse(spec: &str, field: &str, policy: DuplicateLabelPolicy) -> Result<Self> {
        let mut table = Self {
            entries: Vec::new(),
            code_to_label: HashMap::new(),
            label_to_code: HashMap::new(),
        };

        for pair in spec.split(PAIR_SEPARATOR) {
            let (raw_code, label) = pair
                .split_once(CODE_SEPARATOR)
                .ok_or_else(|| Error::format(field, pair, "missing `:` separator"))?;

            if raw_code.is_empty() {
                return Err(Error::format(field, pair, "empty code"));
            }
            if label.is_empty() {
                return Err(Error::format(field, pair, "empty label"));
            }

            let code = Scalar::parse_code(raw_code);
            let index = table.entries.len();

            if let Some(previous) = table.code_to_label.insert(code.canonical_key(), index) {
                if policy == DuplicateLabelPolicy::Reject {
                    return Err(Error::format(
                        field,
                        pair,
                        format!("duplicate code, already declared in `{}`", table.pair_text(previous)),
                    ));
                }
            }

            if let Some(previous) = table.label_to_code.insert(label.to_string(), index) {
                if policy == DuplicateLabelPolicy::Reject {
                    return Err(Error::format(
                        field,
                        pair,
                        format!("duplicate label, already declared in `{}`", table.pair_text(previous)),
                    ));
                }
            }

            table.entries.push(Substitution {
                raw_code: raw_code.to_string(),
                code,
                label: label.to_string(),
            });
        }

        Ok(table)
    }

    fn pair_text(&self, index: usize) -> String {
        let entry = &self.entries[index];
        format!("{}{}{}", entry.raw_code, CODE_SEPARATOR, entry.label)
    }

    /// Label for a native code
    pub fn label_for(&self, code: &Scalar) -> Option<&str> {
        self.code_to_label
            .get(&code.canonical_key())
            .map(|&i| self.entries[i].label.as_str())
    }

    /// Code for a wire label
    pub fn code_for(&self, label: &str) -> Option<&Substitution> {
        self.label_to_code.get(label).map(|&i| &self.entries[i])
    }

    /// Pairs in declaration order, including any shadowed by later duplicates
    pub fn entries(&self) -> &[Substitution] {
        &self.entries
    }

    /// Number of declared pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct labels accepted on decode, in declaration order
    pub fn labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, e)| self.label_to_code.get(&e.label) == Some(i))
            .map(|(_, e)| e.label.as_str())
            .collect()
    }
}
