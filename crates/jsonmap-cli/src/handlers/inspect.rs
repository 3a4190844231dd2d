//! Inspect command handler

use crate::cli::InspectArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use jsonmap_core::{DuplicateLabelPolicy, SubstitutionTable};
use serde::Serialize;
use std::collections::HashSet;

/// Parsed view of one substitution spec
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub field: String,
    pub policy: DuplicateLabelPolicy,
    /// Pairs in declaration order, shadowed duplicates included
    pub pairs: Vec<PairReport>,
    /// Native code to wire label, one row per distinct code
    pub encode: Vec<Lookup>,
    /// Wire label to native code, one row per distinct label
    pub decode: Vec<Lookup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport {
    pub code: String,
    pub kind: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup {
    pub from: String,
    pub to: String,
}

/// Handle the inspect command
pub fn handle_inspect(args: InspectArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let policy = args
        .duplicates
        .map(DuplicateLabelPolicy::from)
        .unwrap_or(config.mapper.duplicate_labels);

    let inspection = inspect(&args.spec, &args.field, policy)?;
    output.inspection(&inspection)
}

/// Parse a spec and describe both lookup directions
pub fn inspect(spec: &str, field: &str, policy: DuplicateLabelPolicy) -> Result<Inspection> {
    let table = SubstitutionTable::parse(spec, field, policy)?;
    tracing::debug!(field = %field, pairs = table.len(), ?policy, "Parsed substitution spec");

    let pairs = table
        .entries()
        .iter()
        .map(|entry| PairReport {
            code: entry.raw_code.clone(),
            kind: entry.code.kind(),
            label: entry.label.clone(),
        })
        .collect();

    let mut seen = HashSet::new();
    let encode = table
        .entries()
        .iter()
        .filter(|entry| seen.insert(entry.code.canonical_key()))
        .filter_map(|entry| {
            table.label_for(&entry.code).map(|label| Lookup {
                from: entry.code.to_string(),
                to: label.to_string(),
            })
        })
        .collect();

    let decode = table
        .labels()
        .into_iter()
        .filter_map(|label| {
            table.code_for(label).map(|entry| Lookup {
                from: label.to_string(),
                to: entry.code.to_string(),
            })
        })
        .collect();

    Ok(Inspection {
        field: field.to_string(),
        policy,
        pairs,
        encode,
        decode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn lookup(from: &str, to: &str) -> Lookup {
        Lookup {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_inspect_animal_types() {
        let inspection = inspect("0:dog;1:cat;2:cow;3:others", "Animal.type", DuplicateLabelPolicy::Reject).unwrap();

        assert_eq!(inspection.pairs.len(), 4);
        assert_eq!(inspection.pairs[2].kind, "integer");
        assert_eq!(inspection.encode[2], lookup("2", "cow"));
        assert_eq!(inspection.decode[0], lookup("dog", "0"));
    }

    #[test]
    fn test_last_declared_wins_shadows_earlier_pairs() {
        let inspection = inspect("0:open;1:closed;2:closed;1:done", "Ticket.status", DuplicateLabelPolicy::LastDeclaredWins)
            .unwrap();

        assert_eq!(inspection.pairs.len(), 4);
        assert_eq!(
            inspection.encode,
            vec![lookup("0", "open"), lookup("1", "done"), lookup("2", "closed")]
        );
        assert_eq!(
            inspection.decode,
            vec![lookup("open", "0"), lookup("closed", "2"), lookup("done", "1")]
        );
    }

    #[test]
    fn test_string_codes_are_quoted() {
        let inspection = inspect(r#""h":high;2.5:odd"#, "Animal.grade", DuplicateLabelPolicy::Reject).unwrap();
        assert_eq!(inspection.encode[0], lookup("\"h\"", "high"));
        assert_eq!(inspection.pairs[1].kind, "float");
    }

    #[test]
    fn test_reject_policy_reports_duplicate() {
        let err = inspect("0:open;1:open", "Ticket.status", DuplicateLabelPolicy::Reject).unwrap_err();
        match err {
            Error::Core(core) => {
                assert_eq!(core.kind(), jsonmap_core::ErrorKind::Format);
                assert!(core.to_string().contains("Ticket.status"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
