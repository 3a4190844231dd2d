//! Check command handler
//!
//! A manifest lists records and the substitution annotation of each field:
//!
//! ```toml
//! [[records]]
//! name = "Animal"
//! fields = [
//!     { name = "name" },
//!     { name = "type", map = "0:dog;1:cat;2:cow;3:others" },
//!     { name = "owner", map = "", record = "Owner" },
//! ]
//! ```
//!
//! Every field is classified, every enumerated spec is parsed under the
//! configured duplicate policy, and all failures are reported together.

use crate::cli::CheckArgs;
use crate::config::{read_document, Config};
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jsonmap_core::{DuplicateLabelPolicy, StrategyKind, SubstitutionTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub records: Vec<RecordManifest>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordManifest {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldManifest>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldManifest {
    /// Wire name of the field
    pub name: String,
    /// Substitution annotation; absent for direct fields, empty for nested
    pub map: Option<String>,
    /// Record type a nested field holds
    pub record: Option<String>,
}

/// Outcome of checking one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCheck {
    pub record: String,
    pub field: String,
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldCheck {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }

    /// Qualified `Record.field` name
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.record, self.field)
    }
}

/// Outcome of checking a whole manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub policy: DuplicateLabelPolicy,
    pub fields: Vec<FieldCheck>,
    pub failed: usize,
}

/// Handle the check command
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("check", &args.manifest.display().to_string());

    let policy = args
        .duplicates
        .map(DuplicateLabelPolicy::from)
        .unwrap_or(config.mapper.duplicate_labels);

    output.info(&format!("Checking manifest: {}", args.manifest.display()))?;
    let manifest: Manifest = read_document(&args.manifest)?;

    let report = check_manifest(&manifest, policy);
    output.check_report(&report)?;

    if report.failed > 0 {
        return Err(Error::CheckFailed {
            failed: report.failed,
            total: report.fields.len(),
        });
    }

    output.success(&format!("✓ All {} field(s) passed", report.fields.len()))
}

/// Check every field of every record in a manifest
pub fn check_manifest(manifest: &Manifest, policy: DuplicateLabelPolicy) -> CheckReport {
    let known: HashSet<&str> = manifest.records.iter().map(|r| r.name.as_str()).collect();
    let mut fields = Vec::new();

    for record in &manifest.records {
        let mut wire_names = HashSet::new();

        for field in &record.fields {
            let check = check_field(record, field, policy, &known, wire_names.insert(field.name.as_str()));
            if let Some(error) = &check.error {
                tracing::debug!(field = %check.qualified(), error = %error, "Field failed check");
            }
            fields.push(check);
        }
    }

    let failed = fields.iter().filter(|f| !f.passed()).count();
    tracing::info!(fields = fields.len(), failed, "Manifest checked");

    CheckReport { policy, fields, failed }
}

fn check_field(
    record: &RecordManifest,
    field: &FieldManifest,
    policy: DuplicateLabelPolicy,
    known: &HashSet<&str>,
    first_use: bool,
) -> FieldCheck {
    let qualified = format!("{}.{}", record.name, field.name);
    let strategy = StrategyKind::classify(field.map.as_deref());

    let mut check = FieldCheck {
        record: record.name.clone(),
        field: field.name.clone(),
        strategy,
        pairs: None,
        error: None,
    };

    if field.name.is_empty() {
        check.error = Some("empty wire name".to_string());
        return check;
    }
    if !first_use {
        check.error = Some(format!("wire name `{}` is declared more than once", field.name));
        return check;
    }

    match (strategy, field.record.as_deref(), field.map.as_deref()) {
        (StrategyKind::Enumerated, _, Some(spec)) => {
            if field.record.is_some() {
                check.error = Some("`record` is only valid on nested fields".to_string());
                return check;
            }
            match SubstitutionTable::parse(spec, &qualified, policy) {
                Ok(table) => check.pairs = Some(table.len()),
                Err(e) => check.error = Some(e.to_string()),
            }
        }
        (StrategyKind::Nested, Some(target), _) if !known.contains(target) => {
            check.error = Some(format!("nested record `{}` is not declared in the manifest", target));
        }
        (StrategyKind::Direct, Some(_), _) => {
            check.error = Some("`record` is only valid on nested fields".to_string());
        }
        _ => {}
    }

    check
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::config::FileFormat;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const MANIFEST: &str = r#"
[[records]]
name = "Animal"
fields = [
    { name = "name" },
    { name = "type", map = "0:dog;1:cat;2:cow;3:others" },
    { name = "owner", map = "", record = "Owner" },
]

[[records]]
name = "Owner"
fields = [{ name = "name" }, { name = "phone" }]
"#;

    fn field(name: &str, map: Option<&str>, record: Option<&str>) -> FieldManifest {
        FieldManifest {
            name: name.to_string(),
            map: map.map(str::to_string),
            record: record.map(str::to_string),
        }
    }

    fn manifest(fields: Vec<FieldManifest>) -> Manifest {
        Manifest {
            records: vec![RecordManifest {
                name: "Ticket".to_string(),
                fields,
            }],
        }
    }

    #[test]
    fn test_valid_manifest_passes() {
        let manifest: Manifest = FileFormat::Toml.parse(MANIFEST).unwrap();
        let report = check_manifest(&manifest, DuplicateLabelPolicy::Reject);

        assert_eq!(report.failed, 0);
        assert_eq!(report.fields.len(), 5);
        assert_eq!(report.fields[1].strategy, StrategyKind::Enumerated);
        assert_eq!(report.fields[1].pairs, Some(4));
        assert_eq!(report.fields[2].strategy, StrategyKind::Nested);
        assert_eq!(report.fields[3].strategy, StrategyKind::Direct);
    }

    #[test]
    fn test_all_failures_are_reported() {
        let report = check_manifest(
            &manifest(vec![
                field("priority", Some("0:low;1high"), None),
                field("status", Some("0:open;1:closed;2:closed"), None),
                field("parent", Some(""), Some("Epic")),
                field("status", None, None),
            ]),
            DuplicateLabelPolicy::Reject,
        );

        assert_eq!(report.failed, 4);
        let errors: Vec<&str> = report.fields.iter().filter_map(|f| f.error.as_deref()).collect();
        assert!(errors[0].contains("Ticket.priority"));
        assert!(errors[1].contains("duplicate label"));
        assert!(errors[2].contains("`Epic`"));
        assert!(errors[3].contains("more than once"));
    }

    #[test]
    fn test_policy_decides_duplicates() {
        let tickets = manifest(vec![field("status", Some("0:open;1:closed;2:closed"), None)]);

        assert_eq!(check_manifest(&tickets, DuplicateLabelPolicy::LastDeclaredWins).failed, 0);
        assert_eq!(check_manifest(&tickets, DuplicateLabelPolicy::Reject).failed, 1);
    }

    #[test]
    fn test_record_on_non_nested_field() {
        let report = check_manifest(
            &manifest(vec![
                field("id", None, Some("Ticket")),
                field("status", Some("0:open"), Some("Ticket")),
            ]),
            DuplicateLabelPolicy::Reject,
        );
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn test_handle_check_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            b"records:\n  - name: Ticket\n    fields:\n      - name: status\n        map: \"0:open;1:open\"\n",
        )
        .unwrap();

        let args = CheckArgs {
            manifest: file.path().to_path_buf(),
            duplicates: Some(crate::cli::DuplicatePolicy::Reject),
        };
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(std::io::sink()));
        let err = handle_check(args, &Config::default(), &mut output).unwrap_err();

        assert!(matches!(err, Error::CheckFailed { failed: 1, total: 1 }));
    }

    #[test]
    fn test_unknown_manifest_keys_are_rejected() {
        let result: Result<Manifest> = FileFormat::Json.parse(r#"{"records": [], "extra": 1}"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
