//! Output formatting and writing utilities
//!
//! Reports are written either as human-readable text or as JSON, depending
//! on the `--output` flag.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::handlers::check::CheckReport;
use crate::handlers::inspect::Inspection;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

/// Trait for formatting output with specialized support for report types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a parsed substitution spec
    fn format_inspection(&self, inspection: &Inspection) -> Result<String>;

    /// Format the outcome of a manifest check
    fn format_check_report(&self, report: &CheckReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_inspection(&self, inspection: &Inspection) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_inspection_human(inspection)),
            _ => self.format(inspection),
        }
    }

    fn format_check_report(&self, report: &CheckReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_check_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    #[allow(dead_code)]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        tracing::debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a parsed substitution spec
    pub fn inspection(&mut self, inspection: &Inspection) -> Result<()> {
        let formatted = self.format.format_inspection(inspection)?;
        let colored = self.colorize(formatted);
        self.writeln(&colored)
    }

    /// Write a manifest check report; failures are shown even when quiet
    pub fn check_report(&mut self, report: &CheckReport) -> Result<()> {
        if self.quiet && report.failed == 0 {
            return Ok(());
        }
        let formatted = self.format.format_check_report(report)?;
        let colored = self.colorize(formatted);
        self.writeln(&colored)
    }

    fn colorize(&self, formatted: String) -> String {
        if !self.use_color || self.format != OutputFormat::Human {
            return formatted;
        }

        formatted
            .lines()
            .map(|line| {
                if line.starts_with("═══") {
                    line.bright_blue().to_string()
                } else if line.starts_with("  ✗") {
                    line.red().to_string()
                } else if line.starts_with("  ✓") {
                    line.green().to_string()
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format an inspection for human reading
fn format_inspection_human(inspection: &Inspection) -> String {
    let mut output = String::new();

    output.push_str(&format!("═══ Substitution table for {} ═══\n", inspection.field));
    output.push_str(&format!("Duplicate policy: {:?}\n\n", inspection.policy));

    output.push_str(&format!("Pairs ({}):\n", inspection.pairs.len()));
    for (i, pair) in inspection.pairs.iter().enumerate() {
        output.push_str(&format!("  {}. {} ({}) : {}\n", i + 1, pair.code, pair.kind, pair.label));
    }

    output.push_str("\nEncode (code → label):\n");
    for lookup in &inspection.encode {
        output.push_str(&format!("  {} → {}\n", lookup.from, lookup.to));
    }

    output.push_str("\nDecode (label → code):\n");
    for lookup in &inspection.decode {
        output.push_str(&format!("  {} → {}\n", lookup.from, lookup.to));
    }

    output.trim_end().to_string()
}

/// Format a check report for human reading
fn format_check_report_human(report: &CheckReport) -> String {
    let mut output = String::new();

    output.push_str("═══ Manifest check ═══\n");
    output.push_str(&format!("Duplicate policy: {:?}\n\n", report.policy));

    for field in &report.fields {
        match &field.error {
            None => {
                let detail = match field.pairs {
                    Some(pairs) => format!("{:?}, {} pair(s)", field.strategy, pairs),
                    None => format!("{:?}", field.strategy),
                };
                output.push_str(&format!("  ✓ {} ({})\n", field.qualified(), detail));
            }
            Some(error) => {
                output.push_str(&format!("  ✗ {}: {}\n", field.qualified(), error));
            }
        }
    }

    output.push_str(&format!(
        "\n{} checked, {} failed",
        report.fields.len(),
        report.failed
    ));

    output
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
