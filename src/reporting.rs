// Reporting and output for qsfuzz
// Plain candidate lists for piping, CSV export for review

use chrono::Local;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::models::Injection;

/// Escape CSV field to prevent formula injection attacks
/// Cells starting with =, +, -, @, or tab are prefixed with single quote
fn escape_csv_field(field: &str) -> String {
    let Some(first_char) = field.chars().next() else {
        return String::new();
    };
    let needs_escaping = matches!(first_char, '=' | '+' | '-' | '@' | '\t');

    if needs_escaping {
        format!("\"'{}\"", field.replace('"', "\"\""))
    } else if field.contains(',')
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Timestamped report filename in the current directory.
pub fn default_report_name() -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("qsfuzz_candidates_{}.csv", timestamp)
}

/// Write one candidate URL per line.
pub fn write_candidates<W: Write>(injections: &[Injection], mut out: W) -> io::Result<()> {
    for injection in injections {
        writeln!(out, "{}", injection.candidate)?;
    }
    out.flush()
}

/// CSV report with a `Rule,Param,Payload,URL` header, appended to batch by
/// batch as injections are produced.
pub struct CsvReport {
    file: BufWriter<File>,
}

impl CsvReport {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "Rule,Param,Payload,URL")?;
        Ok(Self { file })
    }

    pub fn append(&mut self, injections: &[Injection]) -> io::Result<()> {
        for injection in injections {
            writeln!(
                self.file,
                "{},{},{},{}",
                escape_csv_field(&injection.rule),
                escape_csv_field(&injection.candidate.param),
                escape_csv_field(&injection.candidate.payload),
                escape_csv_field(&injection.candidate.url)
            )?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Export injections as CSV in one go.
pub fn export_csv(injections: &[Injection], path: impl AsRef<Path>) -> io::Result<()> {
    let mut report = CsvReport::create(path)?;
    report.append(injections)?;
    report.finish()
}
