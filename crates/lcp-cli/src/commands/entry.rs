//! `lcp entry`.

use lcp_directory::{ConnectionManager, Connector, Entry};

use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::output::{output_json, render_entry};
use crate::CliError;

/// Runs the entry command.
pub fn run_entry(dn: &str, settings: &Settings, format: OutputFormat) -> crate::CliResult<()> {
    let mut conn = super::connect(settings)?;
    let entry = lookup(&mut conn, dn)?;

    match format {
        OutputFormat::Json => output_json(&entry),
        OutputFormat::Table => {
            print!("{}", render_entry(&entry));
            Ok(())
        }
    }
}

/// Fetches one filtered entry.
pub fn lookup<C: Connector>(conn: &mut ConnectionManager<C>, dn: &str) -> crate::CliResult<Entry> {
    conn.get_entry(dn)?
        .ok_or_else(|| CliError::NotFound(dn.to_string()))
}
