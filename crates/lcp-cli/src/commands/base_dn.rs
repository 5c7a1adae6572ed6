//! `lcp base-dn`.

use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::output::output_json;

/// Runs the base-dn command.
pub fn run_base_dn(settings: &Settings, format: OutputFormat) -> crate::CliResult<()> {
    let mut conn = super::connect(settings)?;
    let base_dn = conn.base_dn()?;

    match format {
        OutputFormat::Json => output_json(&serde_json::json!({ "base_dn": base_dn })),
        OutputFormat::Table => {
            println!("{base_dn}");
            Ok(())
        }
    }
}
