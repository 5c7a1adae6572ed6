//! `lcp view`.

use lcp_directory::{
    run_view as run_profile, ConnectionManager, Connector, ViewProfile, ViewTable,
};

use crate::cli::{OutputFormat, ViewArgs};
use crate::config::Settings;
use crate::output::{info, output_json, render_view, render_view_index, warning};
use crate::CliError;

/// Runs the view command.
pub fn run_view(
    args: &ViewArgs,
    settings: &Settings,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let Some(entity) = args.entity.as_deref() else {
        return list_views(settings, format);
    };

    let profile = select_profile(settings, entity, args.profile.as_deref())?;
    let mut conn = super::connect(settings)?;
    let view = load_view(&mut conn, &profile, &settings.viewer.missing_value_placeholder)?;

    match format {
        OutputFormat::Json => output_json(&view),
        OutputFormat::Table => {
            if view.is_empty() {
                warning("no results found for this query");
                return Ok(());
            }
            print!("{}", render_view(&view));
            info(&format!("{} entries", view.rows.len()));
            Ok(())
        }
    }
}

fn list_views(settings: &Settings, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Json => output_json(&settings.viewer_entities),
        OutputFormat::Table => {
            if settings.viewer_entities.is_empty() {
                warning("no views configured");
            } else {
                print!("{}", render_view_index(&settings.viewer_entities));
            }
            Ok(())
        }
    }
}

/// Finds the query for an entity, or for one of its profiles.
pub fn select_profile(
    settings: &Settings,
    entity: &str,
    profile: Option<&str>,
) -> crate::CliResult<ViewProfile> {
    let found = settings
        .viewer_entities
        .get(entity)
        .ok_or_else(|| CliError::UnknownView(entity.to_string()))?;

    match profile {
        None => Ok(found.as_profile()),
        Some(name) => found
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| CliError::UnknownView(format!("{entity}/{name}"))),
    }
}

/// Runs a profile below the base DN.
pub fn load_view<C: Connector>(
    conn: &mut ConnectionManager<C>,
    profile: &ViewProfile,
    missing: &str,
) -> crate::CliResult<ViewTable> {
    Ok(run_profile(conn, profile, missing)?)
}
