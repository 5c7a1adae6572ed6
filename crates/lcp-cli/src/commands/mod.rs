//! Command implementations.

pub mod base_dn;
pub mod entry;
pub mod tree;
pub mod view;

pub use base_dn::run_base_dn;
pub use entry::run_entry;
pub use tree::run_tree;
pub use view::run_view;

use lcp_directory::ConnectionManager;

use crate::config::Settings;

/// Opens a bound connection from the settings.
///
/// Connecting up front keeps "server down" and "bad credentials" apart
/// from later lookup failures.
pub fn connect(settings: &Settings) -> crate::CliResult<ConnectionManager> {
    let config = settings.ldap_config()?;
    let mut conn = ConnectionManager::new(config).with_filters(settings.browser.filters());
    conn.connect()?;
    Ok(conn)
}
