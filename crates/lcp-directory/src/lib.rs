//! # lcp-directory
//!
//! Directory-access engine for the LDAP control panel.
//!
//! This crate connects to a directory server with `ldap3`, works out the
//! base DN when none is configured, and turns search results into
//! display-ready trees and entries.
//!
//! ## Layout
//!
//! - [`ConnectionManager`]: session lifecycle, searches, single-entry lookups
//! - [`BaseDnResolver`]: ordered base DN discovery strategies
//! - [`filter_entry`]: hides configured object classes and attributes
//! - [`TreeBuilder`]: depth-bounded tree construction
//! - [`decorate`]: icons, RDNs and display names
//! - [`run_view`]: saved subtree queries projected onto columns
//!
//! Everything is synchronous. Run a tree build on a worker thread if the
//! caller must stay responsive.
//!
//! ## Example
//!
//! ```no_run
//! use lcp_directory::{ConnectionManager, DisplayMode, LdapConfig, TreeBuilder};
//!
//! # fn main() -> lcp_directory::LdapResult<()> {
//! let config = LdapConfig::builder()
//!     .uri("ldap://ldap.example.com")
//!     .bind_dn("cn=admin,dc=example,dc=com")
//!     .bind_password("secret")
//!     .build()?;
//!
//! let mut conn = ConnectionManager::new(config);
//! let tree = TreeBuilder::new(3, DisplayMode::Full).build_tree(&mut conn)?;
//! println!("{} has {} nodes", tree.dn, tree.node_count());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod decorate;
pub mod discovery;
pub mod entry;
pub mod error;
pub mod filter;
pub mod memory;
pub mod transport;
pub mod tree;
pub mod view;

pub use config::{
    BrowseSettings, DisplayMode, FilterConfig, LdapConfig, LdapConfigBuilder, SearchScope,
    DEFAULT_FILTER, DEFAULT_MAX_DEPTH, NO_ATTRIBUTES,
};
pub use connection::{ConnectionManager, ConnectionState, DirectorySearch};
pub use discovery::{BaseDnResolver, DiscoveryStrategy};
pub use entry::{Attributes, Entry, RawEntry, OBJECT_CLASS};
pub use error::{LdapError, LdapResult};
pub use filter::filter_entry;
pub use memory::InMemoryDirectory;
pub use transport::{Connector, DirectorySession, Ldap3Connector};
pub use tree::{TreeBuilder, TreeNode};
pub use view::{run_view, ViewEntity, ViewProfile, ViewTable};
