//! Depth-bounded tree construction.
//!
//! The builder walks the directory one level at a time below the base DN.
//! Recursion stops at `max_depth`, which also guards against alias loops.
//! Every node gets a one-level child probe, so frontier nodes still report
//! whether they can be expanded.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, Span};

use crate::config::{
    BrowseSettings, DisplayMode, FilterConfig, SearchScope, DEFAULT_FILTER, NO_ATTRIBUTES,
};
use crate::connection::{ConnectionManager, DirectorySearch};
use crate::decorate::{display_name, icon_for, rdn, ROOT_ICON};
use crate::entry::{Attributes, Entry};
use crate::error::LdapResult;
use crate::transport::Connector;

/// A display-ready directory node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Text shown for the node.
    pub label: String,
    /// Leftmost DN component.
    pub rdn: String,
    /// Full DN.
    pub dn: String,
    /// Icon derived from the entry's object classes.
    pub icon: String,
    /// Filtered attributes, in server order.
    pub attributes: Attributes,
    /// Whether the entry has children, expanded or not.
    pub has_children: bool,
    /// Expanded children, in server order. Empty past the depth limit.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Orders every level as containers first, then leaves, each group by
    /// case-insensitive label.
    pub fn sort_containers_first(&mut self) {
        self.children
            .sort_by_cached_key(|node| (!node.has_children, node.label.to_lowercase()));
        for child in &mut self.children {
            child.sort_containers_first();
        }
    }

    /// Finds the node for `dn` in this subtree.
    #[must_use]
    pub fn find(&self, dn: &str) -> Option<&Self> {
        if self.dn.eq_ignore_ascii_case(dn) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(dn))
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// Builds [`TreeNode`] trees from a live connection.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    max_depth: usize,
    display_mode: DisplayMode,
    span: Span,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::from_settings(&BrowseSettings::default())
    }
}

impl TreeBuilder {
    /// Creates a builder loading `max_depth` levels below the base DN.
    #[must_use]
    pub fn new(max_depth: usize, display_mode: DisplayMode) -> Self {
        Self {
            max_depth,
            display_mode,
            span: tracing::info_span!("tree", max_depth),
        }
    }

    /// Creates a builder from browse settings.
    #[must_use]
    pub fn from_settings(settings: &BrowseSettings) -> Self {
        Self::new(settings.max_depth, settings.display_mode)
    }

    /// Sets the span diagnostics are recorded under.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Depth limit.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Builds the tree rooted at the connection's base DN.
    ///
    /// ## Errors
    ///
    /// Base DN discovery and connection failures. Failed searches below
    /// the root only empty their own branch.
    pub fn build_tree<C: Connector>(
        &self,
        conn: &mut ConnectionManager<C>,
    ) -> LdapResult<TreeNode> {
        let _entered = self.span.enter();

        let root_dn = conn.base_dn()?;
        conn.ensure_connected()?;
        info!(base_dn = %root_dn, "Building directory tree");

        let filters = conn.filters().clone();
        let children = self.expand(conn, &filters, &root_dn, 0);

        Ok(TreeNode {
            label: root_dn.clone(),
            rdn: rdn(&root_dn).to_string(),
            icon: ROOT_ICON.to_string(),
            attributes: Attributes::new(),
            has_children: !children.is_empty(),
            children,
            dn: root_dn,
        })
    }

    /// Loads the children of `parent_dn`, which sits `depth` levels below
    /// the root. Returns nothing once `depth` reaches the limit.
    pub fn expand_children<C: Connector>(
        &self,
        conn: &mut ConnectionManager<C>,
        parent_dn: &str,
        depth: usize,
    ) -> Vec<TreeNode> {
        let _entered = self.span.enter();
        let filters = conn.filters().clone();
        self.expand(conn, &filters, parent_dn, depth)
    }

    fn expand<S>(
        &self,
        conn: &mut S,
        filters: &FilterConfig,
        parent_dn: &str,
        depth: usize,
    ) -> Vec<TreeNode>
    where
        S: DirectorySearch,
    {
        if depth >= self.max_depth {
            return Vec::new();
        }

        let entries = conn.search(parent_dn, SearchScope::OneLevel, DEFAULT_FILTER, &[]);
        let mut nodes = Vec::with_capacity(entries.len());
        for entry in entries {
            nodes.push(self.node(conn, filters, &entry, depth));
        }
        nodes
    }

    fn node<S>(&self, conn: &mut S, filters: &FilterConfig, entry: &Entry, depth: usize) -> TreeNode
    where
        S: DirectorySearch,
    {
        // icons come from the unfiltered object classes
        let icon = icon_for(entry);
        let visible = filters.apply(entry).into_owned();

        let node_rdn = rdn(&visible.dn).to_string();
        let label = self
            .display_mode
            .label(icon, &node_rdn, &display_name(&visible));

        let has_children = !conn
            .search(&visible.dn, SearchScope::OneLevel, DEFAULT_FILTER, &[NO_ATTRIBUTES])
            .is_empty();
        let children = if has_children && depth + 1 < self.max_depth {
            self.expand(conn, filters, &visible.dn, depth + 1)
        } else {
            Vec::new()
        };
        debug!(dn = %visible.dn, depth, has_children, "Loaded tree node");

        TreeNode {
            label,
            rdn: node_rdn,
            dn: visible.dn,
            icon: icon.to_string(),
            attributes: visible.attributes,
            has_children,
            children,
        }
    }
}
