//! Output formatting utilities.

use std::fmt::Write as _;

use colored::Colorize;
use indexmap::IndexMap;
use lcp_directory::{decorate, Entry, TreeNode, ViewEntity, ViewTable, OBJECT_CLASS};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Marker appended to nodes whose children are not printed.
const COLLAPSED: &str = " …";

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a hint under an error.
pub fn hint(message: &str) {
    eprintln!("  {} {}", "hint:".cyan().bold(), message);
}

/// Prints a value as pretty JSON.
pub fn output_json<T: serde::Serialize>(value: &T) -> crate::CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Draws a tree with box-drawing guides.
///
/// Only the root's children are drawn unless `expand_all` is set. Nodes
/// that have children which are not drawn end with `…`.
#[must_use]
pub fn render_tree(root: &TreeNode, expand_all: bool) -> String {
    let mut out = String::new();
    out.push_str(&root.label);
    out.push('\n');

    let max_level = if expand_all { usize::MAX } else { 0 };
    render_children(&mut out, &root.children, "", 0, max_level);
    out
}

fn render_children(
    out: &mut String,
    nodes: &[TreeNode],
    prefix: &str,
    level: usize,
    max_level: usize,
) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };

        let shown = level < max_level && !node.children.is_empty();
        let marker = if node.has_children && !shown { COLLAPSED } else { "" };
        let _ = writeln!(out, "{prefix}{branch}{}{marker}", node.label);

        if shown {
            let prefix = format!("{prefix}{indent}");
            render_children(out, &node.children, &prefix, level + 1, max_level);
        }
    }
}

/// One attribute value row.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct AttributeRow {
    /// Attribute name, only on the first row of each attribute.
    #[tabled(rename = "Attribute")]
    pub name: String,
    /// A single value.
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Table rows for an entry, one per value. `objectClass` is left out.
#[must_use]
pub fn attribute_rows(entry: &Entry) -> Vec<AttributeRow> {
    entry
        .attributes
        .iter()
        .filter(|(name, _)| name.as_str() != OBJECT_CLASS)
        .flat_map(|(name, values)| {
            values.iter().enumerate().map(move |(i, value)| AttributeRow {
                name: if i == 0 { name.clone() } else { String::new() },
                value: value.clone(),
            })
        })
        .collect()
}

/// Renders an entry: a header with DN, RDN type and object classes, then
/// an attribute table.
#[must_use]
pub fn render_entry(entry: &Entry) -> String {
    let rdn = decorate::rdn(&entry.dn);
    let rdn_type = rdn.split_once('=').map_or(rdn, |(kind, _)| kind);

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", decorate::icon_for(entry), entry.dn.bold());
    let _ = writeln!(out, "  {} {}", "type:".dimmed(), rdn_type);
    let _ = writeln!(
        out,
        "  {} {}",
        "objectClass:".dimmed(),
        entry.object_classes().join(", ")
    );

    let rows = attribute_rows(entry);
    if !rows.is_empty() {
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
        out.push('\n');
    }
    out
}

/// Renders view results as a table with the view's columns as header.
#[must_use]
pub fn render_view(view: &ViewTable) -> String {
    let mut builder = Builder::default();
    builder.push_record(view.columns.clone());
    for row in &view.rows {
        builder.push_record(row.clone());
    }

    let mut out = builder.build().with(Style::rounded()).to_string();
    out.push('\n');
    out
}

/// Lists view entities and their profiles.
#[must_use]
pub fn render_view_index(entities: &IndexMap<String, ViewEntity>) -> String {
    let mut out = String::new();
    for (name, entity) in entities {
        let _ = writeln!(out, "{} {}", entity.icon(), name.bold());
        let count = entity.profiles.len();
        for (i, profile) in entity.profiles.keys().enumerate() {
            let branch = if i + 1 == count { "└── " } else { "├── " };
            let _ = writeln!(out, "{branch}{profile}");
        }
    }
    out
}
