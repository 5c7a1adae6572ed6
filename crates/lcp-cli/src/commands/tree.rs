//! `lcp tree`.

use lcp_directory::{BrowseSettings, ConnectionManager, Connector, TreeBuilder, TreeNode};

use crate::cli::{OutputFormat, TreeArgs};
use crate::config::{BrowserSection, Settings};
use crate::output::{info, output_json, render_tree, warning};

/// Runs the tree command.
pub fn run_tree(
    args: &TreeArgs,
    settings: &Settings,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let browse = browse_settings(&settings.browser, args)?;
    let mut conn = super::connect(settings)?;
    let tree = load_tree(&mut conn, &browse)?;

    match format {
        OutputFormat::Json => output_json(&tree),
        OutputFormat::Table => {
            print!("{}", render_tree(&tree, browse.auto_expand));
            if tree.children.is_empty() {
                warning("no entries below the base DN");
                return Ok(());
            }
            info(&format!(
                "{} entries loaded, {} level(s) deep",
                tree.node_count() - 1,
                browse.max_depth
            ));
            Ok(())
        }
    }
}

/// Settings file values with command-line overrides applied.
pub fn browse_settings(
    section: &BrowserSection,
    args: &TreeArgs,
) -> crate::CliResult<BrowseSettings> {
    let mut browse = section.browse()?;
    if let Some(depth) = args.max_depth {
        browse.max_depth = depth;
    }
    if let Some(mode) = &args.display_mode {
        browse.display_mode = mode.parse()?;
    }
    if let Some(containers_first) = args.containers_first {
        browse.containers_first = containers_first;
    }
    browse.auto_expand |= args.expand;
    Ok(browse)
}

/// Builds the tree and applies the presentation order.
pub fn load_tree<C: Connector>(
    conn: &mut ConnectionManager<C>,
    browse: &BrowseSettings,
) -> crate::CliResult<TreeNode> {
    let mut tree = TreeBuilder::from_settings(browse).build_tree(conn)?;
    if browse.containers_first {
        tree.sort_containers_first();
    }
    Ok(tree)
}
