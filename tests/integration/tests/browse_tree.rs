//! Tree building integration tests.

use lcp_directory::{DisplayMode, FilterConfig, TreeBuilder, TreeNode};
use pretty_assertions::assert_eq;

use crate::common::{corp_directory, TestEnv, BASE_DN};

fn labels(nodes: &[TreeNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.label.as_str()).collect()
}

#[test]
fn test_depth_two_tree() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;

    let tree = TreeBuilder::new(2, DisplayMode::Full).build_tree(&mut conn)?;

    assert_eq!(tree.dn, BASE_DN);
    assert_eq!(tree.label, BASE_DN);
    assert_eq!(tree.icon, "🌐");
    assert_eq!(
        labels(&tree.children),
        ["📁 ou=people", "📁 ou=groups", "🔑 cn=admin", "📁 ou=services"]
    );
    assert_eq!(
        labels(&tree.children[1].children),
        ["🔗 cn=admins", "🔧 cn=recent"]
    );

    // frontier: has children, none loaded
    let legacy = tree
        .find("ou=legacy,ou=services,dc=corp,dc=example")
        .expect("legacy node");
    assert!(legacy.has_children);
    assert!(legacy.children.is_empty());

    let admin = tree.find("cn=admin,dc=corp,dc=example").expect("admin node");
    assert!(!admin.has_children);

    Ok(())
}

#[test]
fn test_deep_tree_reaches_leaves() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;

    let tree = TreeBuilder::new(4, DisplayMode::Full).build_tree(&mut conn)?;

    let old_app = tree
        .find("cn=old-app,ou=archive,ou=legacy,ou=services,dc=corp,dc=example")
        .expect("deepest node");
    assert_eq!(old_app.icon, "📄");
    assert!(!old_app.has_children);
    assert_eq!(tree.node_count(), 12);

    Ok(())
}

#[test]
fn test_simple_display_mode() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;

    let tree = TreeBuilder::new(2, DisplayMode::Simple).build_tree(&mut conn)?;

    let people = &tree.children[0];
    assert_eq!(people.label, "📁 people");
    assert_eq!(people.rdn, "ou=people");
    assert_eq!(labels(&people.children), ["👤 John Doe", "🏠 Alice Smith"]);

    Ok(())
}

#[test]
fn test_filters_apply_to_nodes() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?.with_filters(
        FilterConfig::new()
            .hide_object_classes(["top", "inetOrgPerson"])
            .hide_attributes(["userPassword"]),
    );

    let tree = TreeBuilder::new(2, DisplayMode::Full).build_tree(&mut conn)?;

    let jdoe = tree
        .find("uid=jdoe,ou=people,dc=corp,dc=example")
        .expect("jdoe node");
    assert_eq!(jdoe.icon, "👤");
    assert!(!jdoe.attributes.contains_key("userPassword"));
    assert_eq!(jdoe.attributes["objectClass"], ["person", "posixAccount"]);
    assert_eq!(jdoe.attributes["jpegPhoto"], ["<binary: ffd8ffe0>"]);
    assert_eq!(
        jdoe.attributes["mail"],
        ["jdoe@corp.example", "john.doe@corp.example"]
    );

    Ok(())
}

#[test]
fn test_containers_first_ordering() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;

    let mut tree = TreeBuilder::new(2, DisplayMode::Full).build_tree(&mut conn)?;
    tree.sort_containers_first();

    assert_eq!(
        labels(&tree.children),
        ["📁 ou=groups", "📁 ou=people", "📁 ou=services", "🔑 cn=admin"]
    );

    Ok(())
}

#[test]
fn test_failed_branch_is_isolated() -> anyhow::Result<()> {
    let env =
        TestEnv::with_directory(corp_directory().fail_searches_at("ou=groups,dc=corp,dc=example"));
    let mut conn = env.connection()?;

    let tree = TreeBuilder::new(3, DisplayMode::Full).build_tree(&mut conn)?;

    let groups = &tree.children[1];
    assert!(!groups.has_children);
    assert!(groups.children.is_empty());
    assert_eq!(tree.children[0].children.len(), 2);
    assert_eq!(tree.children[3].children.len(), 1);

    Ok(())
}

#[test]
fn test_each_build_is_independent() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;
    let builder = TreeBuilder::default();

    let mut first = builder.build_tree(&mut conn)?;
    let second = builder.build_tree(&mut conn)?;
    assert_eq!(first, second);

    first.children.clear();
    assert_eq!(second.children.len(), 4);

    let json = serde_json::to_value(&second)?;
    assert_eq!(json["children"][0]["has_children"], true);

    Ok(())
}
