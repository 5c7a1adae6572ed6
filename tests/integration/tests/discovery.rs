//! Base DN discovery and connection failure tests.

use lcp_directory::{
    ConnectionManager, DisplayMode, Entry, InMemoryDirectory, LdapConfig, LdapError,
    SearchScope, TreeBuilder,
};
use pretty_assertions::assert_eq;

use crate::common::{corp_entries, TestEnv, BASE_DN};

fn anonymous(env: &TestEnv) -> anyhow::Result<ConnectionManager<InMemoryDirectory>> {
    let config = LdapConfig::builder()
        .uri("ldap://ldap.corp.example")
        .build()?;
    Ok(ConnectionManager::with_connector(config, env.directory.clone()))
}

#[test]
fn test_naming_contexts_short_circuit() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;

    assert_eq!(conn.base_dn()?, BASE_DN);

    let calls = env.directory.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].base_dn, "");
    assert_eq!(calls[0].scope, SearchScope::Base);

    Ok(())
}

#[test]
fn test_root_dse_only() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(
        InMemoryDirectory::new().with_naming_contexts(&["dc=corp,dc=example", "o=netscaperoot"]),
    );
    let mut conn = env.connection()?;

    assert_eq!(conn.base_dn()?, "dc=corp,dc=example");

    Ok(())
}

#[test]
fn test_bind_dn_components_without_root_dse() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(corp_entries(InMemoryDirectory::new()));
    let mut conn = env.connection()?;

    assert_eq!(conn.base_dn()?, BASE_DN);

    // root DSE, empty-base one-level search, bind DN probe
    let calls = env.directory.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].filter, "(dc=*)");
    assert_eq!(calls[2].base_dn, BASE_DN);

    Ok(())
}

#[test]
fn test_top_level_domain_search() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(
        InMemoryDirectory::new()
            .allow_empty_base_searches(true)
            .with_entry(Entry::new("o=ignored").with_attribute("o", ["ignored"]))
            .with_entry(Entry::new("dc=intranet").with_attribute("dc", ["intranet"])),
    );
    let mut conn = anonymous(&env)?;

    assert_eq!(conn.base_dn()?, "dc=intranet");

    Ok(())
}

#[test]
fn test_top_level_search_finds_multi_component_suffix() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(corp_entries(
        InMemoryDirectory::new().allow_empty_base_scope(SearchScope::OneLevel, true),
    ));
    let mut conn = anonymous(&env)?;

    assert_eq!(conn.base_dn()?, BASE_DN);

    let last = env.directory.calls().pop().expect("at least one search");
    assert_eq!(last.scope, SearchScope::OneLevel);
    assert_eq!(last.filter, "(dc=*)");

    Ok(())
}

#[test]
fn test_shortest_subtree_dn() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(corp_entries(
        InMemoryDirectory::new().allow_empty_base_scope(SearchScope::Subtree, true),
    ));
    let mut conn = anonymous(&env)?;

    assert_eq!(conn.base_dn()?, BASE_DN);

    let calls = env.directory.calls();
    assert!(calls
        .iter()
        .any(|call| call.scope == SearchScope::OneLevel && call.base_dn.is_empty()));
    let last = calls.last().expect("at least one search");
    assert_eq!(last.scope, SearchScope::Subtree);

    Ok(())
}

#[test]
fn test_well_known_defaults() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(
        InMemoryDirectory::new()
            .with_entry(Entry::new("dc=local").with_attribute("dc", ["local"]))
            .with_entry(Entry::new("dc=test,dc=com").with_attribute("dc", ["test"])),
    );
    let mut conn = anonymous(&env)?;

    assert_eq!(conn.base_dn()?, "dc=test,dc=com");

    Ok(())
}

#[test]
fn test_discovery_exhausted() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(InMemoryDirectory::new());
    let mut conn = env.connection()?;

    let err = conn.base_dn().unwrap_err();
    assert!(matches!(err, LdapError::BaseDnNotFound { ref attempted } if attempted.len() == 6));
    assert!(err.to_string().contains("Please specify it explicitly"));

    let err = TreeBuilder::default().build_tree(&mut conn).unwrap_err();
    assert!(matches!(err, LdapError::BaseDnNotFound { .. }));

    Ok(())
}

#[test]
fn test_configured_base_dn() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection_at("ou=people,dc=corp,dc=example")?;

    assert_eq!(conn.base_dn()?, "ou=people,dc=corp,dc=example");
    assert_eq!(env.directory.search_count(), 0);

    let tree = TreeBuilder::new(1, DisplayMode::Full).build_tree(&mut conn)?;
    assert_eq!(tree.children.len(), 2);
    assert!(env
        .directory
        .calls()
        .iter()
        .all(|call| !call.base_dn.is_empty()));

    Ok(())
}

#[test]
fn test_bind_failures_are_distinguishable() -> anyhow::Result<()> {
    let env =
        TestEnv::with_directory(InMemoryDirectory::new().reject_bind(49, "Invalid credentials"));
    let mut conn = env.connection()?;
    let err = conn.connect().unwrap_err();
    assert!(err.is_auth_error());
    assert!(err.to_string().contains("Invalid credentials"));

    let env = TestEnv::with_directory(
        InMemoryDirectory::new().unreachable("Can't contact LDAP server"),
    );
    let mut conn = env.connection()?;
    let err = conn.base_dn().unwrap_err();
    assert!(err.is_connection_error());
    assert!(err.hint().is_some());

    Ok(())
}
