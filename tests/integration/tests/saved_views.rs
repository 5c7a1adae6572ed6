//! Saved view tests.

use lcp_directory::{run_view, SearchScope, ViewEntity, ViewProfile};
use pretty_assertions::assert_eq;

use crate::common::{corp_directory, TestEnv, BASE_DN};

#[test]
fn test_people_view() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;
    let profile = ViewProfile::new("(objectClass=posixAccount)", ["uid", "cn", "Mail"]);

    let view = run_view(&mut conn, &profile, "n/a")?;

    assert_eq!(view.columns, ["uid", "cn", "mail"]);
    assert_eq!(
        view.rows,
        [
            vec!["jdoe", "John Doe", "jdoe@corp.example"],
            vec!["asmith", "n/a", "n/a"],
        ]
    );

    let last = env.directory.calls().pop().expect("view search");
    assert_eq!(last.base_dn, BASE_DN);
    assert_eq!(last.scope, SearchScope::Subtree);
    assert_eq!(last.filter, "(objectClass=posixAccount)");

    Ok(())
}

#[test]
fn test_entity_view_under_configured_base() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection_at("ou=groups,dc=corp,dc=example")?;
    let groups = ViewEntity {
        ldap_filter: Some("(cn=*)".to_string()),
        ..ViewEntity::default()
    };

    let view = run_view(&mut conn, &groups.as_profile(), "-")?;

    assert_eq!(
        view.rows,
        [
            vec!["cn=admins,ou=groups,dc=corp,dc=example"],
            vec!["cn=recent,ou=groups,dc=corp,dc=example"],
        ]
    );

    Ok(())
}

#[test]
fn test_view_search_failure_is_empty() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(corp_directory().fail_searches_at(BASE_DN));
    let mut conn = env.connection()?;

    let view = run_view(&mut conn, &ViewProfile::new("(uid=*)", ["uid"]), "-")?;

    assert!(view.is_empty());
    assert_eq!(view.columns, ["uid"]);

    Ok(())
}
