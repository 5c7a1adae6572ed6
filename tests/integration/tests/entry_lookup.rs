//! Single entry lookup tests.

use lcp_directory::{ConnectionState, FilterConfig, LdapError};
use pretty_assertions::assert_eq;

use crate::common::{corp_directory, TestEnv};

const JDOE: &str = "uid=jdoe,ou=people,dc=corp,dc=example";

#[test]
fn test_entry_is_filtered_and_sorted() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?.with_filters(
        FilterConfig::new()
            .hide_object_classes(["top"])
            .hide_attributes(["userPassword"]),
    );

    let entry = conn.get_entry(JDOE)?.expect("jdoe exists");

    let names: Vec<&str> = entry.attributes.keys().map(String::as_str).collect();
    assert_eq!(names, ["cn", "jpegPhoto", "mail", "objectClass", "sn", "uid"]);
    assert_eq!(
        entry.object_classes(),
        ["person", "inetOrgPerson", "posixAccount"]
    );
    assert_eq!(
        entry.get_attrs("mail").unwrap_or_default(),
        ["jdoe@corp.example", "john.doe@corp.example"]
    );
    assert_eq!(entry.get_attr("jpegPhoto"), Some("<binary: ffd8ffe0>"));

    Ok(())
}

#[test]
fn test_missing_entry() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;

    assert!(conn.get_entry("uid=ghost,ou=people,dc=corp,dc=example")?.is_none());

    Ok(())
}

#[test]
fn test_duplicate_answer_is_a_protocol_violation() -> anyhow::Result<()> {
    let env = TestEnv::with_directory(corp_directory().duplicate_entry(JDOE));
    let mut conn = env.connection()?;

    let err = conn.get_entry(JDOE).unwrap_err();
    assert!(matches!(err, LdapError::ProtocolViolation(_)));

    Ok(())
}

#[test]
fn test_lookup_reconnects_after_disconnect() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?;

    conn.connect()?;
    conn.disconnect();
    conn.disconnect();
    assert_eq!(conn.state(), ConnectionState::Closed);

    assert!(conn.get_entry(JDOE)?.is_some());
    assert_eq!(conn.state(), ConnectionState::Connected);

    Ok(())
}

#[test]
fn test_lookup_without_auto_connect() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut conn = env.connection()?.auto_connect(false);

    assert!(matches!(conn.get_entry(JDOE), Err(LdapError::NotConnected)));
    assert_eq!(env.directory.search_count(), 0);

    Ok(())
}
