//! Common test utilities and fixtures.

use lcp_directory::{ConnectionManager, Entry, InMemoryDirectory, LdapConfig, RawEntry};

/// Base DN of the fixture directory.
pub const BASE_DN: &str = "dc=corp,dc=example";

/// Bind DN used by the tests.
pub const BIND_DN: &str = "cn=admin,dc=corp,dc=example";

/// Test environment wrapping a scripted directory.
pub struct TestEnv {
    /// The directory every connection talks to. Clones share call records.
    pub directory: InMemoryDirectory,
}

impl TestEnv {
    /// Creates an environment over the standard fixture directory.
    pub fn new() -> Self {
        Self::with_directory(corp_directory())
    }

    /// Creates an environment over a custom directory.
    pub fn with_directory(directory: InMemoryDirectory) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("lcp_directory=debug")
            .with_test_writer()
            .try_init();

        Self { directory }
    }

    /// Connection settings, discovering the base DN when `base_dn` is empty.
    pub fn config(&self, base_dn: &str) -> anyhow::Result<LdapConfig> {
        Ok(LdapConfig::builder()
            .uri("ldap://ldap.corp.example:389")
            .bind_dn(BIND_DN)
            .bind_password("secret")
            .base_dn(base_dn)
            .build()?)
    }

    /// An unconnected manager with base DN discovery.
    pub fn connection(&self) -> anyhow::Result<ConnectionManager<InMemoryDirectory>> {
        self.connection_at("")
    }

    /// An unconnected manager with a fixed base DN.
    pub fn connection_at(
        &self,
        base_dn: &str,
    ) -> anyhow::Result<ConnectionManager<InMemoryDirectory>> {
        Ok(ConnectionManager::with_connector(
            self.config(base_dn)?,
            self.directory.clone(),
        ))
    }
}

fn entry(dn: &str, classes: &[&str]) -> Entry {
    Entry::new(dn).with_attribute("objectClass", classes.iter().copied())
}

/// A small company directory.
///
/// ```text
/// dc=corp,dc=example
/// ├── ou=people
/// │   ├── uid=jdoe
/// │   └── uid=asmith
/// ├── ou=groups
/// │   ├── cn=admins
/// │   └── cn=recent
/// ├── cn=admin
/// └── ou=services
///     └── ou=legacy
///         └── ou=archive
///             └── cn=old-app
/// ```
pub fn corp_directory() -> InMemoryDirectory {
    corp_entries(InMemoryDirectory::new().with_naming_contexts(&[BASE_DN]))
}

/// Adds the fixture entries to `directory`.
pub fn corp_entries(directory: InMemoryDirectory) -> InMemoryDirectory {
    directory
        .with_entry(
            entry(BASE_DN, &["top", "dcObject", "organization"])
                .with_attribute("dc", ["corp"])
                .with_attribute("o", ["Corp Example"]),
        )
        .with_entry(
            entry("ou=people,dc=corp,dc=example", &["top", "organizationalUnit"])
                .with_attribute("ou", ["people"]),
        )
        .with_entry(
            RawEntry::from(
                entry(
                    "uid=jdoe,ou=people,dc=corp,dc=example",
                    &["top", "person", "inetOrgPerson", "posixAccount"],
                )
                .with_attribute("uid", ["jdoe"])
                .with_attribute("cn", ["John Doe"])
                .with_attribute("sn", ["Doe"])
                .with_attribute("mail", ["jdoe@corp.example", "john.doe@corp.example"])
                .with_attribute("userPassword", ["{SSHA}c2VjcmV0"]),
            )
            .with_attribute("jpegPhoto", [vec![0xffu8, 0xd8, 0xff, 0xe0]]),
        )
        .with_entry(
            entry(
                "uid=asmith,ou=people,dc=corp,dc=example",
                &["top", "posixAccount"],
            )
            .with_attribute("uid", ["asmith"])
            .with_attribute("commonName", ["Alice Smith"]),
        )
        .with_entry(
            entry("ou=groups,dc=corp,dc=example", &["top", "organizationalUnit"])
                .with_attribute("ou", ["groups"]),
        )
        .with_entry(
            entry("cn=admins,ou=groups,dc=corp,dc=example", &["top", "groupOfUniqueNames"])
                .with_attribute("cn", ["admins"])
                .with_attribute("uniqueMember", ["uid=jdoe,ou=people,dc=corp,dc=example"]),
        )
        .with_entry(
            entry("cn=recent,ou=groups,dc=corp,dc=example", &["top", "groupOfURLs"])
                .with_attribute("cn", ["recent"]),
        )
        .with_entry(
            entry(BIND_DN, &["simpleSecurityObject", "organizationalRole"])
                .with_attribute("cn", ["admin"]),
        )
        .with_entry(
            entry("ou=services,dc=corp,dc=example", &["top", "organizationalUnit"])
                .with_attribute("ou", ["services"]),
        )
        .with_entry(entry(
            "ou=legacy,ou=services,dc=corp,dc=example",
            &["top", "organizationalUnit"],
        ))
        .with_entry(entry(
            "ou=archive,ou=legacy,ou=services,dc=corp,dc=example",
            &["top", "organizationalUnit"],
        ))
        .with_entry(entry(
            "cn=old-app,ou=archive,ou=legacy,ou=services,dc=corp,dc=example",
            &["top", "applicationProcess"],
        ))
}
