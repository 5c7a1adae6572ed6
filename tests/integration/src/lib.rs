//! End-to-end tests for the LDAP control panel live under `tests/`.
