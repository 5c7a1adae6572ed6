//! End-to-End Integration Tests
//!
//! These tests drive the directory engine against an in-memory directory
//! that answers like a real server: scoped searches, "no such object" for
//! missing bases and scripted failures.

mod common;
mod browse_tree;
mod discovery;
mod entry_lookup;
mod saved_views;
