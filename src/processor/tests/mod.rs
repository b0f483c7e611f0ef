//! Integration tests for the processor module
//!
//! Tests the extract, transform and flat-file load phases against source
//! directories built in temporary directories. Phases that need a live
//! database are covered by the crate-level integration tests.
