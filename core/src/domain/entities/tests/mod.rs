//! Tests for domain entities

mod entity_tests;
