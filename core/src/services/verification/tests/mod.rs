//! Tests for the verification workflow

mod helpers;
