//! Tests for crate-root types.
