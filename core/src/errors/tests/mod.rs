//! Tests for the error taxonomy
