//! Tests for the session service

mod refresh_tests;
mod service_tests;
