//! Integration tests for the liftlog client
//! These tests run the client against a mock HTTP server

pub mod test_harness;

pub mod endpoints_test;
pub mod persistence_test;
pub mod session_renewal_test;
