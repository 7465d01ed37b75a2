//! Service integration tests

mod consistency_tests;
mod identity_service_tests;
