/*! Integration tests for Binder.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - backend: Tests for the IdentityStore trait and its implementations
 * - identity: Tests for the identity data model
 * - service: Tests for IdentityService and ConsistencyService
 *
 * Set TEST_BACKEND=sqlite or TEST_BACKEND=postgres to run the store-backed
 * tests against a SQL database instead of InMemory.
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("binder=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod identity;
mod service;
