//! Identity data model integration tests
