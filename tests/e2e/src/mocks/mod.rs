//! Test data fixtures.

mod fixtures;

pub use fixtures::TestDataFactory;
