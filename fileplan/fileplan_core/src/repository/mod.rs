//! Repository fixtures.
//!
//! An in-memory repository implementing every collaborator trait, used by
//! the test suites and by hosts embedding the engine without a backing
//! store.

pub mod memory;

pub use memory::{InMemoryRepository, EVERYONE};
