//! Entry voting model.
//!
//! This module defines directives, invocations, returned values and votes.

pub mod directive;
pub mod filter;
pub mod invocation;
pub mod policy;
pub mod vote;

pub use directive::{ArgumentRef, Directive};
pub use filter::{FilterDirective, Returned, FILTER_NODE};
pub use invocation::{Argument, Invocation};
pub use policy::EntryPolicy;
pub use vote::Vote;
