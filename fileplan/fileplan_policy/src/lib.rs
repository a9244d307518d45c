//! # Fileplan Policy
//!
//! `fileplan_policy` guards method calls on the records repository. Each
//! guarded method carries an ordered list of security directives; the
//! [`EntryVoter`] reads the ones meant for it, resolves the nodes they test
//! from the call's arguments and asks the capability service whether the
//! current principal may proceed. Calls let through with `RM_QUERY` have
//! their results passed through the [`ResultFilter`], which drops what the
//! principal may not read.
//!
//! ## Crate Structure
//!
//! - **model**: Directives, invocations, returned values, entry policy names and votes
//! - **engine**: Argument resolution, entry policies, the voter and its audit,
//!   result filtering

pub mod engine;
pub mod model;

pub use engine::{Arguments, EntryVoter, Filtered, PolicyEvaluator, ResultFilter, VoteAudit};
pub use model::{
    Argument, ArgumentRef, Directive, EntryPolicy, FilterDirective, Invocation, Returned, Vote,
};
