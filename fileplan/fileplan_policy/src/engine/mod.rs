//! Entry voting engine.
//!
//! This module resolves invocation arguments, evaluates entry policies and
//! votes on guarded calls, then filters what the calls return.

mod arguments;
mod audit;
mod filter;
mod policies;
mod voter;

pub use arguments::Arguments;
pub use audit::VoteAudit;
pub use filter::{Filtered, ResultFilter};
pub use policies::PolicyEvaluator;
pub use voter::EntryVoter;
