//! Shopdash store: the two cache tiers in front of the summary fetch.
//!
//! - [`Memo`] coalesces calls within one request: every caller for a key
//!   awaits the same shared future, and the result is kept until the memo
//!   is dropped with the request.
//! - [`TtlCache`] is shared across requests: values expire after a fixed
//!   window and can be dropped early by tag.

#![forbid(unsafe_code)]

mod memo;
mod ttl;

pub use memo::{Memo, SharedResult};
pub use ttl::{Ticket, TtlCache};
