//! Operation decoding and sequential dispatch.
//!
//! The dispatcher owns the logical clock. It moves the clock to each
//! operation's timestamp, routes the operation to the entity store or the
//! snapshot manager, and hands back the output, if any, in arrival order.

mod dispatcher;
mod operation;
mod output;

pub use dispatcher::{Dispatcher, LogicalClock};
pub use operation::{OpTag, Operation};
pub use output::Output;
