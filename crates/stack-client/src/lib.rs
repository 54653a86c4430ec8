//! Client-side view of the workspace: a latency-simulating transport over
//! the store, session state for the UI, and content formatting.

pub mod format;
pub mod replies;
pub mod transport;
pub mod workspace;
