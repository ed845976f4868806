//! nodeguard - Safe inspection and mutation of coordination-store nodes
//!
//! Every write shows a diff, asks first, backs up what it replaces, and is
//! conditioned on the version it read.

pub mod backup;
pub mod cli;
pub mod codec;
pub mod diff;
pub mod format;
pub mod observability;
pub mod pipeline;
pub mod store;
