//! Reinhardt Reactive - observable values for client-side applications
//!
//! This crate provides the single-value reactive cell used by the Reinhardt
//! client-side router to publish its current location, parameters and mounted
//! views. Signals are single-threaded and cheap to clone.
//!
//! - [`Signal`]: read/write cell with change subscription
//! - [`ReadSignal`]: read-only view handed to observers
//! - [`WatchHandle`]: removes a watcher registered with `watch`

#![warn(missing_docs)]

pub mod signal;

pub use signal::{ReadSignal, Signal, SignalId, WatchHandle};
