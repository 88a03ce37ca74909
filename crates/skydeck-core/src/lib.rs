//! Core primitives for Skydeck.
//!
//! This crate provides the building blocks shared by the networking layer
//! and the console state machines:
//!
//! - **Signal/Slot System**: Type-safe observer notifications
//! - **Property System**: Values with change detection
//! - **Logging**: Target names, subscriber setup and perf spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use skydeck_core::Signal;
//!
//! let finished = Signal::<bool>::new();
//! let conn_id = finished.connect(|accepted| {
//!     println!("wizard finished, accepted = {}", accepted);
//! });
//! finished.emit(true);
//! finished.disconnect(conn_id);
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use logging::perf_span;
pub use property::Property;
pub use signal::{ConnectionId, Signal};
