//! Effectful side of implicit timers.
//!
//! This module is the "imperative shell" around the pure planning core:
//! it issues the planned cancel/arm requests to a timer store and routes
//! every failure to an error sink.
//!
//! # Key Concepts
//!
//! - **Processor**: `ImplicitTimers` runs once per machine step
//! - **Cancellation**: `CancelSignal` aborts in-flight store calls
//! - **Error sinks**: failures are reported, never propagated

mod cancel;
mod processor;
mod sink;

pub use cancel::{CancelHandle, CancelSignal};
pub use processor::ImplicitTimers;
pub use sink::{CollectingErrorSink, ErrorSink, ImplicitTimerError, TracingErrorSink};
