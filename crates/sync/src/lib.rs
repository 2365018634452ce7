//! The deferred-execution synchronization engine.
//!
//! Everything with a real temporal hazard lives here: the generic
//! [`DeferredExecutor`] debounce primitive, the [`ExtraDataSynchronizer`]
//! that autosaves annotation edits without dropping or over-sending them,
//! the [`FileNavigator`] that hides file-preview latency behind deferred
//! triggers, and the [`RecordBrowser`] that orchestrates a record switch.

pub mod browser;
pub mod deferred;
pub mod navigator;
pub mod synchronizer;

pub use browser::RecordBrowser;
pub use deferred::DeferredExecutor;
pub use navigator::FileNavigator;
pub use synchronizer::ExtraDataSynchronizer;
