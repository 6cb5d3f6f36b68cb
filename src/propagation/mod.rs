//! Background refresh of cached recommendations.
//!
//! Registering a company submits a [`PropagationJob`] to a [`JobQueue`].
//! Workers hand it to the [`PropagationCoordinator`], which re-ranks every
//! other stored record and overwrites its cached list. Jobs are idempotent
//! overwrites, so at-least-once delivery is safe.

pub mod coordinator;
pub mod error;
pub mod queue;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use coordinator::PropagationCoordinator;
pub use error::{PropagationError, QueueError};
pub use queue::{JobHandler, JobQueue, TokioJobQueue};
pub use types::{PropagationJob, PropagationReport, RetryPolicy};

#[cfg(any(test, feature = "mock"))]
pub use mock::RecordingJobQueue;
