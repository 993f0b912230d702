#![forbid(unsafe_code)]

//! Test harness for the evlog crates.
//!
//! - [`FakeDocument`] - An undo engine with real stacks that notifies observers
//! - [`RecordingView`] - Wraps a view and records every call and signal
//! - [`Session`] - Document, log, view and controller wired together
//! - [`golden`] - Golden transcript files with `BLESS=1` regeneration

pub mod document;
pub mod golden;
pub mod recording;
pub mod session;

pub use document::FakeDocument;
pub use recording::{CallLog, Fault, RecordingView, ViewCall, ViewOp};
pub use session::{Session, SessionError, Snapshot};
