//! Deterministic test doubles for the external forward-pass service.

mod mock_forward;

pub use mock_forward::{FailingForwardPass, MockForwardPass, SequencedForwardPass};
