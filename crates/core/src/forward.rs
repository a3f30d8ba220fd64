//! Boundary to the external forward-pass service.
//!
//! The service maps a token-id sequence to one logit row per input
//! position. Only the final row matters for next-token prediction, but the
//! full matrix is what the underlying runtimes return, so the boundary
//! carries it and exposes [`LogitMatrix::last_position`].

use crate::error::{CoreError, Result};

/// Handle to the loaded model, injected into the engine at construction.
///
/// One instance is a process-wide resource shared by every concurrent
/// decoding-loop invocation, so implementations must be safe for concurrent
/// `run` calls. A wrapped runtime that does not guarantee thread-safe
/// inference on a single session must serialize access internally (a mutex
/// around the call, or a work queue) — silent data races in tensor
/// execution produce wrong answers rather than crashes.
pub trait ForwardPass: Send + Sync {
    /// Run one forward pass over the full context.
    ///
    /// # Errors
    /// [`CoreError::Inference`] on any internal runtime error.
    fn run(&self, context: &[u32]) -> Result<LogitMatrix>;
}

/// Dense per-position logits: `num_positions` rows of `vocab_size` values.
/// Lives only for the duration of one decoding step.
#[derive(Debug, Clone)]
pub struct LogitMatrix {
    data: Vec<f32>,
    num_positions: usize,
    vocab_size: usize,
}

impl LogitMatrix {
    /// Build a matrix from per-position rows.
    ///
    /// # Errors
    /// [`CoreError::Inference`] if the service returned no rows or rows of
    /// inconsistent width.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let num_positions = rows.len();
        let vocab_size = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| CoreError::Inference("forward pass returned no logit rows".into()))?;
        if vocab_size == 0 {
            return Err(CoreError::Inference(
                "forward pass returned an empty vocabulary row".into(),
            ));
        }
        let mut data = Vec::with_capacity(num_positions * vocab_size);
        for row in rows {
            if row.len() != vocab_size {
                return Err(CoreError::Inference(format!(
                    "ragged logit rows: expected width {vocab_size}, got {}",
                    row.len()
                )));
            }
            data.extend_from_slice(&row);
        }
        Ok(Self {
            data,
            num_positions,
            vocab_size,
        })
    }

    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.num_positions
    }

    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// The logit row for the last context position — the next-token
    /// distribution before shaping.
    #[must_use]
    pub fn last_position(&self) -> &[f32] {
        &self.data[(self.num_positions - 1) * self.vocab_size..]
    }
}
