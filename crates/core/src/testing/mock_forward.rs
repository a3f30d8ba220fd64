//! Mock forward-pass services.
//!
//! Each double returns one logit row per input position so the engine sees
//! the same matrix shape a real runtime produces, without any model
//! computation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{CoreError, Result};
use crate::forward::{ForwardPass, LogitMatrix};

/// Returns the same logit row for every position on every call.
pub struct MockForwardPass {
    favored: Option<u32>,
    vocab_size: usize,
}

impl MockForwardPass {
    /// Strongly favor one token: +100 at `favored`, -100 elsewhere.
    #[must_use]
    pub fn favoring(favored: u32, vocab_size: usize) -> Self {
        Self {
            favored: Some(favored),
            vocab_size,
        }
    }

    /// All-zero logits: a uniform next-token distribution.
    #[must_use]
    pub fn uniform(vocab_size: usize) -> Self {
        Self {
            favored: None,
            vocab_size,
        }
    }

    fn row(&self) -> Vec<f32> {
        match self.favored {
            Some(favored) => {
                let mut row = vec![-100.0f32; self.vocab_size];
                row[favored as usize] = 100.0;
                row
            }
            None => vec![0.0f32; self.vocab_size],
        }
    }
}

impl ForwardPass for MockForwardPass {
    fn run(&self, context: &[u32]) -> Result<LogitMatrix> {
        let rows = context.iter().map(|_| self.row()).collect();
        LogitMatrix::from_rows(rows)
    }
}

/// Favors a scripted token per call: call `n` favors `script[n]`, and the
/// last entry repeats once the script is exhausted. Records call count and
/// the context length seen by each call.
pub struct SequencedForwardPass {
    script: Vec<u32>,
    vocab_size: usize,
    calls: AtomicUsize,
    seen_lengths: Mutex<Vec<usize>>,
}

impl SequencedForwardPass {
    /// # Panics
    /// Panics if the script is empty.
    #[must_use]
    pub fn new(script: Vec<u32>, vocab_size: usize) -> Self {
        assert!(!script.is_empty(), "script must favor at least one token");
        Self {
            script,
            vocab_size,
            calls: AtomicUsize::new(0),
            seen_lengths: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Context lengths observed by each forward pass, in call order.
    #[must_use]
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen_lengths.lock().expect("seen_lengths poisoned").clone()
    }
}

impl ForwardPass for SequencedForwardPass {
    fn run(&self, context: &[u32]) -> Result<LogitMatrix> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_lengths
            .lock()
            .expect("seen_lengths poisoned")
            .push(context.len());

        let favored = *self
            .script
            .get(call)
            .unwrap_or_else(|| self.script.last().expect("non-empty script"));
        let mut row = vec![-100.0f32; self.vocab_size];
        row[favored as usize] = 100.0;
        let rows = context.iter().map(|_| row.clone()).collect();
        LogitMatrix::from_rows(rows)
    }
}

/// Always fails, for exercising `InferenceFailure` propagation.
pub struct FailingForwardPass;

impl ForwardPass for FailingForwardPass {
    fn run(&self, _context: &[u32]) -> Result<LogitMatrix> {
        Err(CoreError::Inference("mock forward-pass failure".into()))
    }
}
