//! The autoregressive decoding loop.
//!
//! [`Engine`] drives one generation per call: frame the prompt, then per
//! step — enforce the context window, run the shared forward-pass service,
//! shape the last-position logits, sample, append — until the terminator
//! is sampled or the step budget runs out. The loop is synchronous and
//! single-threaded per request with no internal suspension points; the
//! serving layer dispatches concurrent invocations over one shared
//! [`Engine`].

use std::sync::Arc;

use crate::context::Context;
use crate::error::{CoreError, Result};
use crate::forward::ForwardPass;
use crate::frame::{PromptFramer, SpecialTokens};
use crate::sampling::{self, SamplerState, SamplingParams};
use crate::stop;
use crate::tokenizer::TokenizerWrapper;

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The terminator token was sampled.
    Stop,
    /// The step budget was exhausted without a terminator.
    Length,
}

/// Per-request generation options.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GenerateOptions {
    /// Maximum context length the forward-pass service consumes in one
    /// call. Must be at least 2; the step budget is `max_window / 2`,
    /// reserving the other half of the window for the echoed prompt
    /// framing.
    pub max_window: usize,
    pub sampling: SamplingParams,
    /// Explicit sampler seed. `None` seeds from process entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_window: 1024,
            sampling: SamplingParams::default(),
            seed: None,
        }
    }
}

impl GenerateOptions {
    /// Reject out-of-contract options before the first forward-pass call.
    ///
    /// # Errors
    /// [`CoreError::InvalidParameter`] on a window too small to allow a
    /// single step, or invalid sampling parameters.
    pub fn validate(&self) -> Result<()> {
        if self.max_window < 2 {
            return Err(CoreError::InvalidParameter(format!(
                "max_window must be at least 2, got {}",
                self.max_window
            )));
        }
        self.sampling.validate()
    }
}

/// Terminal context of one generation, before decoding back to text.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// On [`FinishReason::Stop`]: the response span, from the most recent
    /// BEGIN through the terminator. On [`FinishReason::Length`]: the full
    /// context as accumulated, untrimmed.
    pub tokens: Vec<u32>,
    pub finish_reason: FinishReason,
}

/// The decoding orchestrator. Holds the injected forward-pass handle and
/// the prompt framer; creates no other state, so one instance serves every
/// request for the process lifetime.
pub struct Engine {
    forward: Arc<dyn ForwardPass>,
    framer: PromptFramer,
}

impl Engine {
    /// Construct the engine, resolving the framing special tokens.
    ///
    /// # Errors
    /// [`CoreError::UnknownSpecialToken`] if the tokenizer vocabulary
    /// lacks any framing token — callers must refuse to start serving.
    pub fn new(forward: Arc<dyn ForwardPass>, tokenizer: Arc<TokenizerWrapper>) -> Result<Self> {
        let framer = PromptFramer::new(tokenizer)?;
        Ok(Self { forward, framer })
    }

    #[must_use]
    pub fn special_tokens(&self) -> SpecialTokens {
        self.framer.special()
    }

    /// Run the decoding loop and return the terminal token context.
    ///
    /// # Errors
    /// Fail-fast: the first [`CoreError`] from parameter validation, the
    /// forward pass, or the tokenizer aborts the request. Nothing is
    /// retried.
    pub fn generate(&self, prompt: &str, opts: &GenerateOptions) -> Result<GenerationOutput> {
        opts.validate()?;
        let special = self.framer.special();
        let mut context = self.framer.frame(prompt)?;
        let mut sampler = SamplerState::new(opts.seed);
        let max_steps = opts.max_window / 2;
        let mut finish_reason = FinishReason::Length;
        let mut steps = 0usize;

        for _ in 0..max_steps {
            context = context.windowed(opts.max_window);
            let logits = self.forward.run(context.as_slice())?;
            let probs = sampling::shape(logits.last_position(), &opts.sampling)?;
            let next = sampling::sample(&probs, &mut sampler);
            context.push(next);
            steps += 1;

            if next == special.terminator {
                let span = stop::response_span(context.as_slice(), special.begin).to_vec();
                context = Context::new(span);
                finish_reason = FinishReason::Stop;
                break;
            }
        }

        tracing::debug!(
            steps,
            context_len = context.len(),
            finish_reason = ?finish_reason,
            "generation finished"
        );
        Ok(GenerationOutput {
            tokens: context.into_tokens(),
            finish_reason,
        })
    }

    /// Full request path: frame, generate, decode.
    ///
    /// # Errors
    /// Propagates any [`CoreError`] from the loop or the final decode.
    pub fn process(&self, prompt: &str, opts: &GenerateOptions) -> Result<String> {
        let output = self.generate(prompt, opts)?;
        self.framer.extract(&output.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingForwardPass, MockForwardPass, SequencedForwardPass};

    const VOCAB: usize = 32;

    fn engine(forward: Arc<dyn ForwardPass>) -> Engine {
        let tokenizer = Arc::new(TokenizerWrapper::for_testing(VOCAB));
        Engine::new(forward, tokenizer).unwrap()
    }

    fn opts(max_window: usize) -> GenerateOptions {
        GenerateOptions {
            max_window,
            sampling: SamplingParams {
                temperature: 1.0,
                top_k: 1,
            },
            seed: Some(0),
        }
    }

    #[test]
    fn immediate_terminator_stops_after_one_step() {
        let tokenizer = Arc::new(TokenizerWrapper::for_testing(VOCAB));
        let terminator = tokenizer.special_id(crate::frame::TERMINATOR_PIECE).unwrap();
        let forward = Arc::new(SequencedForwardPass::new(vec![terminator], VOCAB + 8));
        let engine = Engine::new(forward.clone(), tokenizer).unwrap();

        let output = engine.generate("hello", &opts(64)).unwrap();
        assert_eq!(output.finish_reason, FinishReason::Stop);
        assert_eq!(forward.calls(), 1);
        assert_eq!(output.tokens.last().copied(), Some(terminator));
        // Span rebound at the BEGIN that opens the response slot.
        assert_eq!(
            output.tokens.first().copied(),
            Some(engine.special_tokens().begin)
        );
        assert_eq!(output.tokens.len(), 2);
    }

    #[test]
    fn step_budget_bounds_the_loop() {
        // Favored token never terminates, so the loop must stop on its own
        // after exactly max_window / 2 steps.
        let forward = Arc::new(SequencedForwardPass::new(vec![7], VOCAB + 8));
        let engine = engine(forward.clone());

        let output = engine.generate("t1 t2", &opts(8)).unwrap();
        assert_eq!(output.finish_reason, FinishReason::Length);
        assert_eq!(forward.calls(), 4);
    }

    #[test]
    fn window_is_enforced_before_every_forward_pass() {
        let forward = Arc::new(SequencedForwardPass::new(vec![7], VOCAB + 8));
        let engine = engine(forward.clone());

        let max_window = 6;
        engine.generate("t1 t2 t3 t4 t5 t6", &opts(max_window)).unwrap();
        for len in forward.seen_lengths() {
            assert!(len <= max_window, "forward pass saw context of length {len}");
        }
    }

    #[test]
    fn window_smaller_than_prompt_is_lossy_not_fatal() {
        // Framed prompt is 11 tokens, window is 4: the front of the prompt
        // is discarded by design.
        let forward = Arc::new(SequencedForwardPass::new(vec![7], VOCAB + 8));
        let engine = engine(forward.clone());

        let output = engine.generate("t1 t2 t3 t4 t5 t6 t7", &opts(4)).unwrap();
        assert_eq!(output.finish_reason, FinishReason::Length);
        assert!(forward.seen_lengths().iter().all(|&len| len <= 4));
        assert_eq!(forward.calls(), 2);
        assert_eq!(output.tokens.len(), 5);
    }

    #[test]
    fn terminated_output_is_rebounded_to_the_response_span() {
        let tokenizer = Arc::new(TokenizerWrapper::for_testing(VOCAB));
        let terminator = tokenizer.special_id(crate::frame::TERMINATOR_PIECE).unwrap();
        let begin = tokenizer.special_id(crate::frame::BEGIN_PIECE).unwrap();
        let forward = Arc::new(SequencedForwardPass::new(
            vec![5, 9, terminator],
            VOCAB + 8,
        ));
        let engine = Engine::new(forward, tokenizer).unwrap();

        let output = engine.generate("t1", &opts(64)).unwrap();
        assert_eq!(output.finish_reason, FinishReason::Stop);
        assert_eq!(output.tokens, vec![begin, 5, 9, terminator]);
    }

    #[test]
    fn process_decodes_the_generated_continuation() {
        let tokenizer = Arc::new(TokenizerWrapper::for_testing(VOCAB));
        let terminator = tokenizer.special_id(crate::frame::TERMINATOR_PIECE).unwrap();
        let hello = tokenizer.encode("hello").unwrap()[0];
        let forward = Arc::new(SequencedForwardPass::new(
            vec![hello, terminator],
            VOCAB + 8,
        ));
        let engine = Engine::new(forward, tokenizer).unwrap();

        let text = engine.process("t3 t4", &opts(64)).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let forward = Arc::new(MockForwardPass::uniform(VOCAB + 8));
        let engine = engine(forward);
        let options = GenerateOptions {
            max_window: 16,
            sampling: SamplingParams {
                temperature: 1.0,
                top_k: VOCAB + 8,
            },
            seed: Some(99),
        };

        let a = engine.generate("t1 t2", &options).unwrap();
        let b = engine.generate("t1 t2", &options).unwrap();
        assert_eq!(a.tokens, b.tokens);
    }

    #[test]
    fn invalid_parameters_are_rejected_before_any_forward_pass() {
        let forward = Arc::new(FailingForwardPass);
        let engine = engine(forward);

        let mut options = opts(64);
        options.sampling.temperature = -1.0;
        let err = engine.generate("t1", &options).unwrap_err();
        // A forward-pass call would have surfaced Inference instead.
        assert!(matches!(err, CoreError::InvalidParameter(_)));
    }

    #[test]
    fn too_small_window_is_rejected() {
        let forward = Arc::new(FailingForwardPass);
        let engine = engine(forward);
        let err = engine.generate("t1", &opts(1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter(_)));
    }

    #[test]
    fn forward_pass_failure_aborts_the_request() {
        let forward = Arc::new(FailingForwardPass);
        let engine = engine(forward);
        let err = engine.generate("t1", &opts(64)).unwrap_err();
        assert!(matches!(err, CoreError::Inference(_)));
    }
}
