//! Integration tests for the full generation pipeline.
//!
//! These exercise the engine from prompt text through to decoded output,
//! using deterministic forward-pass doubles. All tests are CPU-only with
//! tiny vocabularies.

use std::sync::Arc;

use nexus_core::engine::{Engine, FinishReason, GenerateOptions};
use nexus_core::frame::{BEGIN_PIECE, TERMINATOR_PIECE};
use nexus_core::sampling::SamplingParams;
use nexus_core::testing::{MockForwardPass, SequencedForwardPass};
use nexus_core::tokenizer::TokenizerWrapper;

const VOCAB: usize = 32;
// for_testing adds `hello` plus four specials on top of t0..tN.
const MOCK_VOCAB: usize = VOCAB + 8;

fn greedy_opts(max_window: usize) -> GenerateOptions {
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
fn tokenizer_roundtrip_hello() {
    let tok = TokenizerWrapper::for_testing(VOCAB);
    let ids = tok.encode("hello").unwrap();
    assert_eq!(tok.decode(&ids).unwrap(), "hello");
}

#[test]
fn terminator_at_first_step_stops_generation_immediately() {
    let tok = Arc::new(TokenizerWrapper::for_testing(VOCAB));
    let terminator = tok.special_id(TERMINATOR_PIECE).unwrap();
    let forward = Arc::new(SequencedForwardPass::new(vec![terminator], MOCK_VOCAB));
    let engine = Engine::new(forward.clone(), tok).unwrap();

    let output = engine.generate("hello", &greedy_opts(128)).unwrap();
    assert_eq!(output.finish_reason, FinishReason::Stop);
    assert_eq!(forward.calls(), 1);
}

#[test]
fn loop_halts_within_half_the_window_for_any_window() {
    for max_window in [2, 3, 4, 7, 16, 33] {
        let forward = Arc::new(SequencedForwardPass::new(vec![3], MOCK_VOCAB));
        let tok = Arc::new(TokenizerWrapper::for_testing(VOCAB));
        let engine = Engine::new(forward.clone(), tok).unwrap();

        let output = engine.generate("t1 t2 t3", &greedy_opts(max_window)).unwrap();
        assert_eq!(output.finish_reason, FinishReason::Length);
        assert_eq!(
            forward.calls(),
            max_window / 2,
            "wrong step count for window {max_window}"
        );
    }
}

#[test]
fn every_forward_pass_sees_a_bounded_context() {
    let forward = Arc::new(SequencedForwardPass::new(vec![3], MOCK_VOCAB));
    let tok = Arc::new(TokenizerWrapper::for_testing(VOCAB));
    let engine = Engine::new(forward.clone(), tok).unwrap();

    let max_window = 5;
    engine
        .generate("t1 t2 t3 t4 t5 t6 t7 t8", &greedy_opts(max_window))
        .unwrap();
    let lengths = forward.seen_lengths();
    assert!(!lengths.is_empty());
    assert!(lengths.iter().all(|&len| len > 0 && len <= max_window));
}

#[test]
fn generated_text_is_the_response_span_only() {
    // The prompt framing must not leak into the decoded response: the
    // span starts at the BEGIN that opens the generation slot.
    let tok = Arc::new(TokenizerWrapper::for_testing(VOCAB));
    let terminator = tok.special_id(TERMINATOR_PIECE).unwrap();
    let hello = tok.encode("hello").unwrap()[0];
    let forward = Arc::new(SequencedForwardPass::new(
        vec![hello, 4, terminator],
        MOCK_VOCAB,
    ));
    let engine = Engine::new(forward, tok).unwrap();

    let text = engine.process("t1 t2", &greedy_opts(128)).unwrap();
    assert_eq!(text, "hello t4");
}

#[test]
fn unterminated_generation_still_decodes() {
    let forward = Arc::new(SequencedForwardPass::new(vec![4, 5, 6], MOCK_VOCAB));
    let tok = Arc::new(TokenizerWrapper::for_testing(VOCAB));
    let engine = Engine::new(forward, tok).unwrap();

    // Window 8 gives a budget of 4 steps and no terminator is ever
    // favored, so the full untrimmed context decodes: prompt echo plus
    // the generated tail.
    let text = engine.process("t1", &greedy_opts(8)).unwrap();
    assert_eq!(text, "t1 t4 t5 t6 t6");
}

#[test]
fn span_rebinding_survives_a_begin_sampled_mid_generation() {
    let tok = Arc::new(TokenizerWrapper::for_testing(VOCAB));
    let terminator = tok.special_id(TERMINATOR_PIECE).unwrap();
    let begin = tok.special_id(BEGIN_PIECE).unwrap();
    let forward = Arc::new(SequencedForwardPass::new(
        vec![4, begin, 5, terminator],
        MOCK_VOCAB,
    ));
    let engine = Engine::new(forward, tok).unwrap();

    let output = engine.generate("t1", &greedy_opts(128)).unwrap();
    assert_eq!(output.finish_reason, FinishReason::Stop);
    // Rebound at the generated BEGIN, not the framing one.
    assert_eq!(output.tokens, vec![begin, 5, terminator]);
}

#[test]
fn uniform_logits_sample_inside_the_vocabulary() {
    let forward = Arc::new(MockForwardPass::uniform(MOCK_VOCAB));
    let tok = Arc::new(TokenizerWrapper::for_testing(VOCAB));
    let engine = Engine::new(forward, tok).unwrap();

    let options = GenerateOptions {
        max_window: 32,
        sampling: SamplingParams {
            temperature: 2.0,
            top_k: MOCK_VOCAB,
        },
        seed: Some(1234),
    };
    let output = engine.generate("t1 t2", &options).unwrap();
    assert!(output
        .tokens
        .iter()
        .all(|&t| (t as usize) < MOCK_VOCAB));
}
