//! Autoregressive decoding engine for the nexus text-generation service.
//!
//! The [`engine::Engine`] owns the decoding loop; the forward-pass and
//! tokenizer services it depends on live behind [`forward::ForwardPass`]
//! and [`tokenizer::TokenizerWrapper`], with production adapters in
//! [`onnx`] and [`tokenizer`].

pub mod context;
pub mod engine;
pub mod error;
pub mod forward;
pub mod frame;
pub mod onnx;
pub mod sampling;
pub mod stop;
pub mod tokenizer;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
