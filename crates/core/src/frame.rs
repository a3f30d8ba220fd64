//! Prompt framing: building the initial context from request text and
//! decoding the terminal context back to text.
//!
//! The fixed framing `[BEGIN] prompt [END, SEPARATOR, BEGIN]` signals to
//! the model "here is the input, now generate after a fresh BEGIN".

use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::tokenizer::TokenizerWrapper;

pub const BEGIN_PIECE: &str = "<|BEGIN|>";
pub const END_PIECE: &str = "<|END|>";
pub const SEPARATOR_PIECE: &str = "<|SEPARATOR|>";
/// The generation stop signal. In the shipped tokenizer artifact this is
/// the SentencePiece end-of-sequence piece.
pub const TERMINATOR_PIECE: &str = "</s>";

/// Framing token ids, resolved once at engine construction and immutable
/// for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub begin: u32,
    pub end: u32,
    pub separator: u32,
    pub terminator: u32,
}

impl SpecialTokens {
    /// Resolve all framing tokens by name.
    ///
    /// # Errors
    /// [`crate::error::CoreError::UnknownSpecialToken`] if the tokenizer
    /// vocabulary lacks any of them — the service must refuse to start
    /// rather than run with undefined special tokens.
    pub fn resolve(tokenizer: &TokenizerWrapper) -> Result<Self> {
        Ok(Self {
            begin: tokenizer.special_id(BEGIN_PIECE)?,
            end: tokenizer.special_id(END_PIECE)?,
            separator: tokenizer.special_id(SEPARATOR_PIECE)?,
            terminator: tokenizer.special_id(TERMINATOR_PIECE)?,
        })
    }
}

/// Sits at the boundary between the decoding loop and the external
/// tokenizer service.
#[derive(Debug)]
pub struct PromptFramer {
    tokenizer: Arc<TokenizerWrapper>,
    special: SpecialTokens,
}

impl PromptFramer {
    /// # Errors
    /// Fails when any special token is missing from the vocabulary.
    pub fn new(tokenizer: Arc<TokenizerWrapper>) -> Result<Self> {
        let special = SpecialTokens::resolve(&tokenizer)?;
        Ok(Self { tokenizer, special })
    }

    #[must_use]
    pub fn special(&self) -> SpecialTokens {
        self.special
    }

    /// Build the initial context: `[BEGIN] + encode(prompt) + [END,
    /// SEPARATOR, BEGIN]`. No prompt validation happens here; arbitrary
    /// text is accepted and an empty prompt yields the minimal framing.
    ///
    /// # Errors
    /// [`crate::error::CoreError::Tokenization`] if encoding fails.
    pub fn frame(&self, prompt: &str) -> Result<Context> {
        let encoded = self.tokenizer.encode(prompt)?;
        let mut tokens = Vec::with_capacity(encoded.len() + 4);
        tokens.push(self.special.begin);
        tokens.extend_from_slice(&encoded);
        tokens.push(self.special.end);
        tokens.push(self.special.separator);
        tokens.push(self.special.begin);
        Ok(Context::new(tokens))
    }

    /// Decode the terminal token sequence back to text.
    ///
    /// # Errors
    /// [`crate::error::CoreError::Decode`] if the tokenizer rejects the id
    /// sequence.
    pub fn extract(&self, tokens: &[u32]) -> Result<String> {
        self.tokenizer.decode(tokens)
    }
}
