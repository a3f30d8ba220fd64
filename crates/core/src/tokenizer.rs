//! Adapter over the external tokenizer service.
//!
//! Wraps a `tokenizers` artifact behind the three operations the engine
//! needs: text → ids, ids → text, and name → special-token id. The
//! artifact format is owned entirely by the tokenizer side; nothing here
//! inspects it.

use std::path::Path;

use tokenizers::Tokenizer;

use crate::error::{CoreError, Result};

#[derive(Debug)]
pub struct TokenizerWrapper {
    inner: Tokenizer,
}

impl TokenizerWrapper {
    /// Load a tokenizer artifact from disk.
    ///
    /// # Errors
    /// Returns an error if the file is missing or not a valid tokenizer
    /// artifact. Construction-time failure: the service refuses to start.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let inner =
            Tokenizer::from_file(path).map_err(|e| anyhow::anyhow!("tokenizer load: {e}"))?;
        Ok(Self { inner })
    }

    /// Word-level tokenizer double for tests: tokens `t0..tN`, the literal
    /// word `hello`, and the four framing specials registered as special
    /// tokens (skipped on decode).
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_testing(vocab_size: usize) -> Self {
        use tokenizers::models::wordlevel::WordLevel;
        use tokenizers::pre_tokenizers::whitespace::Whitespace;
        use tokenizers::AddedToken;

        use crate::frame;

        let mut vocab = ahash::AHashMap::new();
        for i in 0..vocab_size {
            vocab.insert(format!("t{i}"), i as u32);
        }
        vocab.insert("hello".to_string(), vocab_size as u32);
        let model = WordLevel::builder()
            .vocab(vocab)
            .unk_token("t0".into())
            .build()
            .expect("build test tokenizer model");
        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Some(Whitespace {}));
        tokenizer.add_special_tokens(&[
            AddedToken::from(frame::BEGIN_PIECE, true),
            AddedToken::from(frame::END_PIECE, true),
            AddedToken::from(frame::SEPARATOR_PIECE, true),
            AddedToken::from(frame::TERMINATOR_PIECE, true),
        ]);
        Self { inner: tokenizer }
    }

    /// Test double whose vocabulary lacks the framing specials, for
    /// exercising the refuse-to-start path.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_testing_without_specials(vocab_size: usize) -> Self {
        use tokenizers::models::wordlevel::WordLevel;
        use tokenizers::pre_tokenizers::whitespace::Whitespace;

        let mut vocab = ahash::AHashMap::new();
        for i in 0..vocab_size {
            vocab.insert(format!("t{i}"), i as u32);
        }
        let model = WordLevel::builder()
            .vocab(vocab)
            .unk_token("t0".into())
            .build()
            .expect("build test tokenizer model");
        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Some(Whitespace {}));
        Self { inner: tokenizer }
    }

    /// Encode arbitrary text into token ids. Empty text is legal and
    /// yields an empty sequence.
    ///
    /// # Errors
    /// [`CoreError::Tokenization`] if the underlying tokenizer fails.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| CoreError::Tokenization(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Decode token ids back to text, skipping special tokens.
    ///
    /// # Errors
    /// [`CoreError::Decode`] if the tokenizer rejects the id sequence.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| CoreError::Decode(e.to_string()))
    }

    /// Resolve a special token by its piece name.
    ///
    /// # Errors
    /// [`CoreError::UnknownSpecialToken`] if the vocabulary lacks the name.
    pub fn special_id(&self, name: &str) -> Result<u32> {
        self.inner
            .token_to_id(name)
            .ok_or_else(|| CoreError::UnknownSpecialToken(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame;

    #[test]
    fn encode_decode_roundtrip() {
        let tok = TokenizerWrapper::for_testing(16);
        let ids = tok.encode("hello").unwrap();
        assert_eq!(ids.len(), 1);
        let decoded = tok.decode(&ids).unwrap();
        assert_eq!(decoded, "hello");
    }

    #[test]
    fn encode_empty_text_yields_no_ids() {
        let tok = TokenizerWrapper::for_testing(16);
        let ids = tok.encode("").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn special_tokens_resolve_to_distinct_ids() {
        let tok = TokenizerWrapper::for_testing(16);
        let begin = tok.special_id(frame::BEGIN_PIECE).unwrap();
        let end = tok.special_id(frame::END_PIECE).unwrap();
        let sep = tok.special_id(frame::SEPARATOR_PIECE).unwrap();
        let term = tok.special_id(frame::TERMINATOR_PIECE).unwrap();
        let mut ids = vec![begin, end, sep, term];
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn missing_special_token_is_reported_by_name() {
        let tok = TokenizerWrapper::for_testing(16);
        let err = tok.special_id("<|NO_SUCH_PIECE|>").unwrap_err();
        match err {
            CoreError::UnknownSpecialToken(name) => assert_eq!(name, "<|NO_SUCH_PIECE|>"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_skips_special_tokens() {
        let tok = TokenizerWrapper::for_testing(16);
        let begin = tok.special_id(frame::BEGIN_PIECE).unwrap();
        let term = tok.special_id(frame::TERMINATOR_PIECE).unwrap();
        let hello = tok.encode("hello").unwrap()[0];
        let text = tok.decode(&[begin, hello, term]).unwrap();
        assert_eq!(text, "hello");
    }
}
