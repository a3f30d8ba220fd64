//! ONNX-backed forward pass: the production adapter to the loaded model.
//!
//! Binds the decoding loop to the exported graph artifact: token ids go in
//! as a `[1, len]` i64 tensor named `input`, and the `logits` output comes
//! back as one row per position.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_onnx::onnx::ModelProto;

use crate::error::{CoreError, Result};
use crate::forward::{ForwardPass, LogitMatrix};

const INPUT_NAME: &str = "input";
const OUTPUT_NAME: &str = "logits";

/// Forward pass over an ONNX graph, evaluated on CPU.
///
/// Thread safety: the parsed graph is read-only and every evaluation
/// allocates its own intermediate state, so concurrent [`ForwardPass::run`]
/// calls on one instance are safe without external locking.
pub struct OnnxForwardPass {
    model: ModelProto,
}

impl OnnxForwardPass {
    /// Parse the graph artifact from disk.
    ///
    /// # Errors
    /// Returns an error if the file is missing or not a valid ONNX graph.
    /// Construction-time failure: the service refuses to start.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let model = candle_onnx::read_file(path)
            .map_err(|e| anyhow::anyhow!("model load ({}): {e}", path.display()))?;
        Ok(Self { model })
    }
}

impl ForwardPass for OnnxForwardPass {
    fn run(&self, context: &[u32]) -> Result<LogitMatrix> {
        let ids: Vec<i64> = context.iter().map(|&t| i64::from(t)).collect();
        let len = ids.len();
        let input = Tensor::from_vec(ids, (1, len), &Device::Cpu)
            .map_err(|e| CoreError::Inference(e.to_string()))?;

        let mut inputs = HashMap::new();
        inputs.insert(INPUT_NAME.to_string(), input);
        let mut outputs = candle_onnx::simple_eval(&self.model, inputs)
            .map_err(|e| CoreError::Inference(e.to_string()))?;
        let logits = outputs
            .remove(OUTPUT_NAME)
            .ok_or_else(|| CoreError::Inference(format!("graph has no '{OUTPUT_NAME}' output")))?;

        // Exported graphs emit [1, len, vocab]; accept [len, vocab] too.
        let logits = match logits.dims() {
            &[1, _, _] => logits
                .squeeze(0)
                .map_err(|e| CoreError::Inference(e.to_string()))?,
            &[_, _] => logits,
            dims => {
                return Err(CoreError::Inference(format!(
                    "unexpected logits shape {dims:?}"
                )))
            }
        };
        let rows = logits
            .to_dtype(DType::F32)
            .and_then(|t| t.to_vec2::<f32>())
            .map_err(|e| CoreError::Inference(e.to_string()))?;
        LogitMatrix::from_rows(rows)
    }
}
