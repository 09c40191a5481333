//! Local embeddings using Candle (sentence-transformers compatible)

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use crate::error::EmbeddingError;

use super::traits::EmbeddingProviderTrait;

/// Default local model, the one the memory scripts were written against
pub const DEFAULT_LOCAL_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

fn unavailable(e: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::Unavailable(e.to_string())
}

fn inference(e: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::Request(e.to_string())
}

/// Cap encodings at the model's position table; longer inputs are cut
fn limit_sequence_length(tokenizer: &mut Tokenizer, max_length: usize) -> Result<(), EmbeddingError> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| unavailable(format!("failed to configure truncation: {}", e)))?;
    Ok(())
}

/// Run CPU-heavy work on the blocking pool so any runtime flavor keeps serving
async fn run_blocking<T, F>(work: F) -> Result<T, EmbeddingError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EmbeddingError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(inference)?
}

/// Local embedding provider using Candle
pub struct CandleEmbedding {
    model: Arc<LocalModel>,
    dimensions: usize,
}

struct LocalModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    normalize: bool,
}

impl CandleEmbedding {
    /// Load a BERT-family sentence embedding model
    ///
    /// `model_path` points at a directory holding `config.json`,
    /// `tokenizer.json` and `model.safetensors`; without it the files are
    /// fetched from the HuggingFace Hub.
    pub fn new(model_name: String, model_path: Option<String>) -> Result<Self, EmbeddingError> {
        info!("Loading local embedding model: {}", model_name);

        let device = Device::Cpu;

        let (config_path, tokenizer_path, weights_path) = if let Some(path) = model_path {
            let base = PathBuf::from(path);
            (
                base.join("config.json"),
                base.join("tokenizer.json"),
                base.join("model.safetensors"),
            )
        } else {
            let api = Api::new().map_err(unavailable)?;
            let repo = api.repo(Repo::new(model_name.clone(), RepoType::Model));

            let config = repo.get("config.json").map_err(unavailable)?;
            let tokenizer = repo.get("tokenizer.json").map_err(unavailable)?;
            let weights = repo
                .get("model.safetensors")
                .or_else(|_| repo.get("pytorch_model.bin"))
                .map_err(unavailable)?;

            (config, tokenizer, weights)
        };

        let config_content = std::fs::read_to_string(&config_path).map_err(unavailable)?;
        let config: BertConfig = serde_json::from_str(&config_content).map_err(unavailable)?;
        let dimensions = config.hidden_size;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| unavailable(format!("failed to load tokenizer: {}", e)))?;
        limit_sequence_length(&mut tokenizer, config.max_position_embeddings)?;

        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                    .map_err(unavailable)?
            }
        } else {
            VarBuilder::from_pth(weights_path, DTYPE, &device).map_err(unavailable)?
        };

        let model = BertModel::load(vb, &config).map_err(unavailable)?;

        let normalize = model_name.contains("sentence-transformers")
            || model_name.contains("bge")
            || model_name.contains("e5");

        info!(
            "Loaded model: {} dims, device: {:?}, normalize: {}",
            dimensions, device, normalize
        );

        Ok(Self {
            model: Arc::new(LocalModel {
                model,
                tokenizer,
                device,
                normalize,
            }),
            dimensions,
        })
    }
}

impl LocalModel {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| inference(format!("tokenization failed: {}", e)))?;

        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

        let mut input_ids = Vec::with_capacity(encodings.len() * max_len);
        let mut attention_mask = Vec::with_capacity(encodings.len() * max_len);
        let mut token_type_ids = Vec::with_capacity(encodings.len() * max_len);

        for encoding in &encodings {
            let pad = max_len - encoding.get_ids().len();
            input_ids.extend(encoding.get_ids().iter().copied().chain(std::iter::repeat(0).take(pad)));
            attention_mask.extend(
                encoding.get_attention_mask().iter().copied().chain(std::iter::repeat(0).take(pad)),
            );
            token_type_ids.extend(
                encoding.get_type_ids().iter().copied().chain(std::iter::repeat(0).take(pad)),
            );
        }

        let batch_size = encodings.len();
        self.forward(batch_size, max_len, input_ids, attention_mask, token_type_ids)
            .map_err(inference)
    }

    fn forward(
        &self,
        batch_size: usize,
        max_len: usize,
        input_ids: Vec<u32>,
        attention_mask: Vec<u32>,
        token_type_ids: Vec<u32>,
    ) -> candle_core::Result<Vec<Vec<f32>>> {
        let input_ids = Tensor::from_vec(input_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(attention_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(token_type_ids, (batch_size, max_len), &self.device)?;

        let output = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean pooling over non-padding tokens
        let mask = attention_mask
            .to_dtype(output.dtype())?
            .unsqueeze(2)?
            .broadcast_as(output.shape())?;
        let sum = output.mul(&mask)?.sum(1)?;
        let count = attention_mask
            .to_dtype(output.dtype())?
            .sum(1)?
            .unsqueeze(1)?
            .broadcast_as(sum.shape())?;
        let mut embeddings = sum.div(&count.clamp(1e-9, f64::INFINITY)?)?;

        if self.normalize {
            let norm = embeddings
                .sqr()?
                .sum_keepdim(1)?
                .sqrt()?
                .clamp(1e-12, f64::INFINITY)?;
            embeddings = embeddings.broadcast_div(&norm)?;
        }

        embeddings.to_dtype(DType::F32)?.to_vec2::<f32>()
    }
}

#[async_trait]
impl EmbeddingProviderTrait for CandleEmbedding {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        // Batching happens in the adapter; one forward pass per call
        let model = Arc::clone(&self.model);
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        run_blocking(move || {
            let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
            model.embed_batch(&texts)
        })
        .await
    }
}
