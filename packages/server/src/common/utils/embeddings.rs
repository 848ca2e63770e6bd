use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::text::label_tokens;
use crate::kernel::BaseEmbeddingService;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Local, deterministic label embedder (feature hashing).
///
/// Every word token and every character trigram of a token is hashed with
/// SHA-256 into a signed bucket. Labels sharing words or word fragments
/// ("fundraising" / "raised") land on shared buckets, so cosine similarity
/// tracks lexical overlap without a model download.
///
/// Same label in, same vector out. An empty label is the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Synchronous embedding (the trait impl delegates here)
    pub fn embed(&self, label: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in label_tokens(label) {
            self.add_feature(&mut vector, &format!("w:{}", token), WORD_WEIGHT);

            let padded: Vec<char> = format!("#{}#", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &format!("t:{}", trigram), TRIGRAM_WEIGHT);
            }
        }

        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSIONS)
    }
}

#[async_trait]
impl BaseEmbeddingService for HashingEmbedder {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }
}

/// Embedding service using OpenAI's text-embedding-3-small
pub struct OpenAiEmbeddingService {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingService {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: "text-embedding-3-small".to_string(),
        }
    }
}

#[async_trait]
impl BaseEmbeddingService for OpenAiEmbeddingService {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        // The API rejects empty input; an empty label embeds to nothing
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            anyhow::bail!("OpenAI API error {}: {}", status, body);
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_label_same_vector() {
        let embedder = HashingEmbedder::default();
        assert_eq!(
            embedder.embed("ML deployment help"),
            embedder.embed("ML deployment help")
        );
    }

    #[test]
    fn test_normalization_applies_before_hashing() {
        let embedder = HashingEmbedder::default();
        assert_eq!(
            embedder.embed("ML deployment help"),
            embedder.embed("  ml   DEPLOYMENT help!")
        );
    }

    #[test]
    fn test_empty_label_is_zero_vector() {
        let embedder = HashingEmbedder::new(32);
        let vector = embedder.embed("");
        assert_eq!(vector.len(), 32);
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fixed_dimensions() {
        let embedder = HashingEmbedder::new(64);
        assert_eq!(embedder.embed("a much longer label with many words").len(), 64);
        assert_eq!(HashingEmbedder::new(0).dimensions(), 1);
    }

    #[tokio::test]
    async fn test_trait_matches_sync_embed() {
        let embedder = HashingEmbedder::default();
        let via_trait = embedder.generate("Raised a seed round").await.unwrap();
        assert_eq!(via_trait, embedder.embed("Raised a seed round"));
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_openai_embedding() {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let service = OpenAiEmbeddingService::new(api_key);
        let embedding = service.generate("Raised a seed round").await.unwrap();
        assert!(!embedding.is_empty());
    }
}
