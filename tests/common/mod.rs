#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pdfchat::{
    AnswerGenerator, ChunkingConfig, Embedder, Embedding, PipelineConfig, RagError, RagResult,
    RetrievalPipeline, TextExtractor,
};

pub const DIMS: usize = 4;
const KEYWORDS: [&str; DIMS] = ["apple", "banana", "cherry", "durian"];

/// Treats the payload as UTF-8 text; empty payloads are malformed.
#[derive(Default)]
pub struct Utf8Extractor {
    pub calls: AtomicUsize,
}

impl TextExtractor for Utf8Extractor {
    fn extract(&self, bytes: &[u8]) -> RagResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if bytes.is_empty() {
            return Err(RagError::Extraction("empty payload".into()));
        }
        String::from_utf8(bytes.to_vec()).map_err(|err| RagError::Extraction(err.to_string()))
    }
}

/// Counts keyword occurrences per dimension, or looks texts up in a table.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
    pub batches: Mutex<Vec<Vec<String>>>,
    pub table: HashMap<String, Embedding>,
    pub width_override: Option<usize>,
    pub fail: bool,
}

impl KeywordEmbedder {
    pub fn with_table(entries: &[(&str, Embedding)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Embedding {
        if let Some(vector) = self.table.get(text.trim()) {
            return vector.clone();
        }
        let lower = text.to_lowercase();
        let mut vector: Embedding = KEYWORDS
            .iter()
            .map(|keyword| lower.matches(keyword).count() as f32)
            .collect();
        if let Some(width) = self.width_override {
            vector.resize(width, 0.0);
        }
        vector
    }
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, batch: &[&str]) -> RagResult<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .unwrap()
            .push(batch.iter().map(|s| s.to_string()).collect());
        if self.fail {
            return Err(RagError::Embedding("provider unavailable".into()));
        }
        Ok(batch.iter().map(|text| self.vector_for(text)).collect())
    }
}

/// Records every prompt and replies with a canned answer.
#[derive(Default)]
pub struct RecordingGenerator {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<(String, String)> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl AnswerGenerator for RecordingGenerator {
    fn generate(&self, system_instruction: &str, user_prompt: &str) -> RagResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), user_prompt.to_string()));
        if self.fail {
            return Err(RagError::Generation("model overloaded".into()));
        }
        Ok("  the canned answer\n".to_string())
    }
}

pub struct Harness {
    pub extractor: Arc<Utf8Extractor>,
    pub embedder: Arc<KeywordEmbedder>,
    pub generator: Arc<RecordingGenerator>,
    pub pipeline: RetrievalPipeline,
}

pub fn config(max_len: usize, overlap: usize, top_k: usize) -> PipelineConfig {
    PipelineConfig {
        chunking: ChunkingConfig { max_len, overlap },
        top_k,
        dimensions: DIMS,
    }
}

pub fn harness_with(
    config: PipelineConfig,
    embedder: KeywordEmbedder,
    generator: RecordingGenerator,
) -> Harness {
    let extractor = Arc::new(Utf8Extractor::default());
    let embedder = Arc::new(embedder);
    let generator = Arc::new(generator);
    let pipeline = RetrievalPipeline::new(
        config,
        extractor.clone(),
        embedder.clone(),
        generator.clone(),
    )
    .expect("valid pipeline config");
    Harness {
        extractor,
        embedder,
        generator,
        pipeline,
    }
}

pub fn harness() -> Harness {
    harness_with(
        config(60, 10, 2),
        KeywordEmbedder::default(),
        RecordingGenerator::default(),
    )
}

pub const FRUIT_DOC: &str = "Apple orchards cover the northern valley. Apple harvest starts in autumn.\n\n\
Banana plants grow near the river. Banana crates ship weekly.\n\n\
Cherry blossoms open in spring. Cherry jam is a local favorite.";
