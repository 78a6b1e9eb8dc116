mod common;

use common::{config, harness, harness_with, KeywordEmbedder, RecordingGenerator, DIMS, FRUIT_DOC};
use pdfchat::{build_context, RagError, NO_INFORMATION_ANSWER, SYSTEM_INSTRUCTION};
use pretty_assertions::assert_eq;

#[test]
fn ingest_embeds_all_chunks_in_one_call() {
    let h = harness();
    let count = h.pipeline.ingest(FRUIT_DOC.as_bytes()).expect("ingest");

    assert_eq!(count, 6);
    assert_eq!(h.pipeline.chunk_count(), 6);
    assert_eq!(h.embedder.calls(), 1);
    let batches = h.embedder.batches.lock().unwrap();
    assert_eq!(batches[0].len(), 6);
    assert_eq!(batches[0][0], "Apple orchards cover the northern valley. ");
    assert_eq!(
        batches[0][5],
        "n spring. Cherry jam is a local favorite."
    );
}

#[test]
fn empty_payload_fails_before_embedding() {
    let h = harness();
    let err = h.pipeline.ingest(b"").unwrap_err();
    assert!(matches!(err, RagError::Extraction(_)));
    assert_eq!(h.embedder.calls(), 0);
    assert_eq!(h.pipeline.chunk_count(), 0);
}

#[test]
fn whitespace_document_is_rejected() {
    let h = harness();
    let err = h.pipeline.ingest(b" \n\n\t ").unwrap_err();
    assert!(matches!(err, RagError::Extraction(_)));
    assert_eq!(h.embedder.calls(), 0);
}

#[test]
fn empty_question_makes_no_external_calls() {
    let h = harness();
    h.pipeline.ingest(FRUIT_DOC.as_bytes()).unwrap();
    let embed_calls = h.embedder.calls();

    assert_eq!(h.pipeline.answer(""), Err(RagError::EmptyQuestion));
    assert_eq!(h.pipeline.answer("   \n"), Err(RagError::EmptyQuestion));
    assert_eq!(h.embedder.calls(), embed_calls);
    assert_eq!(h.generator.calls(), 0);
}

#[test]
fn empty_index_returns_sentinel_without_generating() {
    let h = harness();
    let answer = h.pipeline.answer("What grows near the river?").unwrap();
    assert_eq!(answer, NO_INFORMATION_ANSWER);
    assert_eq!(h.generator.calls(), 0);
    assert_eq!(h.embedder.calls(), 1);
}

#[test]
fn answer_grounds_prompt_in_nearest_chunks() {
    let h = harness();
    h.pipeline.ingest(FRUIT_DOC.as_bytes()).unwrap();

    let answer = h.pipeline.answer("Tell me about cherry").unwrap();
    assert_eq!(answer, "  the canned answer\n");
    assert_eq!(h.generator.calls(), 1);

    let (system, prompt) = h.generator.last_prompt().expect("prompt recorded");
    assert_eq!(system, SYSTEM_INSTRUCTION);
    let context = build_context(&[
        " weekly.\n\nCherry blossoms open in spring. ".to_string(),
        "n spring. Cherry jam is a local favorite.".to_string(),
    ]);
    assert!(prompt.contains(&format!("Context:\n{context}\n\nQuestion: Tell me about cherry")));
    assert!(!prompt.contains("Banana"));

    // the question went through the same embedder as a single-element batch
    let batches = h.embedder.batches.lock().unwrap();
    assert_eq!(batches.last().unwrap(), &vec!["Tell me about cherry".to_string()]);
}

#[test]
fn retrieve_orders_by_distance() {
    let embedder = KeywordEmbedder::with_table(&[
        ("alpha", vec![3.0, 0.0, 0.0, 0.0]),
        ("beta", vec![0.1f32.sqrt(), 0.0, 0.0, 0.0]),
        ("gamma", vec![5.0f32.sqrt(), 0.0, 0.0, 0.0]),
        ("query", vec![0.0; DIMS]),
    ]);
    let h = harness_with(config(7, 0, 2), embedder, RecordingGenerator::default());
    assert_eq!(h.pipeline.ingest(b"alpha\n\nbeta\n\ngamma").unwrap(), 3);

    let hits = h.pipeline.retrieve("query").unwrap();
    let texts: Vec<&str> = hits.iter().map(|hit| hit.text.trim()).collect();
    assert_eq!(texts, vec!["beta", "gamma"]);
    assert!((hits[0].distance - 0.1).abs() < 1e-5);
    assert!((hits[1].distance - 5.0).abs() < 1e-5);
}

#[test]
fn generation_failure_is_typed() {
    let generator = RecordingGenerator {
        fail: true,
        ..RecordingGenerator::default()
    };
    let h = harness_with(config(60, 10, 2), KeywordEmbedder::default(), generator);
    h.pipeline.ingest(FRUIT_DOC.as_bytes()).unwrap();

    let err = h.pipeline.answer("banana?").unwrap_err();
    assert_eq!(err, RagError::Generation("model overloaded".into()));
}

#[test]
fn embedding_failure_propagates_from_ingest() {
    let embedder = KeywordEmbedder {
        fail: true,
        ..KeywordEmbedder::default()
    };
    let h = harness_with(config(60, 10, 2), embedder, RecordingGenerator::default());
    let err = h.pipeline.ingest(FRUIT_DOC.as_bytes()).unwrap_err();
    assert!(matches!(err, RagError::Embedding(_)));
    assert_eq!(h.pipeline.chunk_count(), 0);
}

#[test]
fn wrong_width_vectors_leave_index_untouched() {
    let embedder = KeywordEmbedder {
        width_override: Some(DIMS + 1),
        table: [("apple only".to_string(), vec![1.0, 0.0, 0.0, 0.0])]
            .into_iter()
            .collect(),
        ..KeywordEmbedder::default()
    };
    let h = harness_with(config(60, 10, 2), embedder, RecordingGenerator::default());

    // table hit has the right width, so the first document is stored
    assert_eq!(h.pipeline.ingest(b"apple only").unwrap(), 1);
    let err = h.pipeline.ingest(FRUIT_DOC.as_bytes()).unwrap_err();
    assert_eq!(
        err,
        RagError::DimensionMismatch {
            expected: DIMS,
            actual: DIMS + 1
        }
    );
    assert_eq!(h.pipeline.chunk_count(), 1);
}

#[test]
fn new_upload_replaces_previous_document() {
    let h = harness();
    h.pipeline.ingest(FRUIT_DOC.as_bytes()).unwrap();
    assert_eq!(h.pipeline.ingest(b"Durian smells strong.").unwrap(), 1);
    assert_eq!(h.pipeline.chunk_count(), 1);

    h.pipeline.answer("apple?").unwrap();
    let (_, prompt) = h.generator.last_prompt().unwrap();
    assert!(prompt.contains("Durian smells strong."));
    assert!(!prompt.contains("Apple orchards"));
}

#[test]
fn clear_returns_pipeline_to_empty_state() {
    let h = harness();
    h.pipeline.ingest(FRUIT_DOC.as_bytes()).unwrap();
    h.pipeline.clear();
    h.pipeline.clear();

    assert_eq!(h.pipeline.chunk_count(), 0);
    assert_eq!(h.pipeline.answer("apple?").unwrap(), NO_INFORMATION_ANSWER);
    assert_eq!(h.generator.calls(), 0);
}

#[test]
fn invalid_sizing_is_a_configuration_error() {
    let extractor = std::sync::Arc::new(common::Utf8Extractor::default());
    let result = pdfchat::RetrievalPipeline::new(
        config(10, 10, 2),
        extractor,
        std::sync::Arc::new(KeywordEmbedder::default()),
        std::sync::Arc::new(RecordingGenerator::default()),
    );
    assert!(matches!(result, Err(RagError::Configuration(_))));
}
