mod common;

use std::io::Cursor;
use std::sync::Arc;

use common::hash_embedding;
use common::BrokenChat;
use common::HashEmbedder;
use common::Harness;
use docrag::cli::run_interactive_session;
use docrag::llm::ChatRole;
use docrag::llm::RagPrompts;
use docrag::models::ChatTurn;
use docrag::models::EmbeddedSegment;
use docrag::models::NewDocument;
use docrag::rag::AskQuery;
use docrag::rag::RagService;
use docrag::store::DocumentStore;
use docrag::store::MemoryStore;
use docrag::store::VectorIndex;
use docrag::DocRagError;
use docrag::Result;
use proptest::prelude::*;
use uuid::Uuid;

async fn seed(harness: &Harness) -> Result<()> {
    harness
        .state
        .ingestion
        .ingest(
            "rust.txt",
            b"Rust is a systems programming language focused on safety and speed.",
        )
        .await?;
    harness
        .state
        .ingestion
        .ingest(
            "cooking.txt",
            b"To bake bread you need flour water salt and yeast.",
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_ask_without_documents_skips_llm() -> Result<()> {
    let harness = Harness::new();

    let response = harness.state.rag.query("What is Rust?").await?;

    assert_eq!(response.answer, RagPrompts::no_context_answer());
    assert!(response.sources.is_empty());
    assert!(response.citations.is_empty());
    assert_eq!(harness.chat.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_ask_returns_answer_with_ranked_sources() -> Result<()> {
    let harness = Harness::new();
    seed(&harness).await?;

    let response = harness
        .state
        .rag
        .ask(AskQuery {
            top_k: Some(2),
            ..AskQuery::new("what do you need to bake bread")
        })
        .await?;

    assert_eq!(response.answer, "The answer is 42.");
    assert_eq!(response.sources.len(), 2);
    assert_eq!(response.citations[0].filename, "cooking.txt");
    assert!(response.citations[0].score >= response.citations[1].score);
    assert_eq!(
        response.sources,
        response
            .citations
            .iter()
            .map(|c| c.segment_id)
            .collect::<Vec<_>>()
    );

    let prompt = harness.chat.last_prompt();
    assert_eq!(prompt.first().map(|m| m.role), Some(ChatRole::System));
    let last = prompt.last().unwrap();
    assert_eq!(last.role, ChatRole::User);
    assert!(last.content.contains("flour water salt"));
    assert!(last.content.contains("what do you need to bake bread"));
    Ok(())
}

#[tokio::test]
async fn test_ask_scoped_to_one_document() -> Result<()> {
    let harness = Harness::new();
    seed(&harness).await?;
    let rust = harness
        .state
        .ingestion
        .list()
        .await?
        .into_iter()
        .find(|d| d.filename == "rust.txt")
        .unwrap();

    let response = harness
        .state
        .rag
        .ask(AskQuery {
            document_id: Some(rust.id),
            ..AskQuery::new("how do I bake bread")
        })
        .await?;

    assert!(!response.citations.is_empty());
    assert!(response.citations.iter().all(|c| c.document_id == rust.id));
    Ok(())
}

#[tokio::test]
async fn test_history_is_sent_before_question() -> Result<()> {
    let harness = Harness::new();
    seed(&harness).await?;

    harness
        .state
        .rag
        .ask(AskQuery {
            history: vec![ChatTurn {
                question: "What is Rust?".to_string(),
                answer: "A programming language.".to_string(),
            }],
            ..AskQuery::new("Is it fast?")
        })
        .await?;

    let prompt = harness.chat.last_prompt();
    assert_eq!(prompt.len(), 4);
    assert_eq!(prompt[1].role, ChatRole::User);
    assert_eq!(prompt[1].content, "What is Rust?");
    assert_eq!(prompt[2].role, ChatRole::Assistant);
    assert_eq!(prompt[2].content, "A programming language.");
    Ok(())
}

#[tokio::test]
async fn test_invalid_questions_are_rejected() {
    let harness = Harness::new();

    assert!(matches!(
        harness.state.rag.query("   ").await,
        Err(DocRagError::InvalidInput(_))
    ));
    assert!(matches!(
        harness
            .state
            .rag
            .ask(AskQuery {
                top_k: Some(0),
                ..AskQuery::new("anything")
            })
            .await,
        Err(DocRagError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_top_k_is_capped() -> Result<()> {
    let harness = Harness::new();
    for i in 0..15 {
        harness
            .state
            .ingestion
            .ingest(&format!("doc{i}.txt"), format!("document number {i}").as_bytes())
            .await?;
    }

    let response = harness
        .state
        .rag
        .ask(AskQuery {
            top_k: Some(1000),
            ..AskQuery::new("document number")
        })
        .await?;

    assert_eq!(response.sources.len(), harness.config.retrieval.max_top_k);
    Ok(())
}

#[tokio::test]
async fn test_llm_failure_is_generation_failure() -> Result<()> {
    let harness = Harness::new();
    seed(&harness).await?;

    let embedder = Arc::new(HashEmbedder);
    let rag = RagService::new(
        &harness.config,
        embedder,
        harness.store.clone(),
        Arc::new(BrokenChat),
    );

    let err = rag.query("What is Rust?").await.unwrap_err();
    assert!(matches!(err, DocRagError::GenerationFailed(_)));
    Ok(())
}

#[tokio::test]
async fn test_interactive_session_keeps_history() -> Result<()> {
    let harness = Harness::new();
    seed(&harness).await?;

    let input = Cursor::new("What is Rust?\n\nIs it safe?\nexit\nnever asked\n");
    let mut output = Vec::new();

    let history =
        run_interactive_session(&harness.state.rag, input, &mut output, None, None).await?;

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].question, "What is Rust?");
    assert_eq!(history[1].answer, "The answer is 42.");
    assert_eq!(harness.chat.calls(), 2);
    // The second question carries the first exchange
    assert_eq!(harness.chat.last_prompt().len(), 4);

    let transcript = String::from_utf8(output).unwrap();
    assert!(transcript.contains("Assistant: The answer is 42."));
    assert!(transcript.ends_with("👋 Goodbye!\n"));
    Ok(())
}

#[tokio::test]
async fn test_interactive_session_ends_on_eof() -> Result<()> {
    let harness = Harness::new();

    let mut output = Vec::new();
    let history = run_interactive_session(
        &harness.state.rag,
        Cursor::new("hello\n"),
        &mut output,
        None,
        None,
    )
    .await?;

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].answer, RagPrompts::no_context_answer());
    Ok(())
}

async fn indexed_store(vectors: &[Vec<f32>]) -> Result<MemoryStore> {
    let store = MemoryStore::new();
    let document = store
        .create_document(&NewDocument {
            id: Uuid::new_v4(),
            filename: "vectors.txt".to_string(),
            filepath: "vectors.txt".to_string(),
            byte_size: 0,
            checksum: String::new(),
        })
        .await?;

    let segments: Vec<EmbeddedSegment> = vectors
        .iter()
        .enumerate()
        .map(|(i, embedding)| EmbeddedSegment {
            id: Uuid::new_v4(),
            ordinal: i as i32,
            start_offset: 0,
            end_offset: 0,
            text: format!("segment {i}"),
            embedding: embedding.clone(),
        })
        .collect();
    store.insert(document.id, &segments).await?;
    store.mark_indexed(document.id, segments.len() as i32).await?;
    Ok(store)
}

proptest! {
    #[test]
    fn prop_search_returns_at_most_k_in_score_order(
        vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 0..30),
        query in prop::collection::vec(-1.0f32..1.0, 4),
        k in 1usize..10,
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let hits = runtime.block_on(async {
            let store = indexed_store(&vectors).await.unwrap();
            store.search(&query, k, None).await.unwrap()
        });

        prop_assert_eq!(hits.len(), k.min(vectors.len()));
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn test_hash_embedding_prefers_shared_words() {
    let query = hash_embedding("bake bread");
    let close = hash_embedding("bread is easy to bake");
    let far = hash_embedding("systems programming language");

    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&query, &close) > dot(&query, &far));
}

#[tokio::test]
async fn test_interactive_session_only_stops_on_literal_exit() -> Result<()> {
    let harness = Harness::new();

    let mut output = Vec::new();
    let history = run_interactive_session(
        &harness.state.rag,
        Cursor::new("EXIT\nExit\nexit\n"),
        &mut output,
        None,
        None,
    )
    .await?;

    let questions: Vec<&str> = history.iter().map(|t| t.question.as_str()).collect();
    assert_eq!(questions, ["EXIT", "Exit"]);
    Ok(())
}
