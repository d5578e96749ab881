use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use yari_search::analysis::settings::AnalyzerDefinition;
use yari_search::error::DeployerError;
use yari_search::search::elasticsearch::ElasticsearchEngine;
use yari_search::search::engine::SearchEngine;
use yari_search::search::local::LocalEngine;
use yari_search::search::models::{
    INDEX_NAME, IndexDefinition, TEXT_ANALYZER, analysis_settings, document_mapping,
};
use yari_search::search::{Document, EnsureOutcome, SearchIndex};

async fn ready_index() -> (Arc<LocalEngine>, SearchIndex) {
    let engine = Arc::new(LocalEngine::new());
    let index = SearchIndex::new(engine.clone()).unwrap();
    assert_eq!(index.ensure().await.unwrap(), EnsureOutcome::Created);
    (engine, index)
}

fn page(title: &str, slug: &str) -> Document {
    Document::new(title).with_locale("en-US").with_slug(slug)
}

#[tokio::test]
async fn test_title_only_document_is_accepted() {
    let (engine, index) = ready_index().await;

    let id = index.index_document(&Document::new("Hello")).await.unwrap();
    assert!(!id.is_empty());
    assert_eq!(
        engine.get_document(INDEX_NAME, &id).unwrap(),
        Some(json!({ "title": "Hello" }))
    );
}

#[tokio::test]
async fn test_document_without_title_is_rejected() {
    let (engine, _index) = ready_index().await;

    let err = engine
        .index_document(INDEX_NAME, None, &json!({ "body": "No title here", "locale": "en-US" }))
        .await
        .unwrap_err();
    assert!(matches!(err, DeployerError::Validation(_)));
    assert!(!err.is_retryable());
    assert_eq!(engine.doc_count(INDEX_NAME).unwrap(), 0);
}

#[tokio::test]
async fn test_documents_are_keyed_by_url() {
    let (engine, index) = ready_index().await;

    let id = index
        .index_document(&page("<video>: The Video Embed element", "Web/HTML/Element/video"))
        .await
        .unwrap();
    assert_eq!(id, "/en-US/docs/Web/HTML/Element/video");

    // Reindexing replaces the document.
    index
        .index_document(
            &page("<video>: The Video Embed element", "Web/HTML/Element/video")
                .with_summary("Embeds a media player."),
        )
        .await
        .unwrap();
    assert_eq!(engine.doc_count(INDEX_NAME).unwrap(), 1);
    let stored = engine.get_document(INDEX_NAME, &id).unwrap().unwrap();
    assert_eq!(stored["summary"], "Embeds a media player.");
}

#[tokio::test]
async fn test_bulk_indexing_reports_per_document_results() {
    let (engine, index) = ready_index().await;

    let docs: Vec<Document> = (0..20)
        .map(|i| page(&format!("Page {i}"), &format!("Web/Page{i}")))
        .collect();
    let results = index.index_documents(&docs, 4).await.unwrap();

    assert_eq!(results.len(), 20);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.as_ref().unwrap(), &format!("/en-US/docs/Web/Page{i}"));
    }
    assert_eq!(engine.doc_count(INDEX_NAME).unwrap(), 20);
}

#[tokio::test]
async fn test_analyze_through_the_engine() {
    let (_engine, index) = ready_index().await;

    let tokens = index.analyze("Array.prototype.forEach").await.unwrap();
    let texts: Vec<_> = tokens.iter().map(|t| t.token.as_str()).collect();
    assert_eq!(texts, vec!["array.prototype.foreach", "array", "prototype", "foreach"]);
    assert_eq!(tokens[0].position, 0);
    assert_eq!(tokens[1].position, 0);
    assert_eq!(tokens[3].position, 2);
    assert_eq!((tokens[3].start_offset, tokens[3].end_offset), (16, 23));

    let tokens = index.analyze_with("whitespace", "l'avion WebGL").await.unwrap();
    let texts: Vec<_> = tokens.iter().map(|t| t.token.as_str()).collect();
    assert_eq!(texts, vec!["l'avion", "WebGL"]);

    let err = index.analyze_with("no_such_analyzer", "x").await.unwrap_err();
    assert!(matches!(err, DeployerError::Engine { status: 400, .. }));
}

#[tokio::test]
async fn test_section_query_also_matches_section_in_titles() {
    let (_engine, index) = ready_index().await;

    let docs = vec![
        page("<nav>: The Navigation Section element", "Web/HTML/Element/nav").with_popularity(0.9),
        page("<section>: The Generic Section element", "Web/HTML/Element/section")
            .with_popularity(0.1),
        page("<video>: The Video Embed element", "Web/HTML/Element/video"),
    ];
    for result in index.index_documents(&docs, 2).await.unwrap() {
        result.unwrap();
    }

    let hits = index.search("<section>", None, 10).await.unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["/en-US/docs/Web/HTML/Element/section", "/en-US/docs/Web/HTML/Element/nav"]
    );

    let hits = index.search("bézier", None, 10).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_accented_queries_match_plain_titles() {
    let (_engine, index) = ready_index().await;
    index
        .index_document(&page("Bezier curve", "Glossary/Bezier_curve"))
        .await
        .unwrap();
    index
        .index_document(
            &Document::new("Courbe de Bézier")
                .with_locale("fr")
                .with_slug("Glossary/Bezier_curve"),
        )
        .await
        .unwrap();

    let hits = index.search("bézier", None, 10).await.unwrap();
    assert_eq!(hits.len(), 2);

    let hits = index.search("bézier", Some("fr"), 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "/fr/docs/Glossary/Bezier_curve");
}

#[tokio::test]
async fn test_stale_analysis_settings_require_reindex() {
    let engine = Arc::new(LocalEngine::new());

    // An index created from an older pipeline.
    let old_settings = analysis_settings().with_analyzer(
        TEXT_ANALYZER,
        AnalyzerDefinition::custom("standard").with_filters(["lowercase"]),
    );
    let old = IndexDefinition::new(INDEX_NAME, old_settings, document_mapping());
    engine.create_index(&old).await.unwrap();

    let index = SearchIndex::new(engine.clone()).unwrap();
    let err = index.ensure().await.unwrap_err();
    match &err {
        DeployerError::ReindexRequired {
            index: name,
            expected,
            found,
        } => {
            assert_eq!(name, INDEX_NAME);
            assert_eq!(expected, index.fingerprint());
            assert_eq!(found, &old.fingerprint().unwrap());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_retryable());

    let err = index.index_document(&Document::new("Hello")).await.unwrap_err();
    assert!(matches!(err, DeployerError::ReindexRequired { .. }));
    assert_eq!(engine.doc_count(INDEX_NAME).unwrap(), 0);

    index.rebuild().await.unwrap();
    assert_eq!(index.ensure().await.unwrap(), EnsureOutcome::UpToDate);

    index.index_document(&Document::new("Hello")).await.unwrap();
    assert_eq!(engine.doc_count(INDEX_NAME).unwrap(), 1);
}

#[tokio::test]
async fn test_extra_analyzer_changes_the_fingerprint() {
    let engine = Arc::new(LocalEngine::new());
    let mut extended = IndexDefinition::mdn_docs();
    extended.settings = extended
        .settings
        .with_analyzer("extra", AnalyzerDefinition::custom("whitespace"));
    engine.create_index(&extended).await.unwrap();

    let index = SearchIndex::new(engine).unwrap();
    assert_ne!(index.fingerprint(), extended.fingerprint().unwrap());
    assert!(matches!(
        index.ensure().await.unwrap_err(),
        DeployerError::ReindexRequired { .. }
    ));
}

#[tokio::test]
async fn test_unreachable_cluster_is_retryable() {
    let engine =
        Arc::new(ElasticsearchEngine::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap());
    let index = SearchIndex::new(engine).unwrap();

    let err = index.ensure().await.unwrap_err();
    assert!(matches!(err, DeployerError::Unavailable(_)), "{err}");
    assert!(err.is_retryable());

    let err = index.index_document(&Document::new("Hello")).await.unwrap_err();
    assert!(err.is_retryable());
}
