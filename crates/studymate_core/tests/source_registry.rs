mod common;

use bytes::Bytes;
use common::{pdf_bytes, FakeBackend};
use studymate_core::sources::SourceRegistry;
use studymate_core::{AnalysisOutcome, SourceKind, StudioError};
use uuid::Uuid;

#[tokio::test]
async fn text_source_is_never_analyzed() {
    let backend = FakeBackend::new();
    let registry = SourceRegistry::new(backend.clone());

    let ingested = registry
        .ingest("notes.txt", Some(Bytes::from("Cells divide.")), SourceKind::Text)
        .await;

    assert!(ingested.analysis.is_none());
    let stored = registry.get(ingested.source.id).await.unwrap();
    assert!(!stored.is_analyzing);
    assert!(stored.analysis.is_none());
    assert_eq!(backend.analyze_calls(), 0);
}

#[tokio::test]
async fn pdf_analysis_runs_once_and_clears_flag() {
    let backend = FakeBackend::new();
    let registry = SourceRegistry::new(backend.clone());

    let ingested = registry
        .ingest("biology.pdf", Some(pdf_bytes()), SourceKind::Pdf)
        .await;
    let id = ingested.source.id;

    assert!(registry.get(id).await.unwrap().is_analyzing);
    assert!(registry.get(id).await.unwrap().analysis.is_none());

    let task = ingested.analysis.expect("pdf analysis should be spawned");
    assert_eq!(task.source_id(), id);
    assert_eq!(task.wait().await, AnalysisOutcome::Completed);

    let stored = registry.get(id).await.unwrap();
    assert!(!stored.is_analyzing);
    assert_eq!(stored.analysis.unwrap().title, "Photosynthesis");
    assert_eq!(backend.analyze_calls(), 1);
}

#[tokio::test]
async fn failed_analysis_is_absorbed() {
    let backend = FakeBackend::new();
    backend.fail_analysis();
    let registry = SourceRegistry::new(backend.clone());

    let ingested = registry
        .ingest("broken.pdf", Some(pdf_bytes()), SourceKind::Pdf)
        .await;
    let id = ingested.source.id;
    let outcome = ingested.analysis.unwrap().wait().await;

    assert!(matches!(outcome, AnalysisOutcome::Failed(_)));
    let stored = registry.get(id).await.unwrap();
    assert!(!stored.is_analyzing);
    assert!(stored.analysis.is_none());
    assert!(stored.is_ready());
    assert_eq!(backend.analyze_calls(), 1);
}

#[tokio::test]
async fn ingest_selects_source_and_toggle_flips_membership() {
    let backend = FakeBackend::new();
    let registry = SourceRegistry::new(backend);

    let id = registry
        .ingest("a.txt", Some(Bytes::from("a")), SourceKind::Text)
        .await
        .source
        .id;
    assert_eq!(registry.selected_ids().await, vec![id]);

    assert_eq!(registry.toggle_selection(id).await, Ok(false));
    assert!(registry.active_sources().await.is_empty());
    assert_eq!(registry.toggle_selection(id).await, Ok(true));
    assert_eq!(registry.active_sources().await.len(), 1);
}

#[tokio::test]
async fn toggling_unknown_source_is_not_found() {
    let registry = SourceRegistry::new(FakeBackend::new());
    let missing = Uuid::new_v4();
    assert_eq!(
        registry.toggle_selection(missing).await,
        Err(StudioError::NotFound(missing))
    );
}

#[tokio::test]
async fn latest_ready_skips_analyzing_and_deselected_sources() {
    let backend = FakeBackend::new();
    let registry = SourceRegistry::new(backend);

    let first = registry
        .ingest("first.txt", Some(Bytes::from("one")), SourceKind::Text)
        .await
        .source
        .id;
    let second = registry
        .ingest("second.txt", Some(Bytes::from("two")), SourceKind::Text)
        .await
        .source
        .id;
    let analyzing = registry
        .ingest("third.pdf", Some(pdf_bytes()), SourceKind::Pdf)
        .await;

    assert_eq!(registry.latest_ready().await.unwrap().id, second);
    assert_eq!(
        registry.latest_active().await.unwrap().id,
        analyzing.source.id
    );

    registry.toggle_selection(second).await.unwrap();
    assert_eq!(registry.latest_ready().await.unwrap().id, first);

    analyzing.analysis.unwrap().wait().await;
    assert_eq!(
        registry.latest_ready().await.unwrap().id,
        analyzing.source.id
    );
}

#[tokio::test]
async fn pdf_without_payload_is_never_analyzed() {
    let backend = FakeBackend::new();
    let registry = SourceRegistry::new(backend.clone());

    let ingested = registry.ingest("empty.pdf", None, SourceKind::Pdf).await;

    assert!(ingested.analysis.is_none());
    assert!(!ingested.source.is_analyzing);
    assert_eq!(backend.analyze_calls(), 0);
    assert!(registry.latest_ready().await.is_none());
}
