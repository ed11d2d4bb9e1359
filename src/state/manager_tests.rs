//! Tests for StateManager

use super::*;
use tempfile::tempdir;

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_new() {
    let manager = StateManager::new("/tmp/test-state.json");
    assert!(!manager.is_in_memory());
    assert_eq!(manager.path().to_str().unwrap(), "/tmp/test-state.json");
}

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[test]
fn test_state_manager_from_json() {
    let manager = StateManager::from_json(
        r#"{ "streams": { "orders": { "bookmark": "2024-01-01T00:00:00Z" } } }"#,
    )
    .unwrap();
    assert!(manager.is_in_memory());

    let bookmark = tokio_test::block_on(manager.bookmark("orders"));
    assert_eq!(bookmark, Some("2024-01-01T00:00:00Z".to_string()));
}

#[test]
fn test_state_manager_from_invalid_json() {
    assert!(StateManager::from_json("not json").is_err());
}

// ============================================================================
// Bookmark Tests
// ============================================================================

#[tokio::test]
async fn test_get_set_bookmark() {
    let manager = StateManager::in_memory();

    assert!(manager.bookmark("orders").await.is_none());

    manager
        .set_bookmark("orders", "2024-01-01T00:00:00Z".to_string())
        .await
        .unwrap();

    assert_eq!(
        manager.bookmark("orders").await,
        Some("2024-01-01T00:00:00Z".to_string())
    );
}

#[tokio::test]
async fn test_bookmark_update() {
    let manager = StateManager::in_memory();

    manager
        .set_bookmark("orders", "bookmark1".to_string())
        .await
        .unwrap();
    manager
        .set_bookmark("orders", "bookmark2".to_string())
        .await
        .unwrap();

    assert_eq!(
        manager.bookmark("orders").await,
        Some("bookmark2".to_string())
    );
}

#[tokio::test]
async fn test_bookmarks_are_per_stream() {
    let manager = StateManager::in_memory();

    manager
        .set_bookmark("orders", "o".to_string())
        .await
        .unwrap();
    manager
        .set_bookmark("products", "p".to_string())
        .await
        .unwrap();

    assert_eq!(manager.bookmark("orders").await, Some("o".to_string()));
    assert_eq!(manager.bookmark("products").await, Some("p".to_string()));
}

#[tokio::test]
async fn test_clear_stream() {
    let manager = StateManager::in_memory();

    manager
        .set_bookmark("orders", "x".to_string())
        .await
        .unwrap();
    manager.clear_stream("orders").await.unwrap();

    assert!(manager.bookmark("orders").await.is_none());
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::new(&path);
    manager
        .set_bookmark("orders", "2024-03-01T12:00:00Z".to_string())
        .await
        .unwrap();

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(
        reloaded.bookmark("orders").await,
        Some("2024-03-01T12:00:00Z".to_string())
    );
}

#[tokio::test]
async fn test_from_file_missing_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does-not-exist.json");

    let manager = StateManager::from_file(&path).unwrap();
    assert!(manager.bookmark("orders").await.is_none());
}

#[tokio::test]
async fn test_saved_state_contains_only_bookmarks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::new(&path);
    manager
        .set_bookmark("orders", "2024-03-01T12:00:00Z".to_string())
        .await
        .unwrap();

    // The on-disk shape has no room for in-flight pagination state.
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed["streams"]["orders"],
        serde_json::json!({ "bookmark": "2024-03-01T12:00:00Z" })
    );
}

#[tokio::test]
async fn test_in_memory_save_is_noop() {
    let manager = StateManager::in_memory();
    manager
        .set_bookmark("orders", "x".to_string())
        .await
        .unwrap();
    manager.save().await.unwrap();
}
