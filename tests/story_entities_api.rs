// tests/story_entities_api.rs

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_novel, delete, get, post, put, test_app};

#[tokio::test]
async fn test_children_require_existing_novel() {
    let app = test_app().await;

    let (status, body) = post(
        &app,
        "/api/characters",
        json!({ "novel_id": "missing", "name": "Ilse" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Novel not found");

    let (status, _) = post(
        &app,
        "/api/chapters",
        json!({ "novel_id": "missing", "chapter_number": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lists_are_scoped_by_novel() {
    let app = test_app().await;
    let first = create_novel(&app, "First").await;
    let second = create_novel(&app, "Second").await;

    for (novel, name) in [(&first, "Ilse"), (&first, "Marek"), (&second, "Odo")] {
        let (status, _) = post(
            &app,
            "/api/characters",
            json!({ "novel_id": novel, "name": name, "role": "protagonist" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = post(
        &app,
        "/api/plots",
        json!({ "novel_id": second, "title": "The siege", "plot_type": "main" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, characters) = get(&app, &format!("/api/characters?novel_id={}", first)).await;
    let names: Vec<&str> = characters
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(!names.contains(&"Odo"));

    let (_, plots) = get(&app, &format!("/api/plots?novel_id={}", first)).await;
    assert!(plots.as_array().unwrap().is_empty());

    for novel in [&first, &second] {
        let (status, _) = post(
            &app,
            "/api/worlds",
            json!({ "novel_id": novel, "era": "Dusk" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, worlds) = get(&app, &format!("/api/worlds?novel_id={}", first)).await;
    assert_eq!(status, StatusCode::OK);
    let worlds = worlds.as_array().unwrap();
    assert_eq!(worlds.len(), 1);
    assert_eq!(worlds[0]["novel_id"], first.as_str());

    let (_, all) = get(&app, "/api/worlds").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chapter_status_is_shown_upper_case() {
    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;

    let (status, chapter) = post(
        &app,
        "/api/chapters",
        json!({ "novel_id": novel, "chapter_number": 1, "title": "Embers" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chapter["status"], "DRAFT");

    let id = chapter["id"].as_i64().unwrap();
    let (status, updated) = put(
        &app,
        &format!("/api/chapters/{}", id),
        json!({ "status": "in_review", "word_count": 1200 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "IN_REVIEW");
    assert_eq!(updated["word_count"], 1200);
    assert_eq!(updated["title"], "Embers");
}

#[tokio::test]
async fn test_one_world_setting_per_novel() {
    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;

    let world = json!({
        "novel_id": novel,
        "era": "Late bronze age",
        "locations": { "capital": "Aurel" },
    });
    let (status, created) = post(&app, "/api/worlds", world.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["locations"]["capital"], "Aurel");

    let (status, body) = post(&app, "/api/worlds", world).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "World setting already exists for this novel");

    let (status, fetched) = get(&app, &format!("/api/worlds/novel/{}", novel)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
}

#[tokio::test]
async fn test_deleting_novel_cascades() {
    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;

    let (_, character) = post(
        &app,
        "/api/characters",
        json!({ "novel_id": novel, "name": "Ilse" }),
    )
    .await;
    let (_, chapter) = post(
        &app,
        "/api/chapters",
        json!({ "novel_id": novel, "chapter_number": 1 }),
    )
    .await;
    post(&app, "/api/worlds", json!({ "novel_id": novel, "era": "Now" })).await;

    let (status, _) = delete(&app, &format!("/api/novels/{}", novel)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/characters/{}", character["id"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, &format!("/api/chapters/{}", chapter["id"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, &format!("/api/worlds/novel/{}", novel)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
