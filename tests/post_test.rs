mod common;

use serde_json::Value;

#[tokio::test]
async fn create_and_get_post() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "postuser").await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;
    let location_id = common::create_test_location(&app.db, true).await;

    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "First post",
            "text": "Hello, world!",
            "pub_date": common::past(5),
            "category_id": category_id,
            "location_id": location_id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let post_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["title"], "First post");
    assert_eq!(body["data"]["author_id"].as_i64().unwrap() as i32, user_id);
    assert_eq!(
        body["data"]["category"]["id"].as_i64().unwrap() as i32,
        category_id
    );
    assert_eq!(
        body["data"]["location"]["id"].as_i64().unwrap() as i32,
        location_id
    );
    assert_eq!(body["data"]["comment_count"], 0);

    // Anonymous detail view
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "First post");
}

#[tokio::test]
async fn create_post_requires_authentication() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/posts"))
        .json(&serde_json::json!({
            "title": "No session",
            "text": "Should fail",
            "pub_date": common::past(5)
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn create_post_rejects_unknown_category() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "badcat").await;

    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Bad category",
            "text": "Should fail",
            "pub_date": common::past(5),
            "category_id": 999999
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["fields"]["category_id"].is_array());
}

#[tokio::test]
async fn scheduled_post_detail_hidden_from_strangers() {
    let app = common::spawn_app().await;
    let (_author_id, author_token) = common::create_test_user(&app, "scheduler").await;
    let (_stranger_id, stranger_token) = common::create_test_user(&app, "reader").await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;

    let post_id =
        common::create_test_post(&app, &author_token, Some(category_id), common::future(60)).await;

    // Anonymous and stranger both get 404 (invisible and absent look the same)
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&stranger_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // The author still sees it
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn draft_detail_visible_only_to_author() {
    let app = common::spawn_app().await;
    let (author_id, author_token) = common::create_test_user(&app, "drafter").await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;

    let post_id =
        common::insert_post(&app.db, author_id, Some(category_id), common::past(5), false).await;

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["is_published"], false);
}

#[tokio::test]
async fn update_post_preserves_author_and_rewrites_fields() {
    let app = common::spawn_app().await;
    let (author_id, token) = common::create_test_user(&app, "editor").await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;

    let post_id =
        common::create_test_post(&app, &token, Some(category_id), common::past(5)).await;

    let resp = app
        .client
        .put(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Edited title",
            "text": "Edited body",
            "pub_date": common::past(1),
            "category_id": category_id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"].as_i64().unwrap() as i32, post_id);
    assert_eq!(body["data"]["title"], "Edited title");
    assert_eq!(body["data"]["author_id"].as_i64().unwrap() as i32, author_id);
}

#[tokio::test]
async fn update_by_non_owner_is_forbidden() {
    let app = common::spawn_app().await;
    let (_author_id, author_token) = common::create_test_user(&app, "owner").await;
    let (_other_id, other_token) = common::create_test_user(&app, "intruder").await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;

    let post_id =
        common::create_test_post(&app, &author_token, Some(category_id), common::past(5)).await;

    let resp = app
        .client
        .put(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({
            "title": "Hijacked",
            "text": "Hijacked",
            "pub_date": common::past(1)
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // The post is untouched
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Test post");
}

#[tokio::test]
async fn delete_by_non_owner_is_forbidden_and_missing_is_not_found() {
    let app = common::spawn_app().await;
    let (_author_id, author_token) = common::create_test_user(&app, "deleter").await;
    let (_other_id, other_token) = common::create_test_user(&app, "notmine").await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;

    let post_id =
        common::create_test_post(&app, &author_token, Some(category_id), common::past(5)).await;

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Deleting again: the row is gone, so NotFound wins over Forbidden
    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
