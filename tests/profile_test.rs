mod common;

use serde_json::Value;

#[tokio::test]
async fn profile_shows_public_fields_only() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "profiled").await;
    let username = common::username_of(&app, &token).await;

    let resp = app
        .client
        .get(app.url(&format!("/users/{}", username)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"].as_i64().unwrap() as i32, user_id);
    assert_eq!(body["data"]["username"], username.as_str());
    assert!(body["data"]["email"].is_null());
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/users/ghost_user"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn profile_feed_self_view_includes_non_live_posts() {
    let app = common::spawn_app().await;
    let (author_id, author_token) = common::create_test_user(&app, "selfview").await;
    let (_other_id, other_token) = common::create_test_user(&app, "visitor").await;
    let username = common::username_of(&app, &author_token).await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;

    let live = common::create_test_post(&app, &author_token, Some(category_id), common::past(5)).await;
    let scheduled =
        common::create_test_post(&app, &author_token, Some(category_id), common::future(60)).await;
    let draft =
        common::insert_post(&app.db, author_id, Some(category_id), common::past(10), false).await;

    let path = format!("/users/{}/posts", username);

    // Anonymous and stranger views show the live subset
    for token in [None, Some(other_token.as_str())] {
        let mut req = app.client.get(app.url(&path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let ids: Vec<i64> = body["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![live as i64]);
    }

    // Self view shows everything, still newest-first
    let resp = app
        .client
        .get(app.url(&path))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let ids: Vec<i64> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![scheduled as i64, live as i64, draft as i64]);
}

#[tokio::test]
async fn profile_feed_never_leaks_other_authors_posts() {
    let app = common::spawn_app().await;
    let (_alice_id, alice_token) = common::create_test_user(&app, "alicefeed").await;
    let (_bob_id, bob_token) = common::create_test_user(&app, "bobfeed").await;
    let alice = common::username_of(&app, &alice_token).await;
    let (category_id, _slug) = common::create_test_category(&app.db, true).await;

    let alices = common::create_test_post(&app, &alice_token, Some(category_id), common::past(5)).await;
    let _bobs = common::create_test_post(&app, &bob_token, Some(category_id), common::past(3)).await;

    let resp = app
        .client
        .get(app.url(&format!("/users/{}/posts", alice)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap() as i32, alices);
}

#[tokio::test]
async fn update_profile_changes_names_and_email() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "renamer").await;
    let username = common::username_of(&app, &token).await;

    let resp = app
        .client
        .put(app.url("/auth/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": format!("{}@renamed.test", username)
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["first_name"], "Ada");
    assert_eq!(body["data"]["last_name"], "Lovelace");

    // Names show up on the public profile
    let resp = app
        .client
        .get(app.url(&format!("/users/{}", username)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["first_name"], "Ada");
}

#[tokio::test]
async fn update_profile_rejects_taken_email() {
    let app = common::spawn_app().await;
    let (_first_id, first_token) = common::create_test_user(&app, "emailone").await;
    let (_second_id, second_token) = common::create_test_user(&app, "emailtwo").await;
    let first_username = common::username_of(&app, &first_token).await;

    // create_test_user registers with <username>@test.com
    let taken_email = format!("{}@test.com", first_username);

    let resp = app
        .client
        .put(app.url("/auth/profile"))
        .bearer_auth(&second_token)
        .json(&serde_json::json!({ "email": taken_email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["fields"]["email"].is_array());
}

#[tokio::test]
async fn update_profile_requires_authentication() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .put(app.url("/auth/profile"))
        .json(&serde_json::json!({ "first_name": "Nobody" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
