//! Tweets, comments, likes, friendships and newsfeeds through the full router.

use axum::http::{Method, StatusCode};
use serde_json::json;
use social::domain::repository::TweetRepository;
use social::models::LikeTarget;
use testing::TestCase;

// ============================================================================
// Tweets
// ============================================================================

#[tokio::test]
async fn test_create_tweet_requires_login() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;

    let response = tc
        .anonymous_client()
        .post("/api/tweets", json!({ "content": "anonymous tweet" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_create_and_list_tweets() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (linghu, client) = tc.create_user_and_client("linghu").await?;

    let response = client
        .post("/api/tweets", json!({ "content": "short" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["errors"]["content"].is_array());

    let response = client
        .post("/api/tweets", json!({ "content": "Sword of Dugu Nine" }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["content"], "Sword of Dugu Nine");
    assert_eq!(body["user"]["username"], "linghu");
    assert_eq!(body["likes_count"], 0);

    let response = tc
        .anonymous_client()
        .get(&format!("/api/tweets?user_id={}", linghu.user_id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let tweets = response.json()["tweets"].clone();
    assert_eq!(tweets.as_array().map(Vec::len), Some(1));
    assert_eq!(tweets[0]["id"], body["id"]);
    assert!(tweets[0].get("has_liked").is_none());
    Ok(())
}

#[tokio::test]
async fn test_malformed_tweet_bodies_are_form_errors() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (_, client) = tc.create_user_and_client("linghu").await?;

    let response = client.send(Method::POST, "/api/tweets", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["errors"]["content"],
        json!(["This field is required."])
    );

    for body in [json!(["Sword of Dugu Nine"]), json!({ "content": 42 })] {
        let response = client.post("/api/tweets", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Please check input.");
        assert!(body["errors"]["non_field_errors"].is_array());
    }
    Ok(())
}

#[tokio::test]
async fn test_list_tweets_requires_user_id() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;

    let response = tc.anonymous_client().get("/api/tweets").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "success": false, "message": "missing user_id" })
    );
    Ok(())
}

// ============================================================================
// Comments and Likes
// ============================================================================

#[tokio::test]
async fn test_comment_on_tweet() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let author = tc.create_user("linghu", None, None).await?;
    let tweet = tc.create_tweet(&author, None).await?;
    let (_, client) = tc.create_user_and_client("yingying").await?;

    let response = client
        .post(
            "/api/comments",
            json!({ "tweet_id": tweet.tweet_id.to_string(), "content": "well said" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["user"]["username"], "yingying");

    let response = client
        .post(
            "/api/comments",
            json!({ "tweet_id": "not-a-tweet", "content": "lost comment" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["errors"]["tweet_id"],
        json!(["Tweet does not exist."])
    );

    let stored = tc.social.find_tweet_by_id(&tweet.tweet_id).await?.unwrap();
    assert_eq!(stored.comments_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_like_tweet_once() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let author = tc.create_user("linghu", None, None).await?;
    let tweet = tc.create_tweet(&author, None).await?;
    let (_, client) = tc.create_user_and_client("yingying").await?;

    let body = json!({ "content_type": "tweet", "object_id": tweet.tweet_id.to_string() });
    for _ in 0..2 {
        let response = client.post("/api/likes", body.clone()).await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.json()["content_type"], "tweet");
    }

    let stored = tc.social.find_tweet_by_id(&tweet.tweet_id).await?.unwrap();
    assert_eq!(stored.likes_count, 1);

    let response = client
        .get(&format!("/api/tweets?user_id={}", author.user_id))
        .await;
    assert_eq!(response.json()["tweets"][0]["has_liked"], true);

    let response = client
        .post("/api/likes", json!({ "content_type": "retweet", "object_id": "x" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["errors"]["content_type"].is_array());
    Ok(())
}

#[tokio::test]
async fn test_like_comment_fixture() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let user = tc.create_user("linghu", None, None).await?;
    let tweet = tc.create_tweet(&user, Some("a tweet worth discussing")).await?;
    let comment = tc.create_comment(&user, &tweet, None).await?;

    let first = tc
        .create_like(&user, LikeTarget::Comment(comment.comment_id))
        .await?;
    let again = tc
        .create_like(&user, LikeTarget::Comment(comment.comment_id))
        .await?;
    assert_eq!(first.like_id, again.like_id);
    assert_eq!(comment.content.as_str(), testing::DEFAULT_COMMENT_CONTENT);
    Ok(())
}

// ============================================================================
// Friendships
// ============================================================================

#[tokio::test]
async fn test_follow_and_unfollow() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (linghu, client) = tc.create_user_and_client("linghu").await?;
    let yingying = tc.create_user("yingying", None, None).await?;
    let follow_url = format!("/api/friendships/{}/follow", yingying.user_id);

    let response = tc.anonymous_client().post(&follow_url, json!({})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = client.post(&follow_url, json!({})).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["duplicate"], false);
    assert_eq!(body["user"]["username"], "yingying");

    let response = client.post(&follow_url, json!({})).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json(), json!({ "success": true, "duplicate": true }));

    let response = tc
        .anonymous_client()
        .get(&format!("/api/friendships/{}/followers", yingying.user_id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let results = response.json()["results"].clone();
    assert_eq!(results.as_array().map(Vec::len), Some(1));
    assert_eq!(results[0]["user"]["username"], "linghu");

    let response = tc
        .anonymous_client()
        .get(&format!("/api/friendships/{}/followings", linghu.user_id))
        .await;
    assert_eq!(response.json()["results"][0]["user"]["username"], "yingying");

    let unfollow_url = format!("/api/friendships/{}/unfollow", yingying.user_id);
    let response = client.post(&unfollow_url, json!({})).await;
    assert_eq!(response.json(), json!({ "success": true, "deleted": true }));
    let response = client.post(&unfollow_url, json!({})).await;
    assert_eq!(response.json(), json!({ "success": true, "deleted": false }));
    Ok(())
}

#[tokio::test]
async fn test_follow_errors() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (linghu, client) = tc.create_user_and_client("linghu").await?;

    let response = client
        .post(&format!("/api/friendships/{}/follow", linghu.user_id), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "You cannot follow yourself.");

    let stranger = kernel::id::UserId::new();
    let response = client
        .post(&format!("/api/friendships/{stranger}/follow"), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    Ok(())
}

// ============================================================================
// NewsFeeds
// ============================================================================

#[tokio::test]
async fn test_newsfeed_receives_followed_tweets() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (author, author_client) = tc.create_user_and_client("linghu").await?;
    let (_, reader_client) = tc.create_user_and_client("yingying").await?;
    let (_, stranger_client) = tc.create_user_and_client("yuebuqun").await?;

    let response = reader_client
        .post(&format!("/api/friendships/{}/follow", author.user_id), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = author_client
        .post("/api/tweets", json!({ "content": "Smiling Proud Wanderer" }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let tweet_id = response.json()["id"].clone();

    for client in [&author_client, &reader_client] {
        let response = client.get("/api/newsfeeds").await;
        assert_eq!(response.status, StatusCode::OK);
        let feeds = response.json()["newsfeeds"].clone();
        assert_eq!(feeds.as_array().map(Vec::len), Some(1));
        assert_eq!(feeds[0]["tweet"]["id"], tweet_id);
    }

    let response = stranger_client.get("/api/newsfeeds").await;
    assert_eq!(response.json()["newsfeeds"], json!([]));

    let response = tc.anonymous_client().get("/api/newsfeeds").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_newsfeed_fixture_is_listed() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (reader, client) = tc.create_user_and_client("yingying").await?;
    let author = tc.create_user("linghu", None, None).await?;
    let tweet = tc.create_tweet(&author, None).await?;
    tc.create_newsfeed(&reader, &tweet).await?;

    let response = client.get("/api/newsfeeds?limit=5").await;
    let feeds = response.json()["newsfeeds"].clone();
    assert_eq!(feeds[0]["tweet"]["content"], testing::DEFAULT_TWEET_CONTENT);
    assert_eq!(feeds[0]["tweet"]["user"]["username"], "linghu");
    Ok(())
}
