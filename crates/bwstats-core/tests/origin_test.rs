//! Integration tests for the origin API client against a mock server

use std::time::Duration;

use bwstats_core::{Error, OriginClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> OriginClient {
    OriginClient::builder("test-key")
        .base_url(server.uri())
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn fetches_and_parses_a_player_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player"))
        .and(query_param("uuid", "abc"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "player": {
                "displayname": "Techno",
                "achievements": { "bedwars_level": 42 },
                "stats": { "Bedwars": { "wins_bedwars": 7 } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client_for(&server).await.player("abc").await.unwrap();
    let player = payload.player.unwrap();
    assert_eq!(player.displayname.as_deref(), Some("Techno"));
    assert!(player.stats.unwrap().bedwars.is_some());
}

#[tokio::test]
async fn absent_player_deserializes_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "player": null })),
        )
        .mount(&server)
        .await;

    let payload = client_for(&server).await.player("ghost").await.unwrap();
    assert!(payload.player.is_none());
}

#[tokio::test]
async fn throttle_flag_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "success": false,
            "throttle": true,
            "cause": "Key throttle"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).await.player("abc").await.unwrap_err();
    assert!(matches!(err, Error::OriginRateLimited));
    assert_eq!(err.status(), 429);
}

#[tokio::test]
async fn invalid_key_cause_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "cause": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).await.player("abc").await.unwrap_err();
    assert!(matches!(err, Error::OriginUnauthorized));
    // Credential state is hidden behind a plain 500.
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn server_error_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).await.player("abc").await.unwrap_err();
    assert!(matches!(err, Error::OriginUnavailable(_)));
}

#[tokio::test]
async fn leaderboards_returns_the_bedwars_boards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leaderboards"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "leaderboards": {
                "BEDWARS": [
                    {
                        "path": "bedwars_level",
                        "title": "BW Level",
                        "count": 2,
                        "leaders": ["u1", "u2"]
                    },
                    {
                        "path": "wins_new",
                        "leaders": ["u2", "u1"]
                    }
                ],
                "SKYWARS": []
            }
        })))
        .mount(&server)
        .await;

    let boards = client_for(&server).await.leaderboards().await.unwrap();
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[0].path, "bedwars_level");
    assert_eq!(boards[0].leaders, vec!["u1", "u2"]);
    assert_eq!(boards[1].title, "");
}

#[test]
fn empty_api_key_is_misconfigured() {
    let err = OriginClient::new("").unwrap_err();
    assert!(matches!(err, Error::OriginMisconfigured));
    assert_eq!(err.status(), 500);
}
