//! End-to-end checks of the fetch, validate and publish pipeline against a
//! local mock server.

use lib_portfolio::{FetchError, PortfolioConfig, PortfolioFeed, PortfolioItem, RetryPolicy};

const ITEMS_BODY: &str = r#"[{
    "id": 1,
    "title": "X",
    "imageUrl": "http://a/b.png",
    "description": "A long enough description",
    "githubUrl": "http://github.com/x",
    "technologies": ["React"],
    "category": "frontend"
}]"#;

fn config_for(server: &mockito::ServerGuard) -> PortfolioConfig {
    let mut config = PortfolioConfig::new(server.url());
    config.retry = RetryPolicy {
        max_retries: 3,
        base_delay_ms: 1,
        multiplier: 2,
    };
    config
}

#[tokio::test]
async fn endpoint_payload_becomes_one_validated_item() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/items")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ITEMS_BODY)
        .create_async()
        .await;

    let api = config_for(&server).api().unwrap();
    let items = api.fetch_portfolio_items(None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        items,
        vec![PortfolioItem {
            id: "1".into(),
            title: "X".into(),
            image_url: "http://a/b.png".into(),
            description: "A long enough description".into(),
            video_url: None,
            live_url: None,
            github_url: "http://github.com/x".into(),
            technologies: vec!["React".into()],
            category: "frontend".into(),
            featured: false,
        }]
    );
}

#[tokio::test]
async fn exhausted_retries_surface_as_classified_feed_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/items")
        .with_status(500)
        .expect(4)
        .create_async()
        .await;

    let feed = PortfolioFeed::mount(config_for(&server).api().unwrap());
    let mut rx = feed.subscribe();
    let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();

    mock.assert_async().await;
    assert!(state.items.is_empty());
    assert!(state.is_classified_error);
    assert!(state.error.unwrap().contains("HTTP 500"));
}

#[tokio::test]
async fn feed_retry_recovers_after_an_outage() {
    let mut server = mockito::Server::new_async().await;
    let outage = server
        .mock("GET", "/items")
        .with_status(503)
        .expect(4)
        .create_async()
        .await;

    let feed = PortfolioFeed::mount(config_for(&server).api().unwrap());
    let mut rx = feed.subscribe();
    rx.wait_for(|s| !s.loading).await.unwrap();
    outage.assert_async().await;
    assert!(feed.is_classified_error());

    outage.remove_async().await;
    let healthy = server
        .mock("GET", "/items")
        .with_status(200)
        .with_body(format!(r#"{{"success": true, "message": "ok", "data": {}}}"#, ITEMS_BODY))
        .create_async()
        .await;

    feed.retry();
    assert!(feed.loading());
    assert_eq!(feed.error(), None);

    let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
    healthy.assert_async().await;
    assert_eq!(state.error, None);
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].id, "1");
}

#[tokio::test]
async fn non_json_body_is_reported_without_classification() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/items")
        .with_status(200)
        .with_body("Service temporarily moved")
        .create_async()
        .await;

    let err = config_for(&server)
        .api()
        .unwrap()
        .fetch_portfolio_items(None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
    assert!(!err.is_classified());
}
