//! Integration tests for the Unsplash client against a local server

#![cfg(feature = "http")]

use collagekit::source::UnsplashClient;
use collagekit::{Error, UnsplashConfig};
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Response, Server};

type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

const FEED: &str = r#"[
  {"id":"p1","urls":{"regular":"https://images.test/p1.jpg"},"alt_description":"red bike","description":null},
  {"id":"p2","urls":{"regular":"https://images.test/p2.jpg"},"alt_description":null,"description":"lake"}
]"#;

const SEARCH: &str = r#"{"total":31,"total_pages":3,"results":[
  {"id":"c1","urls":{"regular":"https://images.test/c1.jpg"},"alt_description":"a cat"}
]}"#;

/// Serve a tiny fake API and record (url, authorization) per request.
fn start_server() -> (String, Seen) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let url = request.url().to_string();
            let auth = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            log.lock().unwrap().push((url.clone(), auth));

            let json = "Content-Type: application/json".parse::<Header>().unwrap();
            let response = if url.starts_with("/broken/") {
                Response::from_string("Rate Limit Exceeded").with_status_code(403)
            } else if url.starts_with("/photos") {
                Response::from_string(FEED).with_header(json)
            } else if url.starts_with("/search/photos") {
                Response::from_string(SEARCH).with_header(json)
            } else {
                Response::from_string("Not Found").with_status_code(404)
            };
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{}", port), seen)
}

fn client(base_url: String) -> UnsplashClient {
    UnsplashClient::new(UnsplashConfig {
        base_url,
        access_key: Some("test-key".into()),
        per_page: 12,
    })
    .unwrap()
}

#[tokio::test]
async fn default_feed_maps_photos() {
    let (base, seen) = start_server();
    let photos = client(base).fetch_default(2).await.unwrap();

    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].id, "p1");
    assert_eq!(photos[0].alt_text.as_deref(), Some("red bike"));
    assert_eq!(photos[1].alt_text.as_deref(), Some("lake"));

    let seen = seen.lock().unwrap();
    let (url, auth) = &seen[0];
    assert!(url.starts_with("/photos?"));
    assert!(url.contains("page=2"));
    assert!(url.contains("per_page=12"));
    assert_eq!(auth.as_deref(), Some("Client-ID test-key"));
}

#[tokio::test]
async fn search_encodes_query_and_reads_totals() {
    let (base, seen) = start_server();
    let found = client(base).search("  black cat ", 1).await.unwrap();

    assert_eq!(found.total, 31);
    assert_eq!(found.total_pages, 3);
    assert_eq!(found.results[0].preview_uri, "https://images.test/c1.jpg");

    let seen = seen.lock().unwrap();
    assert!(seen[0].0.contains("query=black+cat"));
}

#[tokio::test]
async fn non_success_status_is_a_network_error() {
    let (base, _seen) = start_server();
    let err = client(format!("{}/broken", base))
        .fetch_default(1)
        .await
        .unwrap_err();
    match err {
        Error::Network { status, body } => {
            assert_eq!(status, Some(403));
            assert_eq!(body, "Rate Limit Exceeded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn blank_query_never_hits_the_network() {
    let (base, seen) = start_server();
    let err = client(base).search("\t ", 1).await.unwrap_err();
    assert!(err.is_validation());
    assert!(seen.lock().unwrap().is_empty());
}
