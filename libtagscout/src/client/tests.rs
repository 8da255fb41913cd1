use super::*;
use mockito::Matcher;

const CONFIG_BLOB: &str = r#"{"architecture":"amd64","os":"linux","created":"2024-01-02T03:04:05Z"}"#;

fn config_with_insecure(hosts: &[&str]) -> Config {
    let mut config = Config::default();
    config.registries.insecure = hosts.iter().map(|h| h.to_string()).collect();
    config
}

#[test]
fn test_base_url_defaults_to_https() {
    let client = Client::new().unwrap();
    assert_eq!(client.base_url("ghcr.io"), "https://ghcr.io");
    assert_eq!(
        client.base_url("registry.example.com:8443"),
        "https://registry.example.com:8443"
    );
}

#[test]
fn test_base_url_maps_docker_hub() {
    let client = Client::new().unwrap();
    assert_eq!(client.base_url("docker.io"), "https://registry-1.docker.io");
    assert_eq!(
        client.base_url("index.docker.io"),
        "https://registry-1.docker.io"
    );
}

#[test]
fn test_base_url_uses_http_for_loopback() {
    let client = Client::new().unwrap();
    assert_eq!(client.base_url("localhost:5000"), "http://localhost:5000");
    assert_eq!(client.base_url("127.0.0.1:5000"), "http://127.0.0.1:5000");
    assert_eq!(client.base_url("[::1]:5000"), "http://[::1]:5000");
    assert_eq!(client.base_url("registry.local"), "http://registry.local");
}

#[test]
fn test_base_url_uses_http_for_configured_hosts() {
    let client = Client::with_config(&config_with_insecure(&["registry.internal:5000"])).unwrap();
    assert_eq!(
        client.base_url("registry.internal:5000"),
        "http://registry.internal:5000"
    );
    assert_eq!(
        client.base_url("registry.internal"),
        "https://registry.internal"
    );
}

#[test]
fn test_base_url_keeps_explicit_scheme() {
    let client = Client::new().unwrap();
    assert_eq!(
        client.base_url("http://mirror.example.com/"),
        "http://mirror.example.com"
    );
}

#[test]
fn test_extract_next_link_relative() {
    let mut headers = HeaderMap::new();
    headers.insert(
        LINK,
        r#"</v2/library/nginx/tags/list?n=2&last=1.22>; rel="next""#
            .parse()
            .unwrap(),
    );

    assert_eq!(
        Client::extract_next_link(&headers),
        Some("/v2/library/nginx/tags/list?n=2&last=1.22".to_string())
    );
}

#[test]
fn test_extract_next_link_ignores_other_relations() {
    let mut headers = HeaderMap::new();
    headers.insert(LINK, r#"</v2/foo>; rel="prev""#.parse().unwrap());

    assert_eq!(Client::extract_next_link(&headers), None);
    assert_eq!(Client::extract_next_link(&HeaderMap::new()), None);
}

#[tokio::test]
async fn test_fetch_tags_single_page() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name":"library/nginx","tags":["1.21","1.22","latest"]}"#)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let tags = client
        .fetch_tags(&server.host_with_port(), "library/nginx")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(tags, vec!["1.21", "1.22", "latest"]);
}

#[tokio::test]
async fn test_fetch_tags_follows_pagination() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .match_query(Matcher::Exact("n=2".to_string()))
        .with_status(200)
        .with_header(
            "Link",
            r#"</v2/library/nginx/tags/list?n=2&last=1.22>; rel="next""#,
        )
        .with_body(r#"{"name":"library/nginx","tags":["1.21","1.22"]}"#)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .match_query(Matcher::UrlEncoded("last".to_string(), "1.22".to_string()))
        .with_status(200)
        .with_body(r#"{"name":"library/nginx","tags":["latest"]}"#)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let tags = client
        .fetch_tags_paginated(&server.host_with_port(), "library/nginx", Some(2))
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(tags, vec!["1.21", "1.22", "latest"]);
}

#[tokio::test]
async fn test_fetch_tags_rejects_repeated_next_link() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .with_status(200)
        .with_header("Link", r#"</v2/library/nginx/tags/list>; rel="next""#)
        .with_body(r#"{"name":"library/nginx","tags":["1.21"]}"#)
        .expect(1)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags(&server.host_with_port(), "library/nginx")
        .await;

    mock.assert_async().await;
    assert!(matches!(result.unwrap_err(), ScoutError::Validation { .. }));
}

#[tokio::test]
async fn test_fetch_tags_rejects_pagination_cycle() {
    let mut server = mockito::Server::new_async().await;
    let _first = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .match_query(Matcher::Exact("n=1".to_string()))
        .with_status(200)
        .with_header("Link", r#"</v2/library/nginx/tags/list?n=1&last=a>; rel="next""#)
        .with_body(r#"{"name":"library/nginx","tags":["a"]}"#)
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .match_query(Matcher::UrlEncoded("last".to_string(), "a".to_string()))
        .with_status(200)
        .with_header("Link", r#"</v2/library/nginx/tags/list?n=1>; rel="next""#)
        .with_body(r#"{"name":"library/nginx","tags":["b"]}"#)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags_paginated(&server.host_with_port(), "library/nginx", Some(1))
        .await;

    assert!(matches!(result.unwrap_err(), ScoutError::Validation { .. }));
}

#[tokio::test]
async fn test_fetch_tags_null_list_is_empty() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/empty/repo/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"empty/repo","tags":null}"#)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let tags = client
        .fetch_tags(&server.host_with_port(), "empty/repo")
        .await
        .unwrap();

    assert!(tags.is_empty());
}

#[tokio::test]
async fn test_fetch_tags_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/missing/repo/tags/list")
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"NAME_UNKNOWN"}]}"#)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags(&server.host_with_port(), "missing/repo")
        .await;

    assert!(matches!(result.unwrap_err(), ScoutError::NotFound { .. }));
}

#[tokio::test]
async fn test_fetch_tags_forbidden() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/private/repo/tags/list")
        .with_status(403)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags(&server.host_with_port(), "private/repo")
        .await;

    assert!(matches!(
        result.unwrap_err(),
        ScoutError::Authentication {
            status_code: Some(403),
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_tags_unauthorized_without_challenge() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/private/repo/tags/list")
        .with_status(401)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags(&server.host_with_port(), "private/repo")
        .await;

    assert!(matches!(
        result.unwrap_err(),
        ScoutError::Authentication {
            status_code: Some(401),
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_tags_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags(&server.host_with_port(), "library/nginx")
        .await;

    assert!(matches!(
        result.unwrap_err(),
        ScoutError::Registry {
            status_code: 503,
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_tags_invalid_json() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .with_status(200)
        .with_body("<html>not a registry</html>")
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags(&server.host_with_port(), "library/nginx")
        .await;

    assert!(matches!(result.unwrap_err(), ScoutError::Validation { .. }));
}

#[tokio::test]
async fn test_fetch_tags_with_anonymous_token() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(
        r#"Bearer realm="{}/token",service="test-registry",scope="repository:library/nginx:pull""#,
        server.url()
    );

    let unauthenticated = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;
    let token = server
        .mock("GET", "/token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("service".to_string(), "test-registry".to_string()),
            Matcher::UrlEncoded(
                "scope".to_string(),
                "repository:library/nginx:pull".to_string(),
            ),
        ]))
        .with_status(200)
        .with_body(r#"{"token":"anon-token"}"#)
        .create_async()
        .await;
    let authenticated = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .match_header("authorization", "Bearer anon-token")
        .with_status(200)
        .with_body(r#"{"name":"library/nginx","tags":["latest"]}"#)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let tags = client
        .fetch_tags(&server.host_with_port(), "library/nginx")
        .await
        .unwrap();

    unauthenticated.assert_async().await;
    token.assert_async().await;
    authenticated.assert_async().await;
    assert_eq!(tags, vec!["latest"]);
}

#[tokio::test]
async fn test_fetch_tags_token_rejected() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(r#"Bearer realm="{}/token",service="test""#, server.url());

    let _mock = server
        .mock("GET", "/v2/library/nginx/tags/list")
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;
    let _mock = server
        .mock("GET", "/token")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_tags(&server.host_with_port(), "library/nginx")
        .await;

    assert!(matches!(
        result.unwrap_err(),
        ScoutError::Authentication {
            status_code: Some(403),
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_tags_connection_refused() {
    // Nothing listens on port 1 of the loopback interface
    let client = Client::new().unwrap();
    let result = client.fetch_tags("127.0.0.1:1", "library/nginx").await;

    assert!(matches!(result.unwrap_err(), ScoutError::Network { .. }));
}

#[tokio::test]
async fn test_fetch_manifest_with_matching_digest() {
    let body = r#"{"schemaVersion":2,"config":{"mediaType":"application/vnd.oci.image.config.v1+json","size":2,"digest":"sha256:44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"},"layers":[]}"#;
    let digest = Digest::sha256_of(body.as_bytes()).unwrap().to_string();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/library/nginx/manifests/1.21")
        .match_header("accept", Matcher::Regex("application/vnd.oci.image.index.v1\\+json".to_string()))
        .with_status(200)
        .with_header("Docker-Content-Digest", &digest)
        .with_body(body)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let manifest = client
        .fetch_manifest(&server.host_with_port(), "library/nginx", "1.21")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(manifest.bytes, body.as_bytes());
    assert_eq!(manifest.digest, Some(digest));
}

#[tokio::test]
async fn test_fetch_manifest_without_digest_header() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/library/nginx/manifests/latest")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let manifest = client
        .fetch_manifest(&server.host_with_port(), "library/nginx", "latest")
        .await
        .unwrap();

    assert_eq!(manifest.bytes, b"{}");
    assert_eq!(manifest.digest, None);
}

#[tokio::test]
async fn test_fetch_manifest_rejects_digest_mismatch() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/library/nginx/manifests/latest")
        .with_status(200)
        .with_header(
            "Docker-Content-Digest",
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        )
        .with_body("{\"tampered\":true}")
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_manifest(&server.host_with_port(), "library/nginx", "latest")
        .await;

    assert!(matches!(result.unwrap_err(), ScoutError::Validation { .. }));
}

#[tokio::test]
async fn test_fetch_blob_verifies_content() {
    let digest = Digest::sha256_of(CONFIG_BLOB.as_bytes()).unwrap();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", format!("/v2/library/nginx/blobs/{}", digest).as_str())
        .with_status(200)
        .with_body(CONFIG_BLOB)
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let blob = client
        .fetch_blob(&server.host_with_port(), "library/nginx", &digest)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(blob, CONFIG_BLOB.as_bytes());
}

#[tokio::test]
async fn test_fetch_blob_rejects_corrupted_content() {
    let digest = Digest::sha256_of(CONFIG_BLOB.as_bytes()).unwrap();

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", format!("/v2/library/nginx/blobs/{}", digest).as_str())
        .with_status(200)
        .with_body("{\"architecture\":\"arm64\"}")
        .create_async()
        .await;

    let client = Client::new().unwrap();
    let result = client
        .fetch_blob(&server.host_with_port(), "library/nginx", &digest)
        .await;

    assert!(matches!(result.unwrap_err(), ScoutError::Validation { .. }));
}
