//! Tool handler integration tests.
//!
//! Each tool is called through the registry against the mock Confluence
//! server, asserting both the outgoing request and the tool result.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]

mod common;

use common::MockConfluence;
use confluence_mcp::mcp::ToolRegistry;
use serde_json::json;

const CURRENT_PAGE: &str = r#"{
    "id": "123",
    "type": "page",
    "title": "Old Title",
    "space": {"key": "ENG"},
    "body": {"storage": {"value": "<p>old</p>", "representation": "storage"}},
    "version": {"number": 1}
}"#;

fn registry(mock: &MockConfluence) -> ToolRegistry {
    ToolRegistry::new(mock.client())
}

#[tokio::test]
async fn test_get_content_adds_body_expand_and_default_limit() {
    let mock = MockConfluence::start().await;
    mock.respond("GET", "/rest/api/content/123", 200, r#"{"id":"123"}"#);

    let result = registry(&mock)
        .call(
            "confluence_get_content",
            Some(json!({"contentId": "123", "expand": "version"})),
        )
        .await;

    assert!(!result.is_error, "{result:?}");
    assert_eq!(result.text(), Some(r#"{"id":"123"}"#));

    let request = &mock.requests()[0];
    assert_eq!(request.path, "/rest/api/content/123");
    assert_eq!(
        request.query.get("expand").map(String::as_str),
        Some("version,body.storage")
    );
    assert_eq!(request.query.get("limit").map(String::as_str), Some("25"));
}

#[tokio::test]
async fn test_get_content_rejects_traversal_without_request() {
    let mock = MockConfluence::start().await;

    let result = registry(&mock)
        .call("confluence_get_content", Some(json!({"contentId": "../admin"})))
        .await;

    assert!(result.is_error);
    assert_eq!(result.text(), Some("invalid contentId format"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_get_content_remote_error() {
    let mock = MockConfluence::start().await;

    let result = registry(&mock)
        .call("confluence_get_content", Some(json!({"contentId": "999"})))
        .await;

    assert!(result.is_error);
    let text = result.text().unwrap();
    assert!(text.starts_with("error getting content"), "{text}");
    assert!(text.contains("status 404"), "{text}");
}

#[tokio::test]
async fn test_search_content_passes_cql_through() {
    let mock = MockConfluence::start().await;
    mock.respond("GET", "/rest/api/search", 200, r#"{"results":[]}"#);

    let result = registry(&mock)
        .call(
            "confluence_search_content",
            Some(json!({"cql": "type=page AND space=ENG", "limit": 5, "start": 10})),
        )
        .await;

    assert!(!result.is_error, "{result:?}");
    let request = &mock.requests()[0];
    assert_eq!(
        request.query.get("cql").map(String::as_str),
        Some("type=page AND space=ENG")
    );
    assert_eq!(request.query.get("limit").map(String::as_str), Some("5"));
    assert_eq!(request.query.get("start").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn test_search_content_requires_cql() {
    let mock = MockConfluence::start().await;

    let result = registry(&mock)
        .call("confluence_search_content", Some(json!({})))
        .await;

    assert!(result.is_error);
    assert_eq!(result.text(), Some("cql must be a string and is required"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_create_content_payload() {
    let mock = MockConfluence::start().await;
    mock.respond("POST", "/rest/api/content", 200, r#"{"id":"456"}"#);

    let result = registry(&mock)
        .call(
            "confluence_create_content",
            Some(json!({"title": "New", "spaceKey": "ENG", "content": "<p>hi</p>"})),
        )
        .await;

    assert!(!result.is_error, "{result:?}");
    assert_eq!(result.text(), Some(r#"{"id":"456"}"#));
    let body = mock.requests()[0].body.clone().unwrap();
    assert_eq!(
        body,
        json!({
            "type": "page",
            "title": "New",
            "space": {"key": "ENG"},
            "body": {"storage": {"value": "<p>hi</p>", "representation": "storage"}}
        })
    );
}

#[tokio::test]
async fn test_create_content_with_parent() {
    let mock = MockConfluence::start().await;
    mock.respond("POST", "/rest/api/content", 200, r#"{"id":"457"}"#);

    registry(&mock)
        .call(
            "confluence_create_content",
            Some(json!({
                "title": "Post",
                "spaceKey": "ENG",
                "content": "<p>x</p>",
                "type": "blogpost",
                "parentId": "100"
            })),
        )
        .await;

    let body = mock.requests()[0].body.clone().unwrap();
    assert_eq!(body["type"], "blogpost");
    assert_eq!(body["ancestors"], json!([{"id": "100"}]));
}

#[tokio::test]
async fn test_create_content_remote_error() {
    let mock = MockConfluence::start().await;
    mock.respond("POST", "/rest/api/content", 400, "title already exists");

    let result = registry(&mock)
        .call(
            "confluence_create_content",
            Some(json!({"title": "New", "spaceKey": "ENG", "content": "x"})),
        )
        .await;

    assert!(result.is_error);
    let text = result.text().unwrap();
    assert!(text.starts_with("error creating content"), "{text}");
    assert!(text.contains("title already exists"), "{text}");
}

#[tokio::test]
async fn test_update_content_increments_version() {
    let mock = MockConfluence::start().await;
    mock.respond("GET", "/rest/api/content/123", 200, CURRENT_PAGE);
    mock.respond("PUT", "/rest/api/content/123", 200, r#"{"id":"123"}"#);

    let result = registry(&mock)
        .call(
            "confluence_update_content",
            Some(json!({"contentId": "123", "content": "<p>new</p>"})),
        )
        .await;

    assert!(!result.is_error, "{result:?}");

    let gets = mock.requests_with("GET");
    assert_eq!(gets.len(), 1);
    assert_eq!(
        gets[0].query.get("expand").map(String::as_str),
        Some("body.storage,version,space")
    );
    assert!(!gets[0].query.contains_key("limit"));

    let puts = mock.requests_with("PUT");
    assert_eq!(puts.len(), 1);
    let body = puts[0].body.clone().unwrap();
    assert_eq!(body["id"], "123");
    assert_eq!(body["type"], "page");
    assert_eq!(body["title"], "Old Title");
    assert_eq!(body["space"]["key"], "ENG");
    assert_eq!(body["body"]["storage"]["value"], "<p>new</p>");
    assert_eq!(body["version"]["number"], 2);
}

#[tokio::test]
async fn test_update_content_explicit_version_and_comment() {
    let mock = MockConfluence::start().await;
    mock.respond("GET", "/rest/api/content/123", 200, CURRENT_PAGE);
    mock.respond("PUT", "/rest/api/content/123", 200, r#"{"id":"123"}"#);

    registry(&mock)
        .call(
            "confluence_update_content",
            Some(json!({
                "contentId": "123",
                "version": 10,
                "title": "New Title",
                "versionComment": "rewrite"
            })),
        )
        .await;

    let body = mock.requests_with("PUT")[0].body.clone().unwrap();
    assert_eq!(body["title"], "New Title");
    assert_eq!(body["body"]["storage"]["value"], "<p>old</p>");
    assert_eq!(body["version"]["number"], 10);
    assert_eq!(body["version"]["message"], "rewrite");
}

#[tokio::test]
async fn test_update_content_fetch_failure_skips_put() {
    let mock = MockConfluence::start().await;
    mock.respond("GET", "/rest/api/content/123", 403, "forbidden");

    let result = registry(&mock)
        .call("confluence_update_content", Some(json!({"contentId": "123"})))
        .await;

    assert!(result.is_error);
    let text = result.text().unwrap();
    assert!(text.starts_with("failed to retrieve current content"), "{text}");
    assert!(mock.requests_with("PUT").is_empty());
}

#[tokio::test]
async fn test_update_content_without_version_in_response() {
    let mock = MockConfluence::start().await;
    mock.respond(
        "GET",
        "/rest/api/content/123",
        200,
        r#"{"id":"123","type":"page","title":"T"}"#,
    );

    let result = registry(&mock)
        .call("confluence_update_content", Some(json!({"contentId": "123"})))
        .await;

    assert!(result.is_error);
    assert_eq!(
        result.text(),
        Some("could not determine current version from API response")
    );
    assert!(mock.requests_with("PUT").is_empty());
}

#[tokio::test]
async fn test_list_spaces_builds_cql() {
    let mock = MockConfluence::start().await;
    mock.respond("GET", "/rest/api/search", 200, r#"{"results":[]}"#);
    let registry = registry(&mock);

    registry.call("confluence_list_spaces", None).await;
    registry
        .call(
            "confluence_list_spaces",
            Some(json!({"searchText": "Eng \"Core\""})),
        )
        .await;

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].query.get("cql").map(String::as_str),
        Some("type=space")
    );
    assert_eq!(
        requests[1].query.get("cql").map(String::as_str),
        Some(r#"type=space AND title ~ "Eng \"Core\"""#)
    );
}

#[tokio::test]
async fn test_unknown_tool_is_an_error_result() {
    let mock = MockConfluence::start().await;

    let result = registry(&mock).call("confluence_delete_content", None).await;

    assert!(result.is_error);
    assert_eq!(result.text(), Some("Unknown tool: confluence_delete_content"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_get_content_encoded_traversal_stays_under_content() {
    let mock = MockConfluence::start().await;
    let registry = registry(&mock);

    for id in [r"%2e%2e\%2e%2e\%2e%2e\admin", "%2e%2e", ".%2e"] {
        registry
            .call("confluence_get_content", Some(json!({"contentId": id})))
            .await;
    }

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert!(
            request.path.starts_with("/rest/api/content/"),
            "request escaped the API root: {}",
            request.path
        );
    }
    assert_eq!(
        requests[0].path,
        "/rest/api/content/%252e%252e%5C%252e%252e%5C%252e%252e%5Cadmin"
    );
}

#[tokio::test]
async fn test_update_content_encoded_traversal_stays_under_content() {
    let mock = MockConfluence::start().await;

    let result = registry(&mock)
        .call(
            "confluence_update_content",
            Some(json!({"contentId": "%2e%2e", "title": "x"})),
        )
        .await;

    assert!(result.is_error);
    let gets = mock.requests_with("GET");
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].path, "/rest/api/content/%252e%252e");
    assert!(mock.requests_with("PUT").is_empty());
}

#[tokio::test]
async fn test_wrong_typed_optional_argument_fails_the_call() {
    let mock = MockConfluence::start().await;

    let result = registry(&mock)
        .call(
            "confluence_search_content",
            Some(json!({"cql": "type=page", "limit": "10"})),
        )
        .await;

    assert!(result.is_error);
    assert!(result.text().unwrap().starts_with("invalid arguments:"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_unknown_argument_fails_the_call() {
    let mock = MockConfluence::start().await;

    let result = registry(&mock)
        .call(
            "confluence_search_content",
            Some(json!({"cql": "type=page", "pageSize": 10})),
        )
        .await;

    assert!(result.is_error);
    let text = result.text().unwrap();
    assert!(text.starts_with("invalid arguments:"), "{text}");
    assert!(text.contains("pageSize"), "{text}");
    assert!(mock.requests().is_empty());
}
