//! Library API integration tests
use httpmock::prelude::*;
use serde_json::json;
use telepress_core::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new().unwrap().block_on(future)
}

fn client_for(server: &MockServer) -> Telegraph {
    let config = ClientConfig {
        base_url: server.base_url(),
        upload_url: server.url("/upload"),
        ..Default::default()
    };
    Telegraph::with_config(config, None).expect("client should build")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_create_account_stores_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/createAccount")
            .query_param("short_name", "sandbox");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "ok": true,
                "result": {
                    "short_name": "sandbox",
                    "author_name": "Anonymous",
                    "author_url": "",
                    "access_token": "secret-token",
                    "auth_url": "https://edit.telegra.ph/auth/x"
                }
            }));
    });

    let mut client = client_for(&server);
    let account = block_on(client.create_account("sandbox", &AccountDetails::default(), true)).unwrap();

    mock.assert();
    assert_eq!(account.short_name.as_deref(), Some("sandbox"));
    assert_eq!(client.access_token(), Some("secret-token"));
}

#[test]
fn test_create_account_without_renew_keeps_token() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/createAccount");
        then.status(200).json_body(json!({
            "ok": true,
            "result": {"short_name": "other", "access_token": "other-token"}
        }));
    });

    let mut client = client_for(&server);
    block_on(client.create_account("other", &AccountDetails::default(), false)).unwrap();

    assert_eq!(client.access_token(), None);
}

#[test]
fn test_create_page_html_round_trip() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/createPage")
            .json_body_includes(r#"{"title": "Test Article!"}"#);
        then.status(200).json_body(json!({
            "ok": true,
            "result": {
                "path": "Test-Article-12-15",
                "url": "https://telegra.ph/Test-Article-12-15",
                "title": "Test Article!",
                "description": "",
                "views": 0,
                "content": [
                    {"tag": "p", "children": ["This is first paragraph"]},
                    {"tag": "p", "children": [
                        "This is second paragraph with ",
                        {"tag": "strong", "children": ["Bold"]},
                        " text"
                    ]}
                ]
            }
        }));
    });

    let client = client_for(&server);
    let html = concat!(
        "<p>This is first paragraph</p>",
        "<p>This is second paragraph with <strong>Bold</strong> text</p>",
    );
    let options = PageOptions { return_content: true, ..Default::default() };
    let page = block_on(client.create_page_html("Test Article!", html, &options)).unwrap();

    mock.assert();
    assert_eq!(page.path, "Test-Article-12-15");
    assert_eq!(page.content, Some(html_to_nodes(html)));
}

#[test]
fn test_edit_page_posts_to_path() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/editPage/Old-Page-01-01");
        then.status(200).json_body(json!({
            "ok": true,
            "result": {
                "path": "Old-Page-01-01",
                "url": "https://telegra.ph/Old-Page-01-01",
                "title": "Edited",
                "description": "",
                "views": 3
            }
        }));
    });

    let client = client_for(&server);
    let content = vec![Node::with_children("p", vec![NodeChild::text("2+2=4")]).into()];
    let page = block_on(client.edit_page("Old-Page-01-01", "Edited", &content, &PageOptions::default())).unwrap();

    mock.assert();
    assert_eq!(page.title, "Edited");
}

#[test]
fn test_get_page_error_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/getPage/Missing-Page");
        then.status(200).json_body(json!({"ok": false, "error": "PAGE_NOT_FOUND"}));
    });

    let client = client_for(&server);
    let result = block_on(client.get_page("Missing-Page", false));

    match result {
        Err(TelepressError::Api(description)) => assert_eq!(description, "PAGE_NOT_FOUND"),
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[test]
fn test_get_page_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/getPageList")
            .query_param("limit", "10")
            .query_param("offset", "0")
            .query_param("access_token", "tok");
        then.status(200).json_body(json!({
            "ok": true,
            "result": {
                "total_count": 1,
                "pages": [{
                    "path": "Only-Page-01-01",
                    "url": "https://telegra.ph/Only-Page-01-01",
                    "title": "Only Page",
                    "description": "",
                    "views": 5
                }]
            }
        }));
    });

    let config = ClientConfig { base_url: server.base_url(), ..Default::default() };
    let client = Telegraph::with_config(config, Some("tok".to_string())).unwrap();
    let list = block_on(client.get_page_list(10, 0)).unwrap();

    assert_eq!(list.total_count, 1);
    assert_eq!(list.pages[0].title, "Only Page");
}

#[test]
fn test_get_views_with_period() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/getViews/Some-Page-01-01")
            .query_param("year", "2023")
            .query_param("month", "7");
        then.status(200).json_body(json!({"ok": true, "result": {"views": 991}}));
    });

    let client = client_for(&server);
    let period = ViewsPeriod { year: Some(2023), month: Some(7), ..Default::default() };
    let views = block_on(client.get_views("Some-Page-01-01", &period)).unwrap();

    mock.assert();
    assert_eq!(views, 991);
}

#[test]
fn test_revoke_access_token_updates_client() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/revokeAccessToken")
            .query_param("access_token", "old-token");
        then.status(200).json_body(json!({
            "ok": true,
            "result": {"short_name": "sandbox", "access_token": "new-token"}
        }));
    });

    let config = ClientConfig { base_url: server.base_url(), ..Default::default() };
    let mut client = Telegraph::with_config(config, Some("old-token".to_string())).unwrap();
    block_on(client.revoke_access_token()).unwrap();

    assert_eq!(client.access_token(), Some("new-token"));
}

#[test]
fn test_get_account_info_fields() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/getAccountInfo")
            .query_param("fields", r#"["short_name","author_name"]"#);
        then.status(200).json_body(json!({
            "ok": true,
            "result": {"short_name": "sandbox", "author_name": "TestBot"}
        }));
    });

    let client = client_for(&server);
    let account = block_on(client.get_account_info(&["short_name", "author_name"])).unwrap();

    mock.assert();
    assert_eq!(account.author_name.as_deref(), Some("TestBot"));
    assert!(account.author_url.is_none());
}

#[test]
fn test_malformed_response_is_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/getAccountInfo");
        then.status(200).body("<html>gateway timeout</html>");
    });

    let client = client_for(&server);
    let result = block_on(client.get_account_info(&[]));

    assert!(matches!(result, Err(TelepressError::Json(_))));
}

#[test]
fn test_missing_result_payload() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/getAccountInfo");
        then.status(200).json_body(json!({"ok": true}));
    });

    let client = client_for(&server);
    let result = block_on(client.get_account_info(&[]));

    assert!(matches!(result, Err(TelepressError::MissingResult)));
}

#[test]
fn test_upload_bytes() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200).json_body(json!([{"src": "/file/abcdef.png"}]));
    });

    let client = client_for(&server);
    let file = block_on(client.upload_bytes("photo.png", vec![0x89, 0x50, 0x4e, 0x47])).unwrap();

    mock.assert();
    assert_eq!(file.src, "/file/abcdef.png");
    assert_eq!(file.extension(), "png");
}

#[test]
fn test_upload_rejects_unsupported_extension() {
    let server = MockServer::start();
    let client = client_for(&server);

    let result = block_on(client.upload_bytes("malware.exe", vec![0x4d, 0x5a]));
    assert!(matches!(result, Err(TelepressError::UnsupportedExtension(ext)) if ext == "exe"));
}

#[test]
fn test_upload_error_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200).json_body(json!({"error": "File type invalid"}));
    });

    let client = client_for(&server);
    let result = block_on(client.upload_bytes("photo.png", vec![1, 2, 3]));

    assert!(matches!(result, Err(TelepressError::Api(_))));
}

#[test]
fn test_upload_file_not_found() {
    let server = MockServer::start();
    let client = client_for(&server);

    let result = block_on(client.upload_file("/nonexistent/photo.png"));
    assert!(matches!(result, Err(TelepressError::FileNotFound(_))));
}

#[test]
fn test_upload_file_from_disk() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200).json_body(json!([{"src": "/file/ondisk.gif"}]));
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.gif");
    std::fs::write(&path, b"GIF89a").unwrap();

    let client = client_for(&server);
    let file = block_on(client.upload_file(&path)).unwrap();

    assert_eq!(file.src, "/file/ondisk.gif");
}

#[test]
fn test_html_conversion_matches_expected_tree() {
    let html = concat!(
        "<p>This is first paragraph</p>",
        "<p>This is second paragraph with <strong>Bold</strong> text</p>",
        "<p>And this one contains a <blink>restricted</blink> tag</p>",
    );

    let expected: Vec<NodeChild> = vec![
        Node::with_children("p", vec!["This is first paragraph".into()]).into(),
        Node::with_children(
            "p",
            vec![
                "This is second paragraph with ".into(),
                Node::with_children("strong", vec!["Bold".into()]).into(),
                " text".into(),
            ],
        )
        .into(),
        Node::with_children("p", vec!["And this one contains a restricted tag".into()]).into(),
    ];

    assert_eq!(html_to_nodes(html), expected);
}

#[test]
fn test_fixture_article_conversion() {
    let html = std::fs::read_to_string(get_fixture_path("article.html")).unwrap();
    let nodes = html_to_nodes(&html);

    let tags: Vec<&str> = nodes
        .iter()
        .filter_map(NodeChild::as_element)
        .map(|node| node.tag.as_str())
        .collect();
    assert!(tags.contains(&"h3"));
    assert!(tags.contains(&"p"));
    assert!(tags.contains(&"figure"));

    let json = serde_json::to_string(&nodes).unwrap();
    assert!(!json.contains("blink"));
    assert!(!json.contains("onclick"));
    assert!(json.contains("watch?v=dQw4w9WgXcQ"));
}

#[test]
fn test_uploaded_file_into_page_content() {
    let file = UploadedFile { src: "/file/abcdef.jpg".to_string() };
    let content = vec![
        Node::with_children("p", vec![NodeChild::text("Look:")]).into(),
        file.to_node("A photo").into(),
    ];

    let values = serialize_nodes(&content).unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[1]["tag"], "figure");
    assert_eq!(values[1]["children"][0]["tag"], "img");
}
