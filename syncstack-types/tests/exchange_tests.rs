use pretty_assertions::assert_eq;
use serde_json::json;
use syncstack_types::{Encoding, Exchange, ExchangeError, Method, PropertyMap, Request, Response};

fn get(url: &str) -> Request {
    Request::new(Method::Get, url, Encoding::Json)
}

// ── Method ────────────────────────────────────────────────────────

#[test]
fn method_display_and_parse() {
    for m in [Method::Get, Method::Post, Method::Put, Method::Delete] {
        let parsed: Method = m.to_string().parse().unwrap();
        assert_eq!(parsed, m);
    }
    assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
    assert!("PATCH".parse::<Method>().is_err());
}

#[test]
fn method_query_placement() {
    assert!(Method::Get.uses_query());
    assert!(Method::Delete.uses_query());
    assert!(!Method::Post.uses_query());
    assert!(!Method::Put.uses_query());
}

#[test]
fn encoding_defaults_to_json() {
    assert_eq!(Encoding::default(), Encoding::Json);
    let parsed: Encoding = serde_json::from_str("\"url\"").unwrap();
    assert_eq!(parsed, Encoding::Url);
}

// ── Request / Response ────────────────────────────────────────────

#[test]
fn request_builder() {
    let mut params = PropertyMap::new();
    params.insert("page".into(), json!(2));
    let mut request = get("http://h/users").with_params(params.clone());
    request.set_header("Authorization", "Bearer t");
    assert_eq!(request.params, Some(params));
    assert_eq!(request.headers.get("Authorization").unwrap(), "Bearer t");
}

#[test]
fn response_success_range() {
    assert!(Response::status(200).is_success());
    assert!(Response::status(204).is_success());
    assert!(!Response::status(301).is_success());
    assert!(!Response::status(404).is_success());
}

// ── Exchange ──────────────────────────────────────────────────────

#[test]
fn exchange_parses_json_body() {
    let ex = Exchange::success(get("u"), Response::status(200), Some(r#"{"id":"101"}"#.into()));
    assert!(ex.is_success());
    assert_eq!(ex.parsed_body(), Some(json!({"id": "101"})));
}

#[test]
fn exchange_empty_or_bad_body_is_none() {
    let empty = Exchange::success(get("u"), Response::status(204), Some("  ".into()));
    assert_eq!(empty.parsed_body(), None);

    let bad = Exchange::success(get("u"), Response::status(200), Some("<html>".into()));
    assert_eq!(bad.parsed_body(), None);

    let none = Exchange::success(get("u"), Response::status(200), None);
    assert_eq!(none.parsed_body(), None);
}

#[test]
fn exchange_failure_carries_error() {
    let ex = Exchange::failure(get("u"), None, ExchangeError::Network("refused".into()));
    assert!(!ex.is_success());
    assert_eq!(ex.error.unwrap().to_string(), "network error: refused");
}

#[test]
fn local_exchange_has_no_response() {
    let ex = Exchange::local(get("u"));
    assert!(ex.is_success());
    assert!(ex.response.is_none());
    assert_eq!(ex.parsed_body(), None);
}
