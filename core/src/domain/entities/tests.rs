//! Unit tests for token entities

use chrono::{Duration, Utc};

use crate::domain::entities::token::{TokenRecord, TokenRequest};
use crate::domain::value_objects::ScopeSet;

fn record_with_ttl(seconds: i64, scopes: Option<ScopeSet>) -> TokenRecord {
    TokenRecord::new(
        "a".repeat(32),
        "b".repeat(32),
        "1234".to_string(),
        "oauth".to_string(),
        scopes,
        Utc::now(),
        Duration::seconds(seconds),
    )
}

#[test]
fn test_record_expiry_boundary() {
    let record = record_with_ttl(60, None);
    assert_eq!(record.expires_at - record.created_at, Duration::seconds(60));
    assert!(!record.is_expired_at(record.created_at));
    assert!(!record.is_expired_at(record.expires_at - Duration::seconds(1)));
    // expiresAt itself is already expired
    assert!(record.is_expired_at(record.expires_at));
}

#[test]
fn test_zero_ttl_record_is_born_expired() {
    let record = record_with_ttl(0, None);
    assert_eq!(record.created_at, record.expires_at);
    assert!(record.is_expired_at(record.created_at));
}

#[test]
fn test_view_omits_scopes_for_scopeless_tokens() {
    let view = record_with_ttl(60, None).to_view();
    assert_eq!(view.scopes, None);

    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("scopes").is_none());
    assert_eq!(json["consumerId"], "1234");
    assert_eq!(json["tokenDecrypted"], "b".repeat(32));
    assert!(json.get("createdAt").is_some());
    assert!(json.get("expiresAt").is_some());
}

#[test]
fn test_view_keeps_canonical_scopes() {
    let scopes = ScopeSet::new(["scope3", "scope1", "scope2"]).unwrap();
    let view = record_with_ttl(60, Some(scopes)).to_view();
    assert_eq!(
        view.scopes,
        Some(vec!["scope1".to_string(), "scope2".to_string(), "scope3".to_string()])
    );
}

#[test]
fn test_debug_redacts_secret() {
    let record = record_with_ttl(60, None);
    let debug = format!("{:?}", record);
    assert!(debug.contains("<redacted>"));
    assert!(!debug.contains(&"b".repeat(32)));
}

#[test]
fn test_request_builder_and_wire_format() {
    let request = TokenRequest::new("1234", "oauth").with_scopes(["scope1", "scope2"]);
    assert_eq!(request.scopes.as_ref().map(Vec::len), Some(2));

    let parsed: TokenRequest =
        serde_json::from_str(r#"{"consumerId":"1234","authType":"oauth"}"#).unwrap();
    assert_eq!(parsed, TokenRequest::new("1234", "oauth"));
}
