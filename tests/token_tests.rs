//! OAuth credential lifecycle tests: storing grants and refreshing tokens.

use chrono::{Duration, Utc};
use sea_orm::EntityTrait;

mod common;
use common::*;

use hubsync::models::oauth_data;
use hubsync::models::prelude::*;
use hubsync::services::hubspot::{
    ensure_fresh, insert_grant, update_safely, CredentialHandle, CrmError, VendorError,
};

async fn load(db: &sea_orm::DatabaseConnection, id: i64) -> oauth_data::Model {
    OauthData::find_by_id(id).one(db).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_insert_grant_creates_empty_row() {
    let db = create_test_db().await;

    let row = insert_grant(&db, oauth_data::OAUTH_DATA_TOKEN_TYPE_OAUTH)
        .await
        .unwrap();

    assert_eq!(row.token_type, "oauth");
    assert!(row.access_token.is_none());
    assert!(row.refresh_token.is_none());
    assert!(row.expires_at.is_none());
}

#[tokio::test]
async fn test_update_safely_stores_tokens_with_margin() {
    let db = create_test_db().await;
    let row = insert_grant(&db, "oauth").await.unwrap();

    let before = Utc::now();
    let updated = update_safely(
        &db,
        row.id,
        Some(REFRESH_TOKEN),
        Some("access-1"),
        Some(1800),
    )
    .await
    .unwrap();

    assert_eq!(updated.refresh_token.as_deref(), Some(REFRESH_TOKEN));
    assert_eq!(updated.access_token.as_deref(), Some("access-1"));
    assert!(updated.refreshed_at.is_some());
    let expires_at = updated.expires_at.unwrap();
    assert!(expires_at >= before + Duration::seconds(1740));
    assert!(expires_at <= Utc::now() + Duration::seconds(1740));
}

#[tokio::test]
async fn test_update_safely_zero_expiry_forces_refresh() {
    let db = create_test_db().await;
    let row = create_fresh_oauth_data(&db).await;

    let updated = update_safely(&db, row.id, Some(REFRESH_TOKEN), None, Some(0))
        .await
        .unwrap();

    assert!(updated.expires_at.is_none());
    assert!(updated.access_token.is_none());
}

#[tokio::test]
async fn test_update_safely_accepts_non_uuid_refresh_token() {
    let db = create_test_db().await;
    let row = insert_grant(&db, "oauth").await.unwrap();

    let updated = update_safely(&db, row.id, Some("na1-not-a-uuid"), Some("a"), None)
        .await
        .unwrap();

    assert_eq!(updated.refresh_token.as_deref(), Some("na1-not-a-uuid"));
}

#[tokio::test]
async fn test_update_safely_missing_row() {
    let db = create_test_db().await;

    let result = update_safely(&db, 999, Some(REFRESH_TOKEN), None, None).await;

    assert!(matches!(result, Err(sea_orm::DbErr::RecordNotFound(_))));
}

#[tokio::test]
async fn test_fresh_token_is_reused_without_refresh() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    let row = create_fresh_oauth_data(&db).await;
    let mut handle = CredentialHandle::new(row.id);

    let token = ensure_fresh(&db, api.as_ref(), &mut handle).await.unwrap();

    assert_eq!(token, "access-stored");
    assert_eq!(api.refresh_count(), 0);
    assert_eq!(handle.expires_at(), row.expires_at);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_exactly_once() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    let row = create_expired_oauth_data(&db).await;
    let mut handle = CredentialHandle::new(row.id);

    let before = Utc::now();
    let token = ensure_fresh(&db, api.as_ref(), &mut handle).await.unwrap();
    assert_eq!(token, "access-refreshed");

    // Second use within validity does not refresh again
    let again = ensure_fresh(&db, api.as_ref(), &mut handle).await.unwrap();
    assert_eq!(again, "access-refreshed");
    assert_eq!(api.refresh_count(), 1);

    let stored = load(&db, row.id).await;
    assert_eq!(stored.access_token.as_deref(), Some("access-refreshed"));
    assert_eq!(stored.refresh_token.as_deref(), Some(REFRESH_TOKEN));
    let expires_at = stored.expires_at.unwrap();
    assert!(expires_at >= before + Duration::seconds(1500));
    assert!(expires_at <= Utc::now() + Duration::seconds(1500));
    assert_eq!(handle.expires_at(), Some(expires_at));
}

#[tokio::test]
async fn test_row_without_expiry_is_refreshed() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    let row = create_oauth_data(&db, Some("access-unknown"), Some(REFRESH_TOKEN), None).await;
    let mut handle = CredentialHandle::new(row.id);

    let token = ensure_fresh(&db, api.as_ref(), &mut handle).await.unwrap();

    assert_eq!(token, "access-refreshed");
    assert_eq!(api.refresh_count(), 1);
}

#[tokio::test]
async fn test_rotated_refresh_token_is_persisted() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    api.set_refresh(Ok(grant("access-rotated", ROTATED_REFRESH_TOKEN, 1800)));
    let row = create_expired_oauth_data(&db).await;
    let mut handle = CredentialHandle::new(row.id);

    ensure_fresh(&db, api.as_ref(), &mut handle).await.unwrap();

    let stored = load(&db, row.id).await;
    assert_eq!(stored.refresh_token.as_deref(), Some(ROTATED_REFRESH_TOKEN));
    assert_eq!(stored.access_token.as_deref(), Some("access-rotated"));
}

#[tokio::test]
async fn test_refresh_failure_is_auth_error() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    api.set_refresh(Err(VendorError::new(
        400,
        r#"{"status":"BAD_REFRESH_TOKEN","message":"missing or unknown refresh token"}"#,
    )));
    let row = create_expired_oauth_data(&db).await;
    let mut handle = CredentialHandle::new(row.id);

    let err = ensure_fresh(&db, api.as_ref(), &mut handle)
        .await
        .unwrap_err();

    match err {
        CrmError::Auth { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "missing or unknown refresh token");
        }
        other => panic!("Expected auth error, got {:?}", other),
    }
    // The stale token is left untouched
    let stored = load(&db, row.id).await;
    assert_eq!(stored.access_token.as_deref(), Some("access-stale"));
}

#[tokio::test]
async fn test_out_of_range_refresh_expiry_is_auth_error() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    api.set_refresh(Ok(grant("access-x", REFRESH_TOKEN, i64::MAX)));
    let row = create_expired_oauth_data(&db).await;
    let mut handle = CredentialHandle::new(row.id);

    let err = ensure_fresh(&db, api.as_ref(), &mut handle)
        .await
        .unwrap_err();

    assert!(matches!(err, CrmError::Auth { status: 502, .. }));
    assert_eq!(api.refresh_count(), 1);
    let stored = load(&db, row.id).await;
    assert_eq!(stored.access_token.as_deref(), Some("access-stale"));
}

#[tokio::test]
async fn test_update_safely_out_of_range_expiry_forces_refresh() {
    let db = create_test_db().await;
    let row = insert_grant(&db, "oauth").await.unwrap();

    let updated = update_safely(
        &db,
        row.id,
        Some(REFRESH_TOKEN),
        Some("access-1"),
        Some(i64::MAX / 2),
    )
    .await
    .unwrap();

    assert_eq!(updated.access_token.as_deref(), Some("access-1"));
    assert!(updated.expires_at.is_none());
}

#[tokio::test]
async fn test_missing_refresh_token_is_auth_error() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    let row = create_oauth_data(&db, None, None, None).await;
    let mut handle = CredentialHandle::new(row.id);

    let err = ensure_fresh(&db, api.as_ref(), &mut handle)
        .await
        .unwrap_err();

    assert!(matches!(err, CrmError::Auth { status: 401, .. }));
    assert_eq!(api.refresh_count(), 0);
}

#[tokio::test]
async fn test_empty_refresh_token_is_not_sent_to_hubspot() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    let row = insert_grant(&db, "oauth").await.unwrap();
    let updated = update_safely(&db, row.id, Some(""), Some("access-1"), Some(0))
        .await
        .unwrap();
    assert!(updated.refresh_token.is_none());

    let mut handle = CredentialHandle::new(row.id);
    let err = ensure_fresh(&db, api.as_ref(), &mut handle)
        .await
        .unwrap_err();

    assert!(matches!(err, CrmError::Auth { status: 401, .. }));
    assert_eq!(api.refresh_count(), 0);
}

#[tokio::test]
async fn test_unknown_credential_is_store_error() {
    let db = create_test_db().await;
    let api = FakeHubspotApi::new();
    let mut handle = CredentialHandle::new(42);

    let err = ensure_fresh(&db, api.as_ref(), &mut handle)
        .await
        .unwrap_err();

    assert!(matches!(err, CrmError::Store(_)));
    assert_eq!(err.status(), 500);
}
