use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use chrono::{DateTime, Utc};
use common::models::OrderResult;
use common::{RelayError, Settings};
use market_data::remote::secrets_match;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::{Credential, CredentialStore, NewCredential};
use tracing::{info, warn};

use crate::services::DispatchService;

#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<DispatchService>,
    store: Arc<dyn CredentialStore>,
    settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<DispatchService>,
        store: Arc<dyn CredentialStore>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            dispatcher,
            store,
            settings,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/credentials", get(list_credentials).post(add_credential))
        .route("/credentials/{id}", delete(delete_credential))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/", get(ping))
        .route("/webhook/{token}", post(webhook))
        .nest("/admin", admin)
        .with_state(state)
}

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_response(err: RelayError) -> Response {
    let result = OrderResult::from(&err);
    (status_of(result.code), Json(result)).into_response()
}

async fn ping() -> &'static str {
    info!("PING...");
    "Binance webhook relay is live"
}

/// The body is passed on as raw bytes: the token is checked before any
/// parsing happens.
async fn webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<OrderResult>) {
    let result = state.dispatcher.handle(&token, &body).await;
    (status_of(result.code), Json(result))
}

fn presented_admin_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(bearer.trim());
    }
    headers
        .get("X-Admin-Token")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.settings.admin_token.as_deref() else {
        warn!("Admin request refused: ADMIN_TOKEN is not configured");
        return error_response(RelayError::Unauthorized);
    };
    let accepted = presented_admin_token(&headers)
        .is_some_and(|presented| secrets_match(presented, expected));
    if !accepted {
        warn!(path = %request.uri().path(), "Admin request with invalid token");
        return error_response(RelayError::Unauthorized);
    }
    next.run(request).await
}

/// Admin listing. The secret is never echoed back in full.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialView {
    id: i64,
    api_key: String,
    api_secret: String,
    webhook_token: Option<String>,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Credential> for CredentialView {
    fn from(c: Credential) -> Self {
        let tail: String = {
            let chars: Vec<char> = c.api_secret.chars().collect();
            chars[chars.len().saturating_sub(4)..].iter().collect()
        };
        Self {
            id: c.id,
            api_key: c.api_key,
            api_secret: format!("***{}", tail),
            webhook_token: c.webhook_token,
            display_name: c.display_name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddCredentialRequest {
    #[serde(rename = "apiKey", alias = "api_key")]
    api_key: Option<String>,
    #[serde(rename = "apiSecret", alias = "api_secret")]
    api_secret: Option<String>,
    #[serde(rename = "webhookToken", alias = "webhook_token", alias = "token", default)]
    webhook_token: Option<String>,
    #[serde(alias = "displayName", alias = "display_name", default)]
    name: Option<String>,
}

fn store_failure(err: RelayError) -> Response {
    let status = status_of(err.status_code());
    (
        status,
        Json(json!({"success": false, "error": err.public_message()})),
    )
        .into_response()
}

async fn list_credentials(State(state): State<AppState>) -> Response {
    match state.store.list_all().await {
        Ok(records) => {
            let views: Vec<CredentialView> = records.into_iter().map(CredentialView::from).collect();
            Json(views).into_response()
        }
        Err(e) => store_failure(e.into()),
    }
}

async fn add_credential(
    State(state): State<AppState>,
    payload: Result<Json<AddCredentialRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => {
            return store_failure(RelayError::BadRequest(rejection.body_text()));
        }
    };
    let (Some(api_key), Some(api_secret)) = (req.api_key, req.api_secret) else {
        return store_failure(RelayError::BadRequest(
            "apiKey and apiSecret are required".to_string(),
        ));
    };

    let new = NewCredential {
        api_key,
        api_secret,
        webhook_token: req.webhook_token,
        display_name: req.name,
    };
    match state.store.add(new).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({"success": true, "id": id})),
        )
            .into_response(),
        Err(e) => store_failure(e.into()),
    }
}

async fn delete_credential(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.store.delete_by_id(id).await {
        Ok(changes) => {
            info!(id, changes, "Credential deleted via admin API");
            Json(json!({"success": true, "changes": changes})).into_response()
        }
        Err(e) => store_failure(e.into()),
    }
}
