//! # HTTP Collaborator
//!
//! [`HttpApi`] implements every collaborator trait over the REST backend
//! with `reqwest`.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  trait call ──► url(base, path) ──► + Bearer token ──► send            │
//! │                                                                         │
//! │  response                                                              │
//! │    ├── 2xx ─────────► body ──► Envelope: bare T  or  { "data": T }     │
//! │    ├── 401 ─────────► ApiError::Unauthorized                           │
//! │    └── other ───────► ApiError::Remote { status, message }             │
//! │                         message = body.message (string | [strings])    │
//! │                                 | body.error | body.detail             │
//! │                                 | raw body | reason phrase              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Endpoints
//! | Operation       | Request                                  |
//! |-----------------|------------------------------------------|
//! | list            | `GET {collection}`                       |
//! | create          | `POST {collection}`                      |
//! | update          | `PATCH`/`PUT {collection}/{id}`          |
//! | remove          | `DELETE {collection}/{id}`               |
//! | warehouse stock | `GET warehouses/{id}/stock`              |
//! | save stock      | `PUT warehouses/{id}/stock`              |
//! | dashboard       | `GET dashboard`                          |
//! | login / logout  | `POST auth/login`, `POST auth/logout`    |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{Credentials, LoginResponse, Session, SessionStore};
use crate::client::{AuthApi, DashboardApi, EntityApi, StockApi};
use crate::config::{ClientConfig, UpdateMethod};
use crate::error::{ApiError, ApiResult};
use stockflow_core::{DashboardSummary, Entity, Stock, StockSheet};

/// Longest raw body used as an error message.
const MAX_RAW_MESSAGE_LEN: usize = 300;

// =============================================================================
// Response Envelope
// =============================================================================

/// A success body, bare or wrapped in `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.into_inner())
}

// =============================================================================
// Error Messages
// =============================================================================

/// Human-readable message of an error response.
///
/// Looks at `message` (a string, or an array of strings joined with `, `),
/// then `error`, then `detail`, descending into nested objects. Falls back
/// to a short non-HTML body, then to the status reason phrase.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = message_from_value(&value) {
            return message;
        }
    }

    let raw = body.trim();
    if !raw.is_empty() && raw.len() <= MAX_RAW_MESSAGE_LEN && !raw.starts_with('<') && !raw.starts_with('{') {
        return raw.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => ["message", "error", "detail"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(message_from_value),
        _ => None,
    }
}

// =============================================================================
// HttpApi
// =============================================================================

/// The REST backend.
///
/// Cheap to clone: the `reqwest` client and the session slot are shared.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    update_method: UpdateMethod,
    session: SessionStore,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            update_method: config.api.update_method,
            session: SessionStore::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends `request` with the bearer token and returns the success body.
    async fn send(&self, request: RequestBuilder) -> ApiResult<String> {
        let request = match self.session.bearer().await {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), path = %url, "Request succeeded");
            return Ok(body);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %url, "Backend rejected the session");
            return Err(ApiError::Unauthorized);
        }

        let message = extract_error_message(status, &body);
        warn!(status = status.as_u16(), path = %url, message = %message, "Backend rejected request");
        Err(ApiError::remote(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let body = self.send(self.client.get(self.url(path))).await?;
        decode(&body)
    }
}

// =============================================================================
// Entity Collections
// =============================================================================

#[async_trait]
impl<T: Entity> EntityApi<T> for HttpApi {
    async fn list(&self) -> ApiResult<Vec<T>> {
        let items: Vec<T> = self.get_json(T::KIND.collection()).await?;
        debug!(entity = %T::KIND, count = items.len(), "Fetched collection");
        Ok(items)
    }

    async fn create(&self, payload: &T::Payload) -> ApiResult<T> {
        let request = self.client.post(self.url(T::KIND.collection())).json(payload);
        let created: T = decode(&self.send(request).await?)?;
        info!(entity = %T::KIND, id = %created.id(), "Created");
        Ok(created)
    }

    async fn update(&self, id: &str, payload: &T::Payload) -> ApiResult<T> {
        let url = self.url(&format!("{}/{}", T::KIND.collection(), id));
        let request = match self.update_method {
            UpdateMethod::Patch => self.client.patch(url),
            UpdateMethod::Put => self.client.put(url),
        };
        let updated: T = decode(&self.send(request.json(payload)).await?)?;
        info!(entity = %T::KIND, id = %id, "Updated");
        Ok(updated)
    }

    async fn remove(&self, id: &str) -> ApiResult<()> {
        let url = self.url(&format!("{}/{}", T::KIND.collection(), id));
        self.send(self.client.delete(url)).await?;
        info!(entity = %T::KIND, id = %id, "Deleted");
        Ok(())
    }
}

// =============================================================================
// Stock, Dashboard, Auth
// =============================================================================

#[async_trait]
impl StockApi for HttpApi {
    async fn warehouse_stock(&self, warehouse_id: &str) -> ApiResult<Vec<Stock>> {
        self.get_json(&format!("warehouses/{}/stock", warehouse_id)).await
    }

    async fn save_stock(&self, sheet: &StockSheet) -> ApiResult<Vec<Stock>> {
        let url = self.url(&format!("warehouses/{}/stock", sheet.warehouse_id));
        let body = self.send(self.client.put(url).json(sheet)).await?;
        info!(warehouse = %sheet.warehouse_id, rows = sheet.quantities.len(), "Stock saved");

        // Some backends answer 204; the sheet is then the stored state.
        if body.trim().is_empty() {
            return Ok(sheet.to_stocks());
        }
        decode(&body)
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn dashboard(&self) -> ApiResult<DashboardSummary> {
        self.get_json("dashboard").await
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        let request = self.client.post(self.url("auth/login")).json(credentials);
        let body = self.send(request).await?;
        let response = LoginResponse::parse(&body)?;

        let session = Session::new(response.token, response.user);
        self.session.set(session.clone()).await;
        info!(email = %credentials.email, "Logged in");
        Ok(session)
    }

    async fn logout(&self) -> ApiResult<()> {
        if !self.session.is_authenticated().await {
            return Ok(());
        }

        let result = self.send(self.client.post(self.url("auth/logout"))).await;
        self.session.clear().await;

        match result {
            Ok(_) => {
                info!("Logged out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Logout request failed; session dropped locally");
                Err(e)
            }
        }
    }

    async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }
}
