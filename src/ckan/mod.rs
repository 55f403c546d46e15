//! Client for the remote CKAN action API.
//!
//! Every logical operation maps onto one `GET`/`POST` against
//! `{base}/api/3/action/{action}` and normalizes the CKAN envelope
//! `{ success, result, error }` into a `Result`. Business-rule validation
//! (duplicate names, email format, password strength) is delegated to the
//! remote API; its error message is forwarded unchanged.

use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::CkanConfig;
use crate::session::SessionRecord;

#[derive(Debug, thiserror::Error)]
pub enum CkanError {
    #[error("CKAN URL not configured")]
    UrlNotConfigured,
    #[error("CKAN configuration missing")]
    MissingApiKey,
    /// Remote API reported failure; the message is operator-facing.
    #[error("{0}")]
    Upstream(String),
    #[error("CKAN request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Wire shape of a CKAN action response.
#[derive(Debug, Deserialize)]
struct CkanEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<CkanActionError>,
}

#[derive(Debug, Deserialize)]
struct CkanActionError {
    #[serde(default)]
    message: Option<String>,
}

impl CkanEnvelope {
    fn into_result(self, fallback: &str) -> Result<Value, CkanError> {
        if self.success {
            Ok(self.result)
        } else {
            let message = self
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| fallback.to_string());
            Err(CkanError::Upstream(message))
        }
    }
}

/// One element of the detailed user listing. Enrichment is best-effort: a
/// failed per-user detail call degrades to the summary record instead of
/// aborting the whole list.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEntry {
    Enriched(Value),
    Fallback(Value),
}

impl UserEntry {
    pub fn into_payload(self) -> Value {
        match self {
            UserEntry::Enriched(v) | UserEntry::Fallback(v) => v,
        }
    }
}

/// Entity kind for the organization/group proxy. The two CKAN entity types
/// share one action vocabulary, differing only in the action prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Organization,
    Group,
}

impl EntityKind {
    fn prefix(self) -> &'static str {
        match self {
            EntityKind::Organization => "organization",
            EntityKind::Group => "group",
        }
    }

    /// URL path segment under `/api/`.
    pub fn route_prefix(self) -> &'static str {
        match self {
            EntityKind::Organization => "organizations",
            EntityKind::Group => "groups",
        }
    }

    /// Capitalized noun for success messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Organization => "Organization",
            EntityKind::Group => "Group",
        }
    }

    pub fn noun(self) -> &'static str {
        self.prefix()
    }

    fn action(self, verb: &str) -> String {
        format!("{}_{}", self.prefix(), verb)
    }
}

#[derive(Clone)]
pub struct CkanClient {
    http: reqwest::Client,
    api_url: Option<String>,
    public_url: Option<String>,
    api_key: Option<String>,
}

impl CkanClient {
    pub fn new(config: &CkanConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            public_url: config.public_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Server-side base URL with fallback to the public one. Resolved per
    /// call so the error is raised before any network I/O.
    fn base_url(&self) -> Result<&str, CkanError> {
        self.api_url
            .as_deref()
            .or(self.public_url.as_deref())
            .ok_or(CkanError::UrlNotConfigured)
    }

    fn service_key(&self) -> Result<&str, CkanError> {
        self.api_key.as_deref().ok_or(CkanError::MissingApiKey)
    }

    fn action_url(&self, action: &str) -> Result<String, CkanError> {
        Ok(format!("{}/api/3/action/{}", self.base_url()?, action))
    }

    async fn get_action(
        &self,
        action: &str,
        query: &[(&str, &str)],
        auth: Option<&str>,
        fallback: &str,
    ) -> Result<Value, CkanError> {
        let mut request = self.http.get(self.action_url(action)?).query(query);
        if let Some(key) = auth {
            request = request.header("Authorization", key);
        }

        let envelope: CkanEnvelope = request.send().await?.json().await?;
        envelope.into_result(fallback)
    }

    async fn post_action(
        &self,
        action: &str,
        body: &Value,
        auth: &str,
        fallback: &str,
    ) -> Result<Value, CkanError> {
        let envelope: CkanEnvelope = self
            .http
            .post(self.action_url(action)?)
            .header("Authorization", auth)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_result(fallback)
    }

    /// Checks end-user credentials by fetching the user's own record with
    /// Basic auth. This is the only call that does not use the service key.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionRecord, CkanError> {
        let envelope: CkanEnvelope = self
            .http
            .get(self.action_url("user_show")?)
            .query(&[("id", username)])
            .basic_auth(username, Some(password))
            .send()
            .await?
            .json()
            .await?;

        let user = envelope.into_result("Invalid username or password")?;
        Ok(SessionRecord::from_user(&user))
    }

    pub async fn user_show(&self, username: &str) -> Result<Value, CkanError> {
        self.get_action(
            "user_show",
            &[("id", username)],
            self.api_key.as_deref(),
            "Failed to fetch user",
        )
        .await
    }

    pub async fn user_create(&self, user: &Value) -> Result<Value, CkanError> {
        self.post_action("user_create", user, self.service_key()?, "Failed to create user").await
    }

    pub async fn user_update(&self, patch: &Value) -> Result<Value, CkanError> {
        self.post_action("user_patch", patch, self.service_key()?, "Failed to update user").await
    }

    pub async fn user_delete(&self, username: &str) -> Result<Value, CkanError> {
        let body = json!({ "id": username });
        self.post_action("user_delete", &body, self.service_key()?, "Failed to delete user").await
    }

    /// Lists all users, then fans out one `user_show` per user to enrich the
    /// summary records. The detail calls run concurrently but the output
    /// preserves the input list's order.
    pub async fn user_list_detailed(&self) -> Result<Vec<UserEntry>, CkanError> {
        let listed = self
            .get_action("user_list", &[], self.api_key.as_deref(), "Failed to fetch users")
            .await?;

        let summaries = match listed {
            Value::Array(users) => users,
            _ => return Err(CkanError::Upstream("Failed to fetch users".to_string())),
        };

        let enriched = summaries.iter().map(|summary| async move {
            let name = summary.get("name").and_then(Value::as_str).unwrap_or_default();
            match self.user_show(name).await {
                Ok(detail) => UserEntry::Enriched(detail),
                Err(err) => {
                    tracing::warn!("falling back to summary for user {}: {}", name, err);
                    UserEntry::Fallback(summary.clone())
                }
            }
        });

        Ok(join_all(enriched).await)
    }

    pub async fn entity_create(&self, kind: EntityKind, entity: &Value) -> Result<Value, CkanError> {
        let fallback = format!("Failed to create {}", kind.noun());
        self.post_action(&kind.action("create"), entity, self.service_key()?, &fallback).await
    }

    pub async fn entity_list(&self, kind: EntityKind) -> Result<Value, CkanError> {
        let fallback = format!("Failed to fetch {}s", kind.noun());
        self.get_action(
            &kind.action("list"),
            &[("all_fields", "true")],
            self.api_key.as_deref(),
            &fallback,
        )
        .await
    }

    pub async fn entity_show(&self, kind: EntityKind, name: &str) -> Result<Value, CkanError> {
        let fallback = format!("Failed to fetch {}", kind.noun());
        self.get_action(&kind.action("show"), &[("id", name)], self.api_key.as_deref(), &fallback)
            .await
    }

    pub async fn entity_update(&self, kind: EntityKind, patch: &Value) -> Result<Value, CkanError> {
        let fallback = format!("Failed to update {}", kind.noun());
        self.post_action(&kind.action("patch"), patch, self.service_key()?, &fallback).await
    }

    pub async fn entity_delete(&self, kind: EntityKind, name: &str) -> Result<Value, CkanError> {
        let fallback = format!("Failed to delete {}", kind.noun());
        let body = json!({ "id": name });
        self.post_action(&kind.action("delete"), &body, self.service_key()?, &fallback).await
    }
}
