//! Marketo target system adapter.
//!
//! Implements `TargetSystemClient` against the Marketo REST and Asset APIs.
//!
//! # Endpoints
//!
//! - `GET  /identity/oauth/token` - client-credentials exchange
//! - `GET  /rest/asset/v1/staticLists.json` - list enumeration (offset paging)
//! - `GET  /rest/asset/v1/staticList/{id}.json` - direct list lookup
//! - `POST /rest/v1/leads.json` - lead upsert by email (ADD)
//! - `POST /rest/v1/leads.json?_method=GET` - lead lookup by email, form body (REMOVE)
//! - `POST /rest/v1/lists/{id}/leads.json` - list membership add / remove
//! - `POST /rest/asset/v1/program/{id}/tokens.json` - program text token
//!
//! # Configuration
//!
//! ```ignore
//! let config = MarketoConfig::new("https://123-ABC-456.mktorest.com");
//! let client = MarketoClient::new(config)?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::wire_types::{
    Envelope, LeadId, LeadInput, LeadRecord, ListMembershipRequest, StaticListRecord,
    TokenResponse, UpsertLeadsRequest,
};
use crate::domain::subscriber::SubscriberIdentity;
use crate::domain::sync::{AccessToken, MembershipAction, StaticList};
use crate::ports::{
    IssuedToken, ListPage, MemberStatus, MembershipResult, ProviderError, TargetError,
    TargetSystemClient, TextTokenUpdate,
};

/// Asset API "no data found" code, returned for unknown asset IDs.
const NO_DATA_FOUND: &str = "702";

/// Lead-level code for a lead that is not on the list.
const LEAD_NOT_IN_LIST: &str = "1015";

/// Marketo API configuration.
#[derive(Debug, Clone)]
pub struct MarketoConfig {
    /// Instance base URL, e.g. `https://123-ABC-456.mktorest.com`.
    base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,
}

impl MarketoConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Marketo REST client.
pub struct MarketoClient {
    config: MarketoConfig,
    http_client: reqwest::Client,
}

impl MarketoClient {
    pub fn new(config: MarketoConfig) -> Result<Self, TargetError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TargetError::Network(e.to_string()))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Sends a request and unwraps the standard response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<Vec<T>, TargetError> {
        let response = request
            .send()
            .await
            .map_err(|e| TargetError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(operation, status = status.as_u16(), error = %body, "Marketo request failed");
            return Err(TargetError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            TargetError::Decode(format!("Failed to parse Marketo {} response: {}", operation, e))
        })?;

        if !envelope.success {
            tracing::warn!(
                operation,
                request_id = envelope.request_id.as_deref().unwrap_or_default(),
                "Marketo reported failure"
            );
        }
        envelope.into_result()
    }

    /// Upserts leads by email and adds the resulting lead IDs to the list.
    async fn add_to_list(
        &self,
        token: &AccessToken,
        list_id: u64,
        identities: &[SubscriberIdentity],
    ) -> Result<Vec<MembershipResult>, TargetError> {
        let body = UpsertLeadsRequest {
            action: "createOrUpdate",
            lookup_field: "email",
            input: identities
                .iter()
                .map(|identity| {
                    let (first_name, last_name) = identity.name_parts();
                    LeadInput {
                        email: identity.email.clone(),
                        first_name: first_name.map(str::to_string),
                        last_name: last_name.map(str::to_string),
                    }
                })
                .collect(),
        };

        let upserted: Vec<LeadRecord> = self
            .send(
                self.http_client
                    .post(self.url("/rest/v1/leads.json"))
                    .bearer_auth(token.expose())
                    .json(&body),
                "upsert_leads",
            )
            .await?;

        // Upsert results are positional.
        let mut results = Vec::with_capacity(identities.len());
        let mut pending: Vec<(u64, String)> = Vec::new();
        for (identity, record) in identities.iter().zip(upserted) {
            match record.id {
                Some(id) if !record.is_skipped() => pending.push((id, identity.email.clone())),
                _ => results.push(MembershipResult::skipped(
                    identity.email.clone(),
                    record.reasons(),
                )),
            }
        }

        results.extend(
            self.change_membership(token, list_id, MembershipAction::Add, pending)
                .await?,
        );
        Ok(results)
    }

    /// Looks up leads by email and removes them from the list.
    async fn remove_from_list(
        &self,
        token: &AccessToken,
        list_id: u64,
        identities: &[SubscriberIdentity],
    ) -> Result<Vec<MembershipResult>, TargetError> {
        let emails: Vec<&str> = identities.iter().map(|i| i.email.as_str()).collect();
        // A full batch of emails overflows the URL limit, so the filter goes in the body.
        let leads: Vec<LeadRecord> = self
            .send(
                self.http_client
                    .post(self.url("/rest/v1/leads.json"))
                    .bearer_auth(token.expose())
                    .query(&[("_method", "GET")])
                    .form(&[
                        ("filterType", "email"),
                        ("filterValues", emails.join(",").as_str()),
                        ("fields", "id,email"),
                    ]),
                "lookup_leads",
            )
            .await?;

        let mut by_email: HashMap<String, u64> = HashMap::new();
        for lead in leads {
            if let (Some(id), Some(email)) = (lead.id, lead.email) {
                by_email.insert(email.to_ascii_lowercase(), id);
            }
        }

        let mut results = Vec::new();
        let mut pending = Vec::new();
        for identity in identities {
            match by_email.get(&identity.email.to_ascii_lowercase()) {
                Some(id) => pending.push((*id, identity.email.clone())),
                // No lead means no membership.
                None => results.push(MembershipResult::new(
                    identity.email.clone(),
                    MemberStatus::NotMember,
                )),
            }
        }

        results.extend(
            self.change_membership(token, list_id, MembershipAction::Remove, pending)
                .await?,
        );
        Ok(results)
    }

    async fn change_membership(
        &self,
        token: &AccessToken,
        list_id: u64,
        action: MembershipAction,
        leads: Vec<(u64, String)>,
    ) -> Result<Vec<MembershipResult>, TargetError> {
        if leads.is_empty() {
            return Ok(Vec::new());
        }

        let body = ListMembershipRequest {
            input: leads.iter().map(|(id, _)| LeadId { id: *id }).collect(),
        };
        let mut request = self
            .http_client
            .post(self.url(&format!("/rest/v1/lists/{}/leads.json", list_id)))
            .bearer_auth(token.expose())
            .json(&body);
        if action == MembershipAction::Remove {
            request = request.query(&[("_method", "DELETE")]);
        }

        let records: Vec<LeadRecord> = self.send(request, "change_membership").await?;
        let by_id: HashMap<u64, LeadRecord> = records
            .into_iter()
            .filter_map(|record| record.id.map(|id| (id, record)))
            .collect();

        Ok(leads
            .into_iter()
            .map(|(id, email)| match by_id.get(&id) {
                Some(record) => membership_result(email, action, record),
                None => MembershipResult::skipped(
                    email,
                    vec![ProviderError::new("missing", "lead absent from list response")],
                ),
            })
            .collect())
    }
}

fn membership_result(email: String, action: MembershipAction, record: &LeadRecord) -> MembershipResult {
    match (record.status.as_deref(), action) {
        (Some("added"), _) => MembershipResult::new(email, MemberStatus::Added),
        (Some("removed"), _) => MembershipResult::new(email, MemberStatus::Removed),
        (Some("notmemberof"), _) => MembershipResult::new(email, MemberStatus::NotMember),
        (Some("skipped"), MembershipAction::Remove)
            if record.reasons().iter().any(|r| r.code == LEAD_NOT_IN_LIST) =>
        {
            MembershipResult::new(email, MemberStatus::NotMember)
        }
        _ => MembershipResult::skipped(email, record.reasons()),
    }
}

#[async_trait]
impl TargetSystemClient for MarketoClient {
    #[instrument(skip(self, client_secret))]
    async fn exchange_credential(
        &self,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<IssuedToken, TargetError> {
        let response = self
            .http_client
            .get(self.url("/identity/oauth/token"))
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|e| TargetError::Network(e.to_string()))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| TargetError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TargetError::CredentialRejected { payload });
        }

        let token: TokenResponse = serde_json::from_str(&payload)
            .map_err(|_| TargetError::CredentialRejected {
                payload: payload.clone(),
            })?;

        match (token.error, token.access_token) {
            (None, Some(access_token)) if !access_token.is_empty() => Ok(IssuedToken {
                access_token: AccessToken::new(access_token),
                expires_in_secs: token.expires_in.unwrap_or_default(),
            }),
            _ => Err(TargetError::CredentialRejected { payload }),
        }
    }

    #[instrument(skip(self, token))]
    async fn list_page(
        &self,
        token: &AccessToken,
        offset: usize,
        limit: usize,
    ) -> Result<ListPage, TargetError> {
        let records: Vec<StaticListRecord> = self
            .send(
                self.http_client
                    .get(self.url("/rest/asset/v1/staticLists.json"))
                    .bearer_auth(token.expose())
                    .query(&[("offset", offset), ("maxReturn", limit)]),
                "list_page",
            )
            .await?;

        let items: Vec<StaticList> = records
            .into_iter()
            .map(|r| StaticList {
                id: r.id,
                name: r.name,
            })
            .collect();
        let has_more = items.len() == limit;
        Ok(ListPage { items, has_more })
    }

    #[instrument(skip(self, token))]
    async fn find_list(
        &self,
        token: &AccessToken,
        list_id: u64,
    ) -> Result<Option<StaticList>, TargetError> {
        let result: Result<Vec<StaticListRecord>, TargetError> = self
            .send(
                self.http_client
                    .get(self.url(&format!("/rest/asset/v1/staticList/{}.json", list_id)))
                    .bearer_auth(token.expose()),
                "find_list",
            )
            .await;

        match result {
            Ok(records) => Ok(records.into_iter().next().map(|r| StaticList {
                id: r.id,
                name: r.name,
            })),
            Err(TargetError::Provider { errors })
                if errors.iter().all(|e| e.code == NO_DATA_FOUND || e.code == "1013") =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, token, identities), fields(count = identities.len()))]
    async fn mutate_membership(
        &self,
        token: &AccessToken,
        list_id: u64,
        action: MembershipAction,
        identities: &[SubscriberIdentity],
    ) -> Result<Vec<MembershipResult>, TargetError> {
        if identities.is_empty() {
            return Ok(Vec::new());
        }
        match action {
            MembershipAction::Add => self.add_to_list(token, list_id, identities).await,
            MembershipAction::Remove => self.remove_from_list(token, list_id, identities).await,
        }
    }

    #[instrument(skip(self, token, update), fields(program_id = update.program_id, name = %update.name))]
    async fn update_text_token(
        &self,
        token: &AccessToken,
        update: &TextTokenUpdate,
    ) -> Result<(), TargetError> {
        let params = [
            ("name", update.name.as_str()),
            ("type", "text"),
            ("value", update.value.as_str()),
            ("folderType", "Program"),
        ];

        let _: Vec<serde_json::Value> = self
            .send(
                self.http_client
                    .post(self.url(&format!(
                        "/rest/asset/v1/program/{}/tokens.json",
                        update.program_id
                    )))
                    .bearer_auth(token.expose())
                    .form(&params),
                "update_text_token",
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Form, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    type Params = Query<HashMap<String, String>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn client(router: Router) -> MarketoClient {
        MarketoClient::new(MarketoConfig::new(serve(router).await)).unwrap()
    }

    fn token() -> AccessToken {
        AccessToken::new("tok")
    }

    /// Echoes every posted lead ID with the given status.
    async fn echo_membership(Query(params): Params, Json(body): Json<Value>) -> Json<Value> {
        let status = if params.get("_method").map(String::as_str) == Some("DELETE") {
            "removed"
        } else {
            "added"
        };
        let result: Vec<Value> = body["input"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|lead| json!({"id": lead["id"], "status": status}))
            .collect();
        Json(json!({"requestId": "r", "success": true, "result": result}))
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = MarketoConfig::new("https://123-ABC-456.mktorest.com/");
        assert_eq!(config.base_url(), "https://123-ABC-456.mktorest.com");
    }

    #[tokio::test]
    async fn exchange_returns_token_and_ttl() {
        let router = Router::new().route(
            "/identity/oauth/token",
            get(|Query(params): Params| async move {
                assert_eq!(params["grant_type"], "client_credentials");
                assert_eq!(params["client_id"], "cid");
                Json(json!({
                    "access_token": "abc",
                    "token_type": "bearer",
                    "expires_in": 3599,
                    "scope": "api@x.com"
                }))
            }),
        );
        let marketo = client(router).await;

        let issued = marketo
            .exchange_credential("cid", &SecretString::new("secret".into()))
            .await
            .unwrap();

        assert_eq!(issued.access_token.expose(), "abc");
        assert_eq!(issued.expires_in_secs, 3599);
    }

    #[tokio::test]
    async fn exchange_error_carries_raw_payload() {
        let router = Router::new().route(
            "/identity/oauth/token",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "unauthorized", "error_description": "Bad client credentials"})),
                )
            }),
        );
        let marketo = client(router).await;

        let err = marketo
            .exchange_credential("cid", &SecretString::new("wrong".into()))
            .await
            .unwrap_err();

        match err {
            TargetError::CredentialRejected { payload } => {
                assert!(payload.contains("Bad client credentials"))
            }
            other => panic!("expected rejected credential, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn exchange_error_in_success_body_carries_raw_payload() {
        let router = Router::new().route(
            "/identity/oauth/token",
            get(|| async {
                Json(json!({"error": "invalid_client", "error_description": "Client id not found"}))
            }),
        );
        let marketo = client(router).await;

        let err = marketo
            .exchange_credential("cid", &SecretString::new("s".into()))
            .await
            .unwrap_err();

        match err {
            TargetError::CredentialRejected { payload } => {
                assert!(payload.contains("invalid_client"));
                assert!(payload.contains("Client id not found"));
            }
            other => panic!("expected rejected credential, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn exchange_without_token_is_rejected() {
        let router = Router::new().route(
            "/identity/oauth/token",
            get(|| async { Json(json!({"token_type": "bearer"})) }),
        );
        let marketo = client(router).await;

        let err = marketo
            .exchange_credential("cid", &SecretString::new("s".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, TargetError::CredentialRejected { .. }));
    }

    #[tokio::test]
    async fn list_page_reports_more_when_full() {
        let router = Router::new().route(
            "/rest/asset/v1/staticLists.json",
            get(|Query(params): Params| async move {
                assert_eq!(params["offset"], "0");
                assert_eq!(params["maxReturn"], "2");
                Json(json!({
                    "success": true,
                    "result": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]
                }))
            }),
        );
        let marketo = client(router).await;

        let page = marketo.list_page(&token(), 0, 2).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn find_list_maps_no_data_to_none() {
        let router = Router::new().route(
            "/rest/asset/v1/staticList/:file",
            get(|| async {
                Json(json!({
                    "success": false,
                    "errors": [{"code": "702", "message": "No data found"}]
                }))
            }),
        );
        let marketo = client(router).await;

        assert!(marketo.find_list(&token(), 9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_token_surfaces_provider_code() {
        let router = Router::new().route(
            "/rest/asset/v1/staticLists.json",
            get(|| async {
                Json(json!({
                    "success": false,
                    "errors": [{"code": "602", "message": "Access token expired"}]
                }))
            }),
        );
        let marketo = client(router).await;

        let err = marketo.list_page(&token(), 0, 200).await.unwrap_err();

        assert_eq!(
            crate::domain::sync::FailureClass::of(&err),
            crate::domain::sync::FailureClass::CredentialExpired
        );
    }

    #[tokio::test]
    async fn add_upserts_then_adds_lead_ids() {
        let router = Router::new()
            .route(
                "/rest/v1/leads.json",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["action"], "createOrUpdate");
                    assert_eq!(body["input"][0]["firstName"], "Ada");
                    Json(json!({
                        "success": true,
                        "result": [
                            {"id": 11, "status": "created"},
                            {"status": "skipped", "reasons": [{"code": "1003", "message": "Invalid email"}]}
                        ]
                    }))
                }),
            )
            .route("/rest/v1/lists/:id/leads.json", post(echo_membership));
        let marketo = client(router).await;
        let identities = vec![
            SubscriberIdentity::new("a@x.com").with_display_name("Ada Lovelace"),
            SubscriberIdentity::new("b@x.com"),
        ];

        let results = marketo
            .mutate_membership(&token(), 42, MembershipAction::Add, &identities)
            .await
            .unwrap();

        let a = results.iter().find(|r| r.email == "a@x.com").unwrap();
        let b = results.iter().find(|r| r.email == "b@x.com").unwrap();
        assert_eq!(a.status, MemberStatus::Added);
        assert_eq!(b.status, MemberStatus::Skipped);
        assert_eq!(b.reasons[0].code, "1003");
    }

    #[tokio::test]
    async fn remove_treats_unknown_lead_as_not_member() {
        let router = Router::new()
            .route(
                "/rest/v1/leads.json",
                post(|Query(params): Params, Form(form): Form<HashMap<String, String>>| async move {
                    assert_eq!(params["_method"], "GET");
                    assert_eq!(form["filterType"], "email");
                    assert_eq!(form["filterValues"], "a@x.com,ghost@x.com");
                    Json(json!({
                        "success": true,
                        "result": [{"id": 5, "email": "a@x.com"}]
                    }))
                }),
            )
            .route("/rest/v1/lists/:id/leads.json", post(echo_membership));
        let marketo = client(router).await;
        let identities = vec![
            SubscriberIdentity::new("a@x.com"),
            SubscriberIdentity::new("ghost@x.com"),
        ];

        let results = marketo
            .mutate_membership(&token(), 42, MembershipAction::Remove, &identities)
            .await
            .unwrap();

        let a = results.iter().find(|r| r.email == "a@x.com").unwrap();
        let ghost = results.iter().find(|r| r.email == "ghost@x.com").unwrap();
        assert_eq!(a.status, MemberStatus::Removed);
        assert_eq!(ghost.status, MemberStatus::NotMember);
    }

    #[tokio::test]
    async fn full_remove_batch_sends_emails_in_form_body() {
        let router = Router::new()
            .route(
                "/rest/v1/leads.json",
                post(|Query(params): Params, Form(form): Form<HashMap<String, String>>| async move {
                    assert!(!params.contains_key("filterValues"));
                    let emails: Vec<&str> = form["filterValues"].split(',').collect();
                    assert_eq!(emails.len(), 300);
                    let result: Vec<Value> = emails
                        .iter()
                        .enumerate()
                        .map(|(i, email)| json!({"id": i + 1, "email": email}))
                        .collect();
                    Json(json!({"success": true, "result": result}))
                }),
            )
            .route("/rest/v1/lists/:id/leads.json", post(echo_membership));
        let marketo = client(router).await;
        let identities: Vec<SubscriberIdentity> = (0..300)
            .map(|i| {
                SubscriberIdentity::new(format!(
                    "release-notes-subscriber-{:03}@long-customer-domain.example.com",
                    i
                ))
            })
            .collect();

        let results = marketo
            .mutate_membership(&token(), 42, MembershipAction::Remove, &identities)
            .await
            .unwrap();

        assert_eq!(results.len(), 300);
        assert!(results.iter().all(|r| r.status == MemberStatus::Removed));
    }

    #[tokio::test]
    async fn http_failure_is_reported_with_status() {
        let router = Router::new().route(
            "/rest/asset/v1/program/:id/tokens.json",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let marketo = client(router).await;
        let update = TextTokenUpdate {
            program_id: 1001,
            name: "my.Release-Notes".into(),
            value: "notes".into(),
        };

        let err = marketo.update_text_token(&token(), &update).await.unwrap_err();

        assert_eq!(
            err,
            TargetError::Http {
                status: 503,
                body: "maintenance".into()
            }
        );
    }
}
