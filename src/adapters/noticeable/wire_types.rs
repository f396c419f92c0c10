//! Noticeable GraphQL wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::subscriber::{SubscriberIdentity, SubscriberStatus};

pub const SUBSCRIPTIONS_QUERY: &str = r#"
query EmailSubscriptions($projectId: ID!, $first: Int!, $after: String) {
  emailSubscriptions(projectId: $projectId, first: $first, after: $after) {
    pageInfo { hasNextPage endCursor }
    edges { node { email fullName createdAt status isArchived } }
  }
}"#;

pub const SUBSCRIPTION_QUERY: &str = r#"
query EmailSubscription($projectId: ID!, $email: String!) {
  emailSubscription(projectId: $projectId, email: $email) {
    email fullName createdAt status isArchived
  }
}"#;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,

    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionsData {
    pub email_subscriptions: Connection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    #[serde(default)]
    pub email_subscription: Option<SubscriptionNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub page_info: PageInfo,

    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,

    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge {
    pub node: SubscriptionNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionNode {
    pub email: String,

    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub is_archived: Option<bool>,
}

impl From<SubscriptionNode> for SubscriberIdentity {
    fn from(node: SubscriptionNode) -> Self {
        let mut identity = SubscriberIdentity::new(node.email)
            .with_status(
                node.status
                    .as_deref()
                    .map(SubscriberStatus::from_raw)
                    .unwrap_or_default(),
            )
            .archived(node.is_archived.unwrap_or(false));
        if let Some(name) = node.full_name.filter(|n| !n.trim().is_empty()) {
            identity = identity.with_display_name(name);
        }
        if let Some(created_at) = node.created_at {
            identity = identity.with_created_at(created_at);
        }
        identity
    }
}
