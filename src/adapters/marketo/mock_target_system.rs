//! Mock target system for testing.
//!
//! In-memory implementation of `TargetSystemClient` for unit and integration
//! tests. Supports:
//! - Static lists and their memberships
//! - Scripted per-method error queues (consumed one per call)
//! - Per-email record rejection
//! - Call tracking

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::subscriber::SubscriberIdentity;
use crate::domain::sync::{AccessToken, MembershipAction, StaticList};
use crate::ports::{
    IssuedToken, ListPage, MemberStatus, MembershipResult, ProviderError, TargetError,
    TargetSystemClient, TextTokenUpdate,
};

/// Mock target system.
///
/// # Example
///
/// ```ignore
/// let mock = MockTargetSystem::new().with_list(42, "Newsletter");
///
/// // Expire the token on the next mutation
/// mock.push_error("mutate_membership", TargetError::provider("602", "expired"));
///
/// assert_eq!(mock.call_count("exchange_credential"), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockTargetSystem {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Static lists in page order.
    lists: Vec<StaticList>,

    /// Members by list ID.
    members: HashMap<u64, HashSet<String>>,

    /// TTL reported by credential exchanges.
    token_ttl_secs: Option<i64>,

    /// Number of tokens issued so far.
    issued: usize,

    /// Errors consumed one per call, by method name.
    queued_errors: HashMap<String, VecDeque<TargetError>>,

    /// Errors returned on every call, by method name.
    persistent_errors: HashMap<String, TargetError>,

    /// Emails the provider skips on mutation.
    rejected_emails: HashSet<String>,

    /// Text tokens written.
    text_tokens: Vec<TextTokenUpdate>,

    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

impl MockTargetSystem {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add a static list (builder form).
    pub fn with_list(self, id: u64, name: &str) -> Self {
        self.add_list(id, name);
        self
    }

    /// Append a static list after the existing ones.
    pub fn add_list(&self, id: u64, name: &str) {
        self.inner.lock().unwrap().lists.push(StaticList {
            id,
            name: name.to_string(),
        });
    }

    /// Make `email` a member of `list_id`.
    pub fn add_member(&self, list_id: u64, email: &str) {
        self.inner
            .lock()
            .unwrap()
            .members
            .entry(list_id)
            .or_default()
            .insert(email.to_string());
    }

    /// Set the TTL reported by credential exchanges.
    pub fn set_token_ttl(&self, secs: i64) {
        self.inner.lock().unwrap().token_ttl_secs = Some(secs);
    }

    /// Queue an error for the next call to `method`.
    pub fn push_error(&self, method: &str, error: TargetError) {
        self.inner
            .lock()
            .unwrap()
            .queued_errors
            .entry(method.to_string())
            .or_default()
            .push_back(error);
    }

    /// Fail every call to `method` until cleared.
    pub fn fail_always(&self, method: &str, error: TargetError) {
        self.inner
            .lock()
            .unwrap()
            .persistent_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.queued_errors.clear();
        state.persistent_errors.clear();
    }

    /// Have the provider skip mutations for `email`.
    pub fn reject_email(&self, email: &str) {
        self.inner
            .lock()
            .unwrap()
            .rejected_emails
            .insert(email.to_string());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection
    // ════════════════════════════════════════════════════════════════════════════

    /// Members of a list, sorted.
    pub fn members(&self, list_id: u64) -> Vec<String> {
        let state = self.inner.lock().unwrap();
        let mut members: Vec<String> = state
            .members
            .get(&list_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    pub fn is_member(&self, list_id: u64, email: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .members
            .get(&list_id)
            .is_some_and(|set| set.contains(email))
    }

    pub fn text_tokens(&self) -> Vec<TextTokenUpdate> {
        self.inner.lock().unwrap().text_tokens.clone()
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Recorded `mutate_membership` calls as (action, emails).
    pub fn mutations(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "mutate_membership")
            .map(|c| {
                let action = c.args.get(1).cloned().unwrap_or_default();
                let emails = c.args.iter().skip(2).cloned().collect();
                (action, emails)
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), TargetError> {
        let mut state = self.inner.lock().unwrap();

        if let Some(error) = state.persistent_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state
            .queued_errors
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl TargetSystemClient for MockTargetSystem {
    async fn exchange_credential(
        &self,
        client_id: &str,
        _client_secret: &SecretString,
    ) -> Result<IssuedToken, TargetError> {
        self.record_call("exchange_credential", vec![client_id.to_string()]);
        self.check_error("exchange_credential")?;

        let mut state = self.inner.lock().unwrap();
        state.issued += 1;
        Ok(IssuedToken {
            access_token: AccessToken::new(format!("mock-token-{}", state.issued)),
            expires_in_secs: state.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        })
    }

    async fn list_page(
        &self,
        _token: &AccessToken,
        offset: usize,
        limit: usize,
    ) -> Result<ListPage, TargetError> {
        self.record_call("list_page", vec![offset.to_string(), limit.to_string()]);
        self.check_error("list_page")?;

        let state = self.inner.lock().unwrap();
        let items: Vec<StaticList> = state.lists.iter().skip(offset).take(limit).cloned().collect();
        let has_more = items.len() == limit;
        Ok(ListPage { items, has_more })
    }

    async fn find_list(
        &self,
        _token: &AccessToken,
        list_id: u64,
    ) -> Result<Option<StaticList>, TargetError> {
        self.record_call("find_list", vec![list_id.to_string()]);
        self.check_error("find_list")?;

        let state = self.inner.lock().unwrap();
        Ok(state.lists.iter().find(|l| l.id == list_id).cloned())
    }

    async fn mutate_membership(
        &self,
        _token: &AccessToken,
        list_id: u64,
        action: MembershipAction,
        identities: &[SubscriberIdentity],
    ) -> Result<Vec<MembershipResult>, TargetError> {
        let mut args = vec![list_id.to_string(), action.to_string()];
        args.extend(identities.iter().map(|i| i.email.clone()));
        self.record_call("mutate_membership", args);
        self.check_error("mutate_membership")?;

        let mut state = self.inner.lock().unwrap();
        if !state.lists.iter().any(|l| l.id == list_id) {
            return Err(TargetError::provider("1013", "Static list not found"));
        }

        let rejected = state.rejected_emails.clone();
        let members = state.members.entry(list_id).or_default();
        let results = identities
            .iter()
            .map(|identity| {
                let email = identity.email.clone();
                if rejected.contains(&email) {
                    let reason = ProviderError::new("1003", "Invalid email address");
                    return MembershipResult::skipped(email, vec![reason]);
                }
                let status = match action {
                    MembershipAction::Add => {
                        members.insert(email.clone());
                        MemberStatus::Added
                    }
                    MembershipAction::Remove if members.remove(&email) => MemberStatus::Removed,
                    MembershipAction::Remove => MemberStatus::NotMember,
                };
                MembershipResult::new(email, status)
            })
            .collect();

        Ok(results)
    }

    async fn update_text_token(
        &self,
        _token: &AccessToken,
        update: &TextTokenUpdate,
    ) -> Result<(), TargetError> {
        self.record_call(
            "update_text_token",
            vec![update.program_id.to_string(), update.name.clone()],
        );
        self.check_error("update_text_token")?;

        self.inner.lock().unwrap().text_tokens.push(update.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AccessToken {
        AccessToken::new("t")
    }

    #[tokio::test]
    async fn pages_report_more_only_when_full() {
        let mock = MockTargetSystem::new();
        for id in 0..5 {
            mock.add_list(id, &format!("List {}", id));
        }

        let first = mock.list_page(&token(), 0, 3).await.unwrap();
        assert_eq!(first.items.len(), 3);
        assert!(first.has_more);

        let second = mock.list_page(&token(), 3, 3).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn add_is_idempotent_and_remove_of_non_member_reports_not_member() {
        let mock = MockTargetSystem::new().with_list(1, "L");
        let alice = [SubscriberIdentity::new("a@x.com")];

        mock.mutate_membership(&token(), 1, MembershipAction::Add, &alice)
            .await
            .unwrap();
        mock.mutate_membership(&token(), 1, MembershipAction::Add, &alice)
            .await
            .unwrap();
        assert_eq!(mock.members(1), vec!["a@x.com".to_string()]);

        let bob = [SubscriberIdentity::new("b@x.com")];
        let results = mock
            .mutate_membership(&token(), 1, MembershipAction::Remove, &bob)
            .await
            .unwrap();
        assert_eq!(results[0].status, MemberStatus::NotMember);
    }

    #[tokio::test]
    async fn queued_errors_are_consumed_in_order() {
        let mock = MockTargetSystem::new();
        mock.push_error("find_list", TargetError::Network("first".into()));

        assert!(mock.find_list(&token(), 1).await.is_err());
        assert!(mock.find_list(&token(), 1).await.unwrap().is_none());
        assert_eq!(mock.call_count("find_list"), 2);
    }

    #[tokio::test]
    async fn unknown_list_reports_object_not_found() {
        let mock = MockTargetSystem::new();
        let err = mock
            .mutate_membership(
                &token(),
                9,
                MembershipAction::Add,
                &[SubscriberIdentity::new("a@x.com")],
            )
            .await
            .unwrap_err();
        assert_eq!(err, TargetError::provider("1013", "Static list not found"));
    }

    #[tokio::test]
    async fn exchanges_issue_distinct_tokens() {
        let mock = MockTargetSystem::new();
        let secret = SecretString::new("s".into());
        let first = mock.exchange_credential("id", &secret).await.unwrap();
        let second = mock.exchange_credential("id", &secret).await.unwrap();
        assert_ne!(first.access_token.expose(), second.access_token.expose());
        assert_eq!(first.expires_in_secs, 3600);
    }
}
