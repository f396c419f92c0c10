//! Membership actions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Desired change to a subscriber's list membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipAction {
    Add,
    Remove,
}

impl fmt::Display for MembershipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipAction::Add => write!(f, "add"),
            MembershipAction::Remove => write!(f, "remove"),
        }
    }
}
