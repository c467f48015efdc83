//! Optimistic like/follow relationships between the active profile and
//! posts or other pets.

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::{auth::PetId, error::ApiError};

pub mod classify;
pub mod controller;

pub use classify::{classify_failure, Verdict};
pub use controller::SocialController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Like,
    Follow,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Like => f.write_str("like"),
            RelationKind::Follow => f.write_str("follow"),
        }
    }
}

/// Direction of an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipState {
    Idle { on: bool },
    Pending { intent: Intent },
}

impl RelationshipState {
    /// What the UI shows: pending requests display their desired end state.
    pub fn believed_on(self) -> bool {
        match self {
            RelationshipState::Idle { on } => on,
            RelationshipState::Pending { intent } => intent == Intent::Add,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, RelationshipState::Pending { .. })
    }
}

impl Default for RelationshipState {
    fn default() -> Self {
        RelationshipState::Idle { on: false }
    }
}

/// Something the active profile can like or follow.
///
/// `owner` is the pet that the self-action guard compares against: the
/// author of a post, or the followed pet itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: RelationKind,
    pub id: String,
    pub owner: PetId,
}

impl Target {
    pub fn post(post_id: impl Into<String>, owner: impl Into<PetId>) -> Self {
        Self {
            kind: RelationKind::Like,
            id: post_id.into(),
            owner: owner.into(),
        }
    }

    pub fn profile(pet_id: impl Into<PetId>) -> Self {
        let pet_id = pet_id.into();
        Self {
            kind: RelationKind::Follow,
            id: pet_id.clone(),
            owner: pet_id,
        }
    }
}

/// One tracked (kind, actor, target) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
    pub kind: RelationKind,
    pub actor: PetId,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    SelfTarget,
    MissingIdentity,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ToggleOutcome {
    /// The backend agrees with the optimistic state. `benign` marks a
    /// rejection whose reason says the relationship was already there (or
    /// already gone).
    Confirmed { on: bool, benign: bool },
    /// The optimistic change was reverted.
    RolledBack {
        on: bool,
        #[serde(serialize_with = "error_message")]
        error: ApiError,
    },
    /// Nothing changed and no request was sent.
    Rejected { reason: Rejection },
}

fn error_message<S: Serializer>(error: &ApiError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// The remote side of likes and follows.
#[async_trait]
pub trait RelationshipBackend: Send + Sync {
    async fn add(&self, kind: RelationKind, actor: &str, target: &str) -> Result<(), ApiError>;
    async fn remove(&self, kind: RelationKind, actor: &str, target: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl<B: RelationshipBackend + ?Sized> RelationshipBackend for Arc<B> {
    async fn add(&self, kind: RelationKind, actor: &str, target: &str) -> Result<(), ApiError> {
        (**self).add(kind, actor, target).await
    }

    async fn remove(&self, kind: RelationKind, actor: &str, target: &str) -> Result<(), ApiError> {
        (**self).remove(kind, actor, target).await
    }
}
