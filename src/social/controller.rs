use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{
    classify::{classify_failure, Verdict},
    Intent, RelationKind, RelationshipBackend, RelationshipKey, RelationshipState, Rejection,
    Target, ToggleOutcome,
};
use crate::{
    auth::{PetId, SessionContext},
    error::ApiError,
};

/// Decides whether a failed toggle should be rolled back.
pub type Classifier = fn(Intent, &ApiError) -> Verdict;

#[derive(Debug, Default)]
struct Relationship {
    state: RelationshipState,
    count: Option<i64>,
    /// Counter value to restore if the pending request is rolled back.
    count_before: Option<i64>,
}

impl Relationship {
    fn begin(&mut self, intent: Intent) {
        self.count_before = self.count;
        self.count = self.count.map(|c| match intent {
            Intent::Add => c + 1,
            Intent::Remove => c - 1,
        });
        self.state = RelationshipState::Pending { intent };
    }

    fn confirm(&mut self, on: bool) {
        self.state = RelationshipState::Idle { on };
        self.count_before = None;
    }

    fn roll_back(&mut self, on: bool) {
        self.state = RelationshipState::Idle { on };
        self.count = self.count_before.take();
    }
}

/// Keeps the local belief about likes and follows for one view.
///
/// Toggles apply immediately, send one request and are confirmed or
/// reverted when it settles. At most one request is in flight per
/// relationship; different relationships never block each other.
pub struct SocialController<B> {
    backend: B,
    session: SessionContext,
    relationships: Mutex<HashMap<RelationshipKey, Relationship>>,
    classifier: Classifier,
    timeout: Option<Duration>,
}

impl<B: RelationshipBackend> SocialController<B> {
    pub fn new(backend: B, session: SessionContext) -> Self {
        Self {
            backend,
            session,
            relationships: Mutex::new(HashMap::new()),
            classifier: classify_failure,
            timeout: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Rolls a toggle back when its request outlives `limit`.
    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    pub async fn toggle(&self, target: &Target) -> ToggleOutcome {
        let Some(actor) = self.session.active_profile() else {
            error!(
                "No active profile selected, ignoring {} on {}",
                target.kind, target.id
            );
            return ToggleOutcome::Rejected {
                reason: Rejection::MissingIdentity,
            };
        };

        if actor == target.owner {
            warn!("Pet {} cannot {} its own profile or posts", actor, target.kind);
            return ToggleOutcome::Rejected {
                reason: Rejection::SelfTarget,
            };
        }

        let key = key_for(target, actor);
        let intent = {
            let mut relationships = self.lock();
            let entry = relationships.entry(key.clone()).or_default();
            let intent = match entry.state {
                RelationshipState::Pending { .. } => {
                    debug!("{} on {} already in flight", key.kind, key.target);
                    return ToggleOutcome::Rejected {
                        reason: Rejection::InFlight,
                    };
                }
                RelationshipState::Idle { on: true } => Intent::Remove,
                RelationshipState::Idle { on: false } => Intent::Add,
            };
            entry.begin(intent);
            intent
        };

        let result = self.send(intent, &key).await;
        self.settle(&key, intent, result)
    }

    async fn send(&self, intent: Intent, key: &RelationshipKey) -> Result<(), ApiError> {
        let call = async {
            match intent {
                Intent::Add => self.backend.add(key.kind, &key.actor, &key.target).await,
                Intent::Remove => self.backend.remove(key.kind, &key.actor, &key.target).await,
            }
        };
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ApiError::Timeout)),
            None => call.await,
        }
    }

    fn settle(
        &self,
        key: &RelationshipKey,
        intent: Intent,
        result: Result<(), ApiError>,
    ) -> ToggleOutcome {
        let desired = intent == Intent::Add;
        let mut relationships = self.lock();
        let entry = relationships.entry(key.clone()).or_default();

        match result {
            Ok(()) => {
                entry.confirm(desired);
                ToggleOutcome::Confirmed {
                    on: desired,
                    benign: false,
                }
            }
            Err(err) => match (self.classifier)(intent, &err) {
                Verdict::Benign => {
                    info!("{} on {} already settled remotely: {}", key.kind, key.target, err);
                    entry.confirm(desired);
                    ToggleOutcome::Confirmed {
                        on: desired,
                        benign: true,
                    }
                }
                Verdict::Genuine => {
                    error!("{} on {} failed, rolling back: {}", key.kind, key.target, err);
                    entry.roll_back(!desired);
                    ToggleOutcome::RolledBack {
                        on: !desired,
                        error: err,
                    }
                }
            },
        }
    }
}

impl<B: RelationshipBackend + 'static> SocialController<B> {
    /// Runs [`toggle`](Self::toggle) on its own task, so a caller that goes
    /// away mid-request cannot leave the relationship pending.
    pub async fn toggle_detached(
        self: Arc<Self>,
        target: Target,
    ) -> Result<ToggleOutcome, tokio::task::JoinError> {
        tokio::spawn(async move { self.toggle(&target).await }).await
    }
}

impl<B> SocialController<B> {
    /// Records what the backend reported. Ignored while a request is in
    /// flight or when no profile is active.
    pub fn seed(&self, target: &Target, on: bool) {
        self.update_idle(target, |entry| entry.state = RelationshipState::Idle { on });
    }

    /// Records the counter carried by the target (likes on a post,
    /// followers of a pet). Same rules as [`seed`](Self::seed).
    pub fn seed_count(&self, target: &Target, count: i64) {
        self.update_idle(target, |entry| entry.count = Some(count));
    }

    pub fn state(&self, target: &Target) -> RelationshipState {
        self.read(target, |entry| entry.state).unwrap_or_default()
    }

    pub fn is_on(&self, target: &Target) -> bool {
        self.state(target).believed_on()
    }

    pub fn count(&self, target: &Target) -> Option<i64> {
        self.read(target, |entry| entry.count).flatten()
    }

    /// Posts the active profile currently believes it likes.
    pub fn liked_posts(&self) -> HashSet<String> {
        self.believed(RelationKind::Like)
            .into_iter()
            .filter_map(|(post, on)| on.then_some(post))
            .collect()
    }

    /// Follow belief of the active profile for every tracked pet.
    pub fn following(&self) -> HashMap<PetId, bool> {
        self.believed(RelationKind::Follow)
    }

    fn believed(&self, kind: RelationKind) -> HashMap<String, bool> {
        let Some(actor) = self.session.active_profile() else {
            return HashMap::new();
        };
        self.lock()
            .iter()
            .filter(|(key, _)| key.kind == kind && key.actor == actor)
            .map(|(key, entry)| (key.target.clone(), entry.state.believed_on()))
            .collect()
    }

    fn update_idle(&self, target: &Target, apply: impl FnOnce(&mut Relationship)) {
        let Some(actor) = self.session.active_profile() else {
            return;
        };
        let mut relationships = self.lock();
        let entry = relationships.entry(key_for(target, actor)).or_default();
        if !entry.state.is_pending() {
            apply(entry);
        }
    }

    fn read<T>(&self, target: &Target, get: impl FnOnce(&Relationship) -> T) -> Option<T> {
        let actor = self.session.active_profile()?;
        self.lock().get(&key_for(target, actor)).map(get)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RelationshipKey, Relationship>> {
        self.relationships
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn key_for(target: &Target, actor: PetId) -> RelationshipKey {
    RelationshipKey {
        kind: target.kind,
        actor,
        target: target.id.clone(),
    }
}
