use serde::{Deserialize, Serialize};

use tracing::error;

use crate::{
    auth::PetId,
    remote::RemoteClient,
    search::{FieldValue, SearchField},
};

pub mod handler;

/// A pet that follows another pet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follower {
    pub id: PetId,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Answer of the followers query for one pet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowersData {
    #[serde(rename = "petId")]
    pub pet_id: PetId,
    pub followers_count: i64,
    #[serde(default)]
    pub followers: Vec<Follower>,
}

impl FollowersData {
    pub fn empty(pet_id: &str) -> Self {
        Self {
            pet_id: pet_id.to_string(),
            followers_count: 0,
            followers: Vec::new(),
        }
    }

    pub fn contains(&self, pet_id: &str) -> bool {
        self.followers.iter().any(|f| f.id == pet_id)
    }
}

/// Followers of `pet_id`, or an empty list when the query fails.
pub async fn load_followers(remote: &RemoteClient, pet_id: &str) -> FollowersData {
    remote.followers(pet_id).await.unwrap_or_else(|e| {
        error!("Error loading followers of {}: {}", pet_id, e);
        FollowersData::empty(pet_id)
    })
}

fn follower_name(follower: &Follower) -> FieldValue<'_> {
    follower.name.as_str().into()
}

pub const FOLLOWER_SEARCH_FIELDS: [SearchField<Follower>; 1] =
    [SearchField::new("name", follower_name)];

#[derive(Debug, Deserialize)]
pub struct FollowersQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerEntry {
    pub id: PetId,
    pub name: String,
    pub is_own_pet: bool,
    pub following: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowersResponse {
    pub pet_id: PetId,
    pub followers_count: i64,
    pub following: bool,
    pub total_results: usize,
    pub followers: Vec<FollowerEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub outcome: crate::social::ToggleOutcome,
    pub following: bool,
    pub followers_count: Option<i64>,
}
