use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tracing::error;

use crate::{
    auth::PetId,
    pets::Pet,
    remote::RemoteClient,
    search::{FieldValue, SearchField},
};

pub mod handler;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub pet_id: PetId,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Saving a post touches `updated_at`, so only a gap of more than a
    /// minute counts as an edit.
    pub fn is_edited(&self) -> bool {
        (self.updated_at - self.created_at).num_seconds().abs() > 60
    }
}

/// A post together with the pet that published it.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    pub pet: Option<Pet>,
}

/// Joins every post with its pet, newest first.
pub fn assemble_feed(posts: Vec<Post>, pets: &[Pet]) -> Vec<FeedPost> {
    let mut feed: Vec<FeedPost> = posts
        .into_iter()
        .map(|post| {
            let pet = pets.iter().find(|p| p.id == post.pet_id).cloned();
            FeedPost { post, pet }
        })
        .collect();
    feed.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
    feed
}

/// Fetches pets and posts for the feed. A failed load counts as empty.
pub async fn load_feed(remote: &RemoteClient) -> Vec<FeedPost> {
    let pets = remote.list_pets().await.unwrap_or_else(|e| {
        error!("Error loading pets: {}", e);
        Vec::new()
    });
    let posts = remote.list_posts().await.unwrap_or_else(|e| {
        error!("Error loading posts: {}", e);
        Vec::new()
    });
    assemble_feed(posts, &pets)
}

/// Keeps one pet's posts, preserving order.
pub fn posts_of(feed: Vec<FeedPost>, pet_id: &str) -> Vec<FeedPost> {
    feed.into_iter()
        .filter(|item| item.post.pet_id == pet_id)
        .collect()
}

fn content(item: &FeedPost) -> FieldValue<'_> {
    item.post.content.as_str().into()
}

fn pet_name(item: &FeedPost) -> FieldValue<'_> {
    item.pet.as_ref().map(|pet| pet.name.as_str()).into()
}

fn pet_breed(item: &FeedPost) -> FieldValue<'_> {
    item.pet.as_ref().map(|pet| pet.breed.as_str()).into()
}

fn pet_species(item: &FeedPost) -> FieldValue<'_> {
    item.pet.as_ref().map(|pet| pet.species.as_str()).into()
}

fn responsible_name(item: &FeedPost) -> FieldValue<'_> {
    item.pet
        .as_ref()
        .and_then(|pet| pet.responsible.as_ref())
        .map(|owner| owner.name.as_str())
        .into()
}

pub const FEED_SEARCH_FIELDS: [SearchField<FeedPost>; 5] = [
    SearchField::new("content", content),
    SearchField::new("pet.name", pet_name),
    SearchField::new("pet.breed", pet_breed),
    SearchField::new("pet.species", pet_species),
    SearchField::new("pet.responsible.name", responsible_name),
];

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeTarget {
    /// The pet that published the post.
    pub pet_id: PetId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPostResponse {
    #[serde(flatten)]
    pub item: FeedPost,
    pub liked: bool,
    pub edited: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub total_results: usize,
    pub posts: Vec<FeedPostResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub outcome: crate::social::ToggleOutcome,
    pub liked: bool,
    pub likes: Option<i64>,
}
