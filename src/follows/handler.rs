use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    auth::SessionContext,
    error::AppError,
    follows::{
        load_followers, FollowResponse, FollowerEntry, FollowersQuery, FollowersResponse,
        FOLLOWER_SEARCH_FIELDS,
    },
    remote::RemoteClient,
    response::ApiResponse,
    search::filter,
    social::Target,
    Social,
};

/// Followers of a pet, with the active profile's follow state for the pet
/// and for every listed follower
/// GET /api/pets/:id/followers
pub async fn get_followers(
    State(remote): State<RemoteClient>,
    State(session): State<SessionContext>,
    State(social): State<Social>,
    Path(pet_id): Path<String>,
    Query(query): Query<FollowersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let data = load_followers(&remote, &pet_id).await;
    let pet = Target::profile(&pet_id);
    social.seed_count(&pet, data.followers_count);

    let active = session.active_profile();
    if let Some(active) = active.as_deref() {
        social.seed(&pet, data.contains(active));

        for follower in data.followers.iter().filter(|f| f.id != active) {
            let theirs = load_followers(&remote, &follower.id).await;
            social.seed(&Target::profile(&follower.id), theirs.contains(active));
        }
    }

    let results = filter(
        &data.followers,
        &FOLLOWER_SEARCH_FIELDS,
        query.q.as_deref().unwrap_or_default(),
    );
    let followers = results
        .iter()
        .map(|f| FollowerEntry {
            id: f.id.clone(),
            name: f.name.clone(),
            is_own_pet: active.as_deref() == Some(f.id.as_str()),
            following: social.is_on(&Target::profile(&f.id)),
        })
        .collect();

    Ok(ApiResponse::success(FollowersResponse {
        followers_count: social.count(&pet).unwrap_or(data.followers_count),
        following: social.is_on(&pet),
        total_results: results.total_results(),
        followers,
        pet_id,
    }))
}

/// Follow or unfollow a pet as the active profile
/// POST /api/pets/:id/follow
pub async fn toggle_follow(
    State(social): State<Social>,
    Path(pet_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let target = Target::profile(pet_id);

    let outcome = social
        .clone()
        .toggle_detached(target.clone())
        .await
        .map_err(|e| {
            tracing::error!("Follow task failed: {:?}", e);
            AppError::InternalServerError
        })?;

    Ok(ApiResponse::success(FollowResponse {
        outcome,
        following: social.is_on(&target),
        followers_count: social.count(&target),
    }))
}
