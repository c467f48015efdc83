use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppError,
    posts::{
        load_feed, posts_of, FeedPost, FeedPostResponse, FeedQuery, FeedResponse, LikeResponse,
        LikeTarget, FEED_SEARCH_FIELDS,
    },
    remote::RemoteClient,
    response::ApiResponse,
    search::filter,
    social::Target,
    Social,
};

/// Global feed, filtered by `q`
/// GET /api/feed
pub async fn get_feed(
    State(remote): State<RemoteClient>,
    State(social): State<Social>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let feed = load_feed(&remote).await;
    Ok(ApiResponse::success(render(&social, feed, query.q.as_deref())))
}

/// One pet's posts, filtered by `q`
/// GET /api/pets/:id/posts
pub async fn get_pet_posts(
    State(remote): State<RemoteClient>,
    State(social): State<Social>,
    Path(pet_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let feed = posts_of(load_feed(&remote).await, &pet_id);
    Ok(ApiResponse::success(render(&social, feed, query.q.as_deref())))
}

/// Like or unlike a post as the active profile
/// POST /api/posts/:id/like
pub async fn toggle_like(
    State(social): State<Social>,
    Path(post_id): Path<String>,
    Json(payload): Json<LikeTarget>,
) -> Result<impl IntoResponse, AppError> {
    let target = Target::post(post_id, payload.pet_id);

    let outcome = social
        .clone()
        .toggle_detached(target.clone())
        .await
        .map_err(|e| {
            tracing::error!("Like task failed: {:?}", e);
            AppError::InternalServerError
        })?;

    Ok(ApiResponse::success(LikeResponse {
        outcome,
        liked: social.is_on(&target),
        likes: social.count(&target),
    }))
}

/// Seeds the like counters from a fresh load and overlays the local
/// belief on the filtered posts.
fn render(social: &Social, feed: Vec<FeedPost>, query: Option<&str>) -> FeedResponse {
    for item in &feed {
        social.seed_count(&target_of(item), item.post.likes);
    }

    let results = filter(&feed, &FEED_SEARCH_FIELDS, query.unwrap_or_default());
    let posts = results
        .iter()
        .map(|item| {
            let target = target_of(item);
            let mut item = item.clone();
            if let Some(likes) = social.count(&target) {
                item.post.likes = likes;
            }
            FeedPostResponse {
                liked: social.is_on(&target),
                edited: item.post.is_edited(),
                item,
            }
        })
        .collect();

    FeedResponse {
        total_results: results.total_results(),
        posts,
    }
}

fn target_of(item: &FeedPost) -> Target {
    Target::post(&item.post.id, &item.post.pet_id)
}
