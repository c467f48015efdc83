use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod follows;
pub mod pets;
pub mod posts;
pub mod remote;
pub mod response;
pub mod search;
pub mod social;

use auth::SessionContext;
use config::settings::Settings;
use error::ApiError;
use remote::RemoteClient;
use social::SocialController;

/// The like/follow controller shared by every handler.
pub type Social = Arc<SocialController<RemoteClient>>;

#[derive(Clone)]
pub struct AppState {
    session: SessionContext,
    remote: RemoteClient,
    social: Social,
}

impl AppState {
    pub fn new(settings: &Settings, session: SessionContext) -> Result<Self, ApiError> {
        let remote = RemoteClient::new(
            settings.endpoints.clone(),
            session.clone(),
            settings.request_timeout,
        )?;
        let social = SocialController::new(remote.clone(), session.clone())
            .with_timeout(settings.toggle_timeout);
        Ok(Self {
            session,
            remote,
            social: Arc::new(social),
        })
    }
}

impl FromRef<AppState> for SessionContext {
    fn from_ref(app_state: &AppState) -> SessionContext {
        app_state.session.clone()
    }
}

impl FromRef<AppState> for RemoteClient {
    fn from_ref(app_state: &AppState) -> RemoteClient {
        app_state.remote.clone()
    }
}

impl FromRef<AppState> for Social {
    fn from_ref(app_state: &AppState) -> Social {
        app_state.social.clone()
    }
}

pub fn app(state: AppState) -> Router {
    let session_router = Router::new()
        .route(
            "/",
            get(auth::handler::get_session).delete(auth::handler::sign_out),
        )
        .route("/login", post(auth::handler::login))
        .route("/token", post(auth::handler::adopt_token))
        .route("/profile", put(auth::handler::select_profile))
        .route("/me", get(auth::handler::get_me));

    let pet_router = Router::new()
        .route("/:id/posts", get(posts::handler::get_pet_posts))
        .route("/:id/followers", get(follows::handler::get_followers))
        .route("/:id/follow", post(follows::handler::toggle_follow));

    let post_router = Router::new().route("/:id/like", post(posts::handler::toggle_like));

    Router::new()
        .route("/api/feed", get(posts::handler::get_feed))
        .nest("/api/session", session_router)
        .nest("/api/pets", pet_router)
        .nest("/api/posts", post_router)
        .with_state(state)
}
