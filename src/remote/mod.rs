//! HTTP client for the remote pet, likes and followers services.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::{
    auth::SessionContext,
    config::settings::Endpoints,
    error::ApiError,
    follows::FollowersData,
    pets::{Pet, PetList, Responsible},
    posts::Post,
    social::{RelationKind, RelationshipBackend},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LikeBody<'a> {
    post_id: &'a str,
    pet_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FollowBody<'a> {
    follower_id: &'a str,
    pet_id: &'a str,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    token: String,
}

#[derive(Deserialize)]
struct ResponsibleReply {
    responsible: Responsible,
}

trait WithAuth {
    fn with_auth(self, token: &str) -> Self;
}

impl WithAuth for RequestBuilder {
    fn with_auth(self, token: &str) -> Self {
        self.bearer_auth(token)
    }
}

#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    endpoints: Endpoints,
    session: SessionContext,
}

impl RemoteClient {
    pub fn new(
        endpoints: Endpoints,
        session: SessionContext,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoints,
            session,
        })
    }

    /// Exchanges credentials for a session token. Does not touch the
    /// session; callers decide whether to sign in with it.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let req = self
            .http
            .post(format!("{}/auth/login", self.endpoints.api_url))
            .json(&Credentials { email, password });
        let reply: LoginReply = json(req).await?;
        Ok(reply.token)
    }

    /// The account behind the current token.
    pub async fn current_responsible(&self) -> Result<Responsible, ApiError> {
        let req = self
            .http
            .get(format!("{}/responsibles/getId", self.endpoints.api_url));
        let reply: ResponsibleReply = json(self.authed(req)?).await?;
        Ok(reply.responsible)
    }

    pub async fn list_pets(&self) -> Result<Vec<Pet>, ApiError> {
        let req = self.http.get(format!("{}/pets/all", self.endpoints.api_url));
        let list: PetList = json(req).await?;
        Ok(list.into())
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let req = self.http.get(format!("{}/posts/all", self.endpoints.api_url));
        json(req).await
    }

    pub async fn followers(&self, pet_id: &str) -> Result<FollowersData, ApiError> {
        let req = self
            .http
            .get(format!(
                "{}/api/v1/followers",
                self.endpoints.followers_query_url
            ))
            .query(&[("petId", pet_id)]);
        json(self.authed(req)?).await
    }

    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.session.token().ok_or(ApiError::NotSignedIn)?;
        Ok(req.with_auth(&token))
    }

    fn relationship_request(
        &self,
        add: bool,
        kind: RelationKind,
        actor: &str,
        target: &str,
    ) -> RequestBuilder {
        match kind {
            RelationKind::Like => {
                let body = LikeBody {
                    post_id: target,
                    pet_id: actor,
                };
                if add {
                    self.http
                        .post(format!("{}/likes/add", self.endpoints.likes_url))
                        .json(&body)
                } else {
                    self.http
                        .delete(format!("{}/likes/remove", self.endpoints.likes_url))
                        .json(&body)
                }
            }
            RelationKind::Follow => {
                let body = FollowBody {
                    follower_id: actor,
                    pet_id: target,
                };
                if add {
                    self.http
                        .post(format!(
                            "{}/api/v1/followers",
                            self.endpoints.followers_add_url
                        ))
                        .json(&body)
                } else {
                    self.http
                        .delete(format!(
                            "{}/api/v1/followers",
                            self.endpoints.followers_remove_url
                        ))
                        .json(&body)
                }
            }
        }
    }
}

#[async_trait]
impl RelationshipBackend for RemoteClient {
    async fn add(&self, kind: RelationKind, actor: &str, target: &str) -> Result<(), ApiError> {
        let req = self.relationship_request(true, kind, actor, target);
        checked(self.authed(req)?.send().await?).await.map(drop)
    }

    async fn remove(&self, kind: RelationKind, actor: &str, target: &str) -> Result<(), ApiError> {
        let req = self.relationship_request(false, kind, actor, target);
        checked(self.authed(req)?.send().await?).await.map(drop)
    }
}

/// Turns a non-2xx response into a typed error carrying the body text.
async fn checked(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), &body))
}

async fn json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
    let response = checked(req.send().await?).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
