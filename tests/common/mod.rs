#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pethub_client::{
    auth::{Session, SessionContext},
    config::settings::{Endpoints, Settings},
    AppState,
};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub auth: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    pub pets: Value,
    pub posts: Value,
    pub followers: HashMap<String, Value>,
    /// Replies for like/follow mutations, consumed in order; empty means 200.
    pub mutation_replies: VecDeque<(StatusCode, String)>,
    pub requests: Vec<Recorded>,
}

/// In-process stand-in for the remote pet services.
#[derive(Clone, Default)]
pub struct MockBackend {
    pub state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn with_feed(pets: Value, posts: Value) -> Self {
        let mock = Self::default();
        {
            let mut state = mock.state.lock().unwrap();
            state.pets = pets;
            state.posts = posts;
        }
        mock
    }

    pub fn set_followers(&self, pet_id: &str, followers: Value) {
        self.state
            .lock()
            .unwrap()
            .followers
            .insert(pet_id.to_string(), followers);
    }

    pub fn reply_next(&self, status: StatusCode, body: &str) {
        self.state
            .lock()
            .unwrap()
            .mutation_replies
            .push_back((status, body.to_string()));
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub async fn serve(&self) -> String {
        let router = Router::new().fallback(handle).with_state(self.clone());
        spawn(router).await
    }
}

async fn handle(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let query = uri.query().map(str::to_string);
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = mock.state.lock().unwrap();
    state.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        auth,
        body: body.clone(),
    });

    match (method, path.as_str()) {
        (Method::GET, "/pets/all") => (StatusCode::OK, state.pets.to_string()),
        (Method::GET, "/posts/all") => (StatusCode::OK, state.posts.to_string()),
        (Method::POST, "/auth/login") => {
            if body["password"] == "hunter22" {
                (StatusCode::OK, json!({ "token": "issued-token" }).to_string())
            } else {
                (StatusCode::UNAUTHORIZED, json!({ "message": "bad credentials" }).to_string())
            }
        }
        (Method::GET, "/responsibles/getId") => (
            StatusCode::OK,
            json!({ "responsible": { "id": "r1", "name": "Ana" } }).to_string(),
        ),
        (Method::GET, "/api/v1/followers") => {
            let pet_id = query
                .as_deref()
                .and_then(|q| q.strip_prefix("petId="))
                .unwrap_or_default()
                .to_string();
            match state.followers.get(&pet_id) {
                Some(data) => (StatusCode::OK, data.to_string()),
                None => (StatusCode::NOT_FOUND, "no such pet".to_string()),
            }
        }
        (Method::POST, "/likes/add")
        | (Method::DELETE, "/likes/remove")
        | (Method::POST, "/api/v1/followers")
        | (Method::DELETE, "/api/v1/followers") => state
            .mutation_replies
            .pop_front()
            .unwrap_or((StatusCode::OK, "{}".to_string())),
        _ => (StatusCode::NOT_FOUND, format!("Cannot {}", path)),
    }
}

pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn acting_as(pet_id: &str) -> SessionContext {
    SessionContext::new(Session {
        token: Some("secret-token".into()),
        active_profile: Some(pet_id.into()),
    })
}

pub fn settings_for(backend_url: &str) -> Settings {
    Settings {
        port: 0,
        addr: ([127, 0, 0, 1], 0).into(),
        endpoints: Endpoints::single(backend_url),
        session_dir: std::env::temp_dir(),
        request_timeout: Duration::from_secs(5),
        toggle_timeout: None,
    }
}

/// Runs the local API against `backend_url` and returns its base URL.
pub async fn serve_app(backend_url: &str, session: SessionContext) -> String {
    let state = AppState::new(&settings_for(backend_url), session).unwrap();
    spawn(pethub_client::app(state)).await
}

pub fn pet(id: &str, name: &str, breed: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "species": "Dog",
        "breed": breed,
        "image": null,
        "responsibleId": "r1",
        "responsible": { "id": "r1", "name": owner }
    })
}

pub fn post(id: &str, pet_id: &str, likes: i64, minute: u32) -> Value {
    let at = format!("2024-05-01T12:{minute:02}:00Z");
    json!({
        "id": id,
        "petId": pet_id,
        "content": format!("post {id}"),
        "image": null,
        "likes": likes,
        "createdAt": at,
        "updatedAt": at
    })
}

/// Five posts, two of them by golden retrievers.
pub fn sample_feed() -> MockBackend {
    MockBackend::with_feed(
        json!([
            pet("p1", "Rex", "Golden Retriever", "Ana"),
            pet("p2", "Mia", "Poodle", "Luis"),
            pet("p3", "Sol", "golden doodle", "Ana"),
            pet("me", "Toby", "Beagle", "Eva"),
        ]),
        json!([
            post("a", "p1", 3, 1),
            post("b", "p2", 0, 2),
            post("c", "p3", 7, 3),
            post("d", "me", 1, 4),
            post("e", "p2", 2, 5),
        ]),
    )
}
