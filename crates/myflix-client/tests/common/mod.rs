//! An in-process stand-in for the catalog API, with the same inconsistent
//! casing the real server has shipped over time.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use myflix_client::config::{Config, FavoritesRoute};
use myflix_client::{ApiClient, SessionStore};

pub const TOKEN: &str = "abc123";
pub const PASSWORD: &str = "pw";

#[derive(Default)]
pub struct FakeState {
    pub users: Mutex<HashMap<String, Value>>,
    pub requests: AtomicUsize,
    pub last_path: Mutex<Option<String>>,
    pub fail_favorites: AtomicBool,
}

impl FakeState {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn favorites_of(&self, username: &str) -> Vec<String> {
        let users = self.users.lock().unwrap();
        users[username]["FavoriteMovies"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    pub fn last_path(&self) -> Option<String> {
        self.last_path.lock().unwrap().clone()
    }

    fn record(&self, path: String) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(path);
    }
}

type Shared = Arc<FakeState>;

pub struct FakeApi {
    pub base: String,
    pub state: Shared,
}

impl FakeApi {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(FakeState::default());
        state
            .users
            .lock()
            .unwrap()
            .insert("alice".to_string(), alice());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}/"),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        self.client_with(FavoritesRoute::Favorites)
    }

    pub fn client_with(&self, route: FavoritesRoute) -> ApiClient {
        let mut config = Config::with_api_url(&self.base).unwrap();
        config.favorites_route = route;
        ApiClient::new(&config, SessionStore::in_memory()).unwrap()
    }
}

fn alice() -> Value {
    json!({
        "_id": "u1",
        "Username": "alice",
        "Email": "alice@example.com",
        "Birthday": "1990-04-01T00:00:00.000Z",
        "FavoriteMovies": ["m1", "ghost"]
    })
}

fn catalog() -> Value {
    json!([
        {
            "_id": "m1",
            "Title": "Alien",
            "Description": "In space no one can hear you scream.",
            "Genre": { "Name": "Horror", "Description": "Meant to frighten." },
            "Director": { "Name": "Ridley Scott", "Bio": "English film maker.", "Birth": "1937-11-30T00:00:00.000Z" },
            "ImagePath": "alien.png",
            "Featured": true
        },
        {
            "id": "m2",
            "title": "Heat",
            "genre": { "name": "Crime", "description": "Cops and robbers." },
            "director": { "name": "Michael Mann", "bio": "American director." },
            "imagePath": "heat.png",
            "featured": false
        },
        { "Title": "Mystery Reel" }
    ])
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/users", post(register))
        .route("/login", post(login))
        .route("/movies", get(movies))
        .route("/movies/{title}", get(movie))
        .route("/movies/director/{name}", get(director))
        .route("/movies/genre/{name}", get(genre))
        .route("/users/{username}", get(get_user).put(edit_user).delete(delete_user))
        .route("/users/{username}/favorites", post(add_favorite))
        .route("/users/{username}/favorites/{movie_id}", delete(remove_favorite))
        .route(
            "/users/{username}/movies/{movie_id}",
            post(add_favorite_legacy).delete(remove_favorite),
        )
        .with_state(state)
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "Unauthorized").into_response()),
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.record("/users".into());
    let username = body["Username"].as_str().unwrap_or_default().to_string();
    let mut users = state.users.lock().unwrap();
    if users.contains_key(&username) {
        return (StatusCode::BAD_REQUEST, format!("{username} already exists")).into_response();
    }

    let user = json!({
        "_id": format!("u{}", users.len() + 1),
        "Username": username,
        "Email": body["Email"],
        "Birthday": body["Birthday"],
        "FavoriteMovies": []
    });
    users.insert(username, user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.record("/login".into());
    let username = body["Username"].as_str().unwrap_or_default();
    let known = state.users.lock().unwrap().contains_key(username);
    if !known || body["Password"] != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Incorrect username or password.", "user": false })),
        )
            .into_response();
    }
    Json(json!({ "token": TOKEN, "user": { "Username": username } })).into_response()
}

async fn movies(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.record("/movies".into());
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    Json(catalog()).into_response()
}

async fn movie(State(state): State<Shared>, headers: HeaderMap, Path(title): Path<String>) -> Response {
    state.record(format!("/movies/{title}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    let found = catalog()
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["Title"] == title.as_str() || m["title"] == title.as_str())
        .cloned();
    match found {
        Some(m) => Json(m).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Movie not found" }))).into_response(),
    }
}

async fn director(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    state.record(format!("/movies/director/{name}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    if name != "Ridley Scott" {
        return (StatusCode::NOT_FOUND, "Director not found").into_response();
    }
    Json(json!({ "Director": catalog()[0]["Director"].clone() })).into_response()
}

async fn genre(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    state.record(format!("/movies/genre/{name}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    Json(json!({ "name": name, "description": "Cops and robbers." })).into_response()
}

async fn get_user(State(state): State<Shared>, headers: HeaderMap, Path(username): Path<String>) -> Response {
    state.record(format!("/users/{username}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    match state.users.lock().unwrap().get(&username) {
        Some(user) => Json(user.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "User not found").into_response(),
    }
}

async fn edit_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    state.record(format!("/users/{username}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    let mut users = state.users.lock().unwrap();
    let Some(mut user) = users.remove(&username) else {
        return (StatusCode::NOT_FOUND, "User not found").into_response();
    };
    // the update endpoint answers in lowercase
    if let Some(email) = patch.get("email") {
        user["Email"] = email.clone();
    }
    if let Some(birth) = patch.get("birthDate") {
        user["Birthday"] = birth.clone();
    }
    let key = match patch.get("username").and_then(Value::as_str) {
        Some(renamed) => {
            user["Username"] = json!(renamed);
            renamed.to_string()
        }
        None => username,
    };
    users.insert(key, user.clone());
    let reply = json!({
        "_id": user["_id"],
        "username": user["Username"],
        "email": user["Email"],
        "birthday": user["Birthday"],
        "favoriteMovies": user["FavoriteMovies"]
    });
    Json(reply).into_response()
}

async fn delete_user(State(state): State<Shared>, headers: HeaderMap, Path(username): Path<String>) -> Response {
    state.record(format!("/users/{username}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    match state.users.lock().unwrap().remove(&username) {
        Some(_) => format!("{username} was deleted.").into_response(),
        None => (StatusCode::NOT_FOUND, "User not found").into_response(),
    }
}

fn mutate_favorites(state: &FakeState, username: &str, movie_id: &str, add: bool) -> Response {
    if state.fail_favorites.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "database unavailable" })))
            .into_response();
    }
    let mut users = state.users.lock().unwrap();
    let Some(user) = users.get_mut(username) else {
        return (StatusCode::NOT_FOUND, "User not found").into_response();
    };
    let favorites = user["FavoriteMovies"].as_array_mut().unwrap();
    favorites.retain(|id| id != movie_id);
    if add {
        favorites.push(json!(movie_id));
    }
    Json(user.clone()).into_response()
}

async fn add_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(format!("/users/{username}/favorites"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    let Some(movie_id) = body["movieId"].as_str() else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "movieId is required" }))).into_response();
    };
    mutate_favorites(&state, &username, movie_id, true)
}

async fn add_favorite_legacy(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((username, movie_id)): Path<(String, String)>,
) -> Response {
    state.record(format!("/users/{username}/movies/{movie_id}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    mutate_favorites(&state, &username, &movie_id, true)
}

async fn remove_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((username, movie_id)): Path<(String, String)>,
) -> Response {
    state.record(format!("/users/{username}/-/{movie_id}"));
    if let Err(denied) = authorized(&headers) {
        return denied;
    }
    mutate_favorites(&state, &username, &movie_id, false)
}
