use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use url::Url;

use crate::normalize::FieldAliases;

/// How the server exposes the favorites relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoritesRoute {
    /// `POST /users/{u}/favorites` with `{movieId}`, `DELETE /users/{u}/favorites/{id}`.
    #[default]
    Favorites,
    /// `POST|DELETE /users/{u}/movies/{id}`.
    Movies,
}

impl FromStr for FavoritesRoute {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "favorites" => Ok(FavoritesRoute::Favorites),
            "movies" => Ok(FavoritesRoute::Movies),
            other => bail!("unknown favorites route `{other}` (expected `favorites` or `movies`)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub session_path: PathBuf,
    pub request_timeout: Duration,
    pub favorites_route: FavoritesRoute,
    pub field_aliases: FieldAliases,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = env::var("MYFLIX_API_URL")
            .unwrap_or_else(|_| "https://filmapi-ab3ce15dfb3f.herokuapp.com/".to_string());
        let timeout_secs: u64 = env::var("MYFLIX_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("MYFLIX_TIMEOUT_SECS must be a whole number of seconds")?;
        let favorites_route = match env::var("MYFLIX_FAVORITES_ROUTE") {
            Ok(v) => v.parse()?,
            Err(_) => FavoritesRoute::default(),
        };
        let field_aliases = match env::var("MYFLIX_FIELD_ALIASES") {
            Ok(path) => FieldAliases::from_file(&path)
                .with_context(|| format!("failed to load field aliases from {path}"))?,
            Err(_) => FieldAliases::default(),
        };

        Ok(Self {
            api_url: parse_base_url(&api_url)?,
            session_path: env::var("MYFLIX_SESSION_PATH")
                .unwrap_or_else(|_| "./data/session.json".to_string())
                .into(),
            request_timeout: Duration::from_secs(timeout_secs),
            favorites_route,
            field_aliases,
        })
    }

    /// A config pointing at `api_url` with every other setting at its default.
    pub fn with_api_url(api_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            api_url: parse_base_url(api_url)?,
            session_path: "./data/session.json".into(),
            request_timeout: Duration::from_secs(30),
            favorites_route: FavoritesRoute::default(),
            field_aliases: FieldAliases::default(),
        })
    }
}

/// Parses the API base URL, making sure it ends in `/` so path joins append.
fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid API url `{raw}`"))?;
    if url.cannot_be_a_base() {
        bail!("API url `{raw}` cannot be used as a base");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
