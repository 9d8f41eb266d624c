use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Candidate keys for every canonical field, in precedence order.
///
/// The first key of each list is the server's own casing; the rest are the
/// alternates seen across API versions. Lists can be overridden from a JSON
/// file, and any list missing from that file keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub movie_id: Vec<String>,
    pub title: Vec<String>,
    pub description: Vec<String>,
    pub genre: Vec<String>,
    pub genre_name: Vec<String>,
    pub genre_description: Vec<String>,
    pub director: Vec<String>,
    pub director_name: Vec<String>,
    pub director_bio: Vec<String>,
    pub director_birth: Vec<String>,
    pub image_path: Vec<String>,
    pub featured: Vec<String>,

    pub user_id: Vec<String>,
    pub username: Vec<String>,
    pub email: Vec<String>,
    pub birth_date: Vec<String>,
    pub favorites: Vec<String>,

    pub token: Vec<String>,
    pub login_user: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            movie_id: keys(&["_id", "id", "ID", "Id", "movieId", "MovieID"]),
            title: keys(&["Title", "title"]),
            description: keys(&["Description", "description", "Synopsis", "synopsis"]),
            genre: keys(&["Genre", "genre"]),
            genre_name: keys(&["Name", "name"]),
            genre_description: keys(&["Description", "description"]),
            director: keys(&["Director", "director"]),
            director_name: keys(&["Name", "name"]),
            director_bio: keys(&["Bio", "bio", "Biography", "biography"]),
            director_birth: keys(&["Birth", "birth", "BirthDate", "birthDate", "Birthday", "birthday"]),
            image_path: keys(&["ImagePath", "imagePath", "imagepath", "image_path", "ImageURL", "imageUrl"]),
            featured: keys(&["Featured", "featured"]),

            user_id: keys(&["_id", "id", "ID", "Id"]),
            username: keys(&["Username", "username", "UserName", "userName"]),
            email: keys(&["Email", "email"]),
            birth_date: keys(&["Birthday", "birthday", "BirthDate", "birthDate"]),
            favorites: keys(&[
                "FavoriteMovies",
                "favoriteMovies",
                "favoriteMovieIds",
                "Favorites",
                "favorites",
            ]),

            token: keys(&["token", "Token", "accessToken"]),
            login_user: keys(&["user", "User"]),
        }
    }
}

impl FieldAliases {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let aliases = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(aliases)
    }
}
