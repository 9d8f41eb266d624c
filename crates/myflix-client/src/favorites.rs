use std::collections::BTreeSet;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::models::User;

/// Local copy of a user's favorites, kept in step with the server by [`toggle`].
///
/// [`toggle`]: FavoriteSet::toggle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: BTreeSet<String>,
}

impl FavoriteSet {
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            ids: user.favorite_movie_ids.clone(),
        }
    }

    pub fn contains(&self, movie_id: &str) -> bool {
        self.ids.contains(movie_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Flips membership of `movie_id` and tells the server.
    ///
    /// The local change is applied first and undone if the request fails.
    /// Returns whether the movie is a favorite afterwards.
    pub async fn toggle(&mut self, client: &ApiClient, movie_id: &str) -> ApiResult<bool> {
        let adding = self.flip(movie_id);

        let result = if adding {
            client.add_favorite(movie_id).await
        } else {
            client.remove_favorite(movie_id).await
        };

        if let Err(e) = result {
            tracing::warn!("Favorite toggle for {movie_id} failed, reverting: {e}");
            self.flip(movie_id);
            return Err(e);
        }
        Ok(adding)
    }

    /// Returns true if the id was added, false if it was removed.
    fn flip(&mut self, movie_id: &str) -> bool {
        if self.ids.remove(movie_id) {
            false
        } else {
            self.ids.insert(movie_id.to_string());
            true
        }
    }
}
