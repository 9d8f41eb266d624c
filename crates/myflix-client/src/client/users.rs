use crate::config::FavoritesRoute;
use crate::error::ApiResult;
use crate::models::{FavoriteRequest, Movie, User, UserPatch};
use crate::validation;

use super::ApiClient;

impl ApiClient {
    pub async fn get_user(&self) -> ApiResult<User> {
        let username = self.require_username()?;
        let body = self
            .send(self.with_auth(self.http.get(self.url(&["users", username.as_str()])?)))
            .await?;
        Ok(self.normalizer.user(&body))
    }

    /// Updates the stored user's profile and returns the server's copy.
    ///
    /// Only the patch fields are checked here; matching a typed confirmation
    /// is the form's job (see [`validation::validate_patch_confirmed`]).
    /// A changed username is not written back to the session; callers that
    /// rename the account must log the session in again under the new name.
    pub async fn edit_user(&self, patch: &UserPatch) -> ApiResult<User> {
        validation::validate_patch(patch)?;
        let username = self.require_username()?;
        tracing::info!("Updating profile of {username}");

        let request = self.http.put(self.url(&["users", username.as_str()])?).json(patch);
        let body = self.send(self.with_auth(request)).await?;
        Ok(self.normalizer.user(&body))
    }

    /// Deletes the stored user's account. The session is left for the caller to clear.
    pub async fn delete_user(&self) -> ApiResult<()> {
        let username = self.require_username()?;
        tracing::info!("Deleting account {username}");

        self.send(self.with_auth(self.http.delete(self.url(&["users", username.as_str()])?)))
            .await?;
        Ok(())
    }

    pub async fn add_favorite(&self, movie_id: &str) -> ApiResult<()> {
        let username = self.require_username()?;
        let request = match self.favorites_route {
            FavoritesRoute::Favorites => self
                .http
                .post(self.url(&["users", username.as_str(), "favorites"])?)
                .json(&FavoriteRequest { movie_id }),
            FavoritesRoute::Movies => self
                .http
                .post(self.url(&["users", username.as_str(), "movies", movie_id])?),
        };

        self.send(self.with_auth(request)).await?;
        tracing::debug!("Added {movie_id} to favorites");
        Ok(())
    }

    pub async fn remove_favorite(&self, movie_id: &str) -> ApiResult<()> {
        let username = self.require_username()?;
        let segment = match self.favorites_route {
            FavoritesRoute::Favorites => "favorites",
            FavoritesRoute::Movies => "movies",
        };

        let url = self.url(&["users", username.as_str(), segment, movie_id])?;
        self.send(self.with_auth(self.http.delete(url))).await?;
        tracing::debug!("Removed {movie_id} from favorites");
        Ok(())
    }

    /// The catalog entries the user has marked, in catalog order.
    ///
    /// Favorite ids with no matching movie are skipped.
    pub async fn favorite_movies(&self) -> ApiResult<Vec<Movie>> {
        let user = self.get_user().await?;
        let movies = self.list_movies().await?;
        Ok(movies
            .into_iter()
            .filter(|m| user.favorite_movie_ids.contains(&m.id))
            .collect())
    }
}
