use crate::error::ApiResult;
use crate::models::{Director, Genre, Movie};

use super::ApiClient;

impl ApiClient {
    /// The full catalog. Needs a stored token.
    pub async fn list_movies(&self) -> ApiResult<Vec<Movie>> {
        self.require_token()?;
        let body = self
            .send(self.with_auth(self.http.get(self.url(&["movies"])?)))
            .await?;

        let movies = self.normalizer.movies(&body);
        tracing::debug!("Fetched {} movies", movies.len());
        Ok(movies)
    }

    pub async fn get_movie(&self, title: &str) -> ApiResult<Movie> {
        self.require_token()?;
        let body = self
            .send(self.with_auth(self.http.get(self.url(&["movies", title])?)))
            .await?;
        Ok(self.normalizer.movie(&body))
    }

    pub async fn get_director(&self, name: &str) -> ApiResult<Director> {
        self.require_token()?;
        let url = self.url(&["movies", "director", name])?;
        let body = self.send(self.with_auth(self.http.get(url))).await?;
        Ok(self.normalizer.director(&body))
    }

    pub async fn get_genre(&self, name: &str) -> ApiResult<Genre> {
        self.require_token()?;
        let url = self.url(&["movies", "genre", name])?;
        let body = self.send(self.with_auth(self.http.get(url))).await?;
        Ok(self.normalizer.genre(&body))
    }
}
