//! Maps the catalog API's inconsistently-cased payloads onto the canonical
//! [`Movie`] and [`User`] shapes.
//!
//! Every function here is pure: the same JSON always produces the same value.

mod aliases;

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub use aliases::FieldAliases;

use crate::error::{ApiError, ApiResult};
use crate::models::{Director, Genre, LoginResponse, Movie, User};

/// Prefix of ids synthesized for movies the server sent without one.
pub const PLACEHOLDER_ID_PREFIX: &str = "local-";

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    aliases: FieldAliases,
}

impl Normalizer {
    pub fn new(aliases: FieldAliases) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }

    pub fn movie(&self, raw: &Value) -> Movie {
        self.movie_with_flag(raw).0
    }

    /// Normalizes a catalog listing. Anything that is not an array is an empty
    /// catalog. Identical id-less records get distinct placeholder ids.
    pub fn movies(&self, raw: &Value) -> Vec<Movie> {
        let Some(items) = raw.as_array() else {
            return Vec::new();
        };

        let mut seen: HashMap<String, usize> = HashMap::new();
        items
            .iter()
            .map(|item| {
                let (mut movie, synthetic) = self.movie_with_flag(item);
                if synthetic {
                    let count = seen.entry(movie.id.clone()).or_insert(0);
                    if *count > 0 {
                        movie.id = format!("{}-{}", movie.id, count);
                    }
                    *count += 1;
                }
                movie
            })
            .collect()
    }

    fn movie_with_flag(&self, raw: &Value) -> (Movie, bool) {
        let a = &self.aliases;
        let (id, synthetic) = match pick(raw, &a.movie_id, as_id) {
            Some(id) => (id, false),
            None => (placeholder_id(raw), true),
        };

        let movie = Movie {
            id,
            title: pick(raw, &a.title, as_text).unwrap_or_default(),
            description: pick(raw, &a.description, as_text).unwrap_or_default(),
            genre: self.nested_genre(raw),
            director: self.nested_director(raw),
            image_path: pick(raw, &a.image_path, as_text).unwrap_or_default(),
            featured: pick(raw, &a.featured, as_bool).unwrap_or(false),
        };
        (movie, synthetic)
    }

    /// Normalizes a genre payload, either bare or wrapped under a genre key.
    pub fn genre(&self, raw: &Value) -> Genre {
        if has_any(raw, &self.aliases.genre) {
            self.nested_genre(raw)
        } else {
            self.genre_fields(raw)
        }
    }

    /// Normalizes a director payload, either bare or wrapped under a director key.
    pub fn director(&self, raw: &Value) -> Director {
        if has_any(raw, &self.aliases.director) {
            self.nested_director(raw)
        } else {
            self.director_fields(raw)
        }
    }

    pub fn user(&self, raw: &Value) -> User {
        let a = &self.aliases;
        User {
            id: pick(raw, &a.user_id, as_id).unwrap_or_default(),
            username: pick(raw, &a.username, as_text).unwrap_or_default(),
            email: pick(raw, &a.email, as_text).unwrap_or_default(),
            birth_date: pick(raw, &a.birth_date, as_date),
            favorite_movie_ids: pick(raw, &a.favorites, |v| self.favorite_ids(v))
                .unwrap_or_default(),
        }
    }

    /// Splits a login response into its token and normalized user.
    pub fn login(&self, raw: &Value) -> ApiResult<LoginResponse> {
        let token = pick(raw, &self.aliases.token, as_text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Unknown("Login response did not include a token".into()))?;
        let user = raw
            .as_object()
            .and_then(|_| self.aliases.login_user.iter().find_map(|k| raw.get(k)))
            .filter(|v| v.is_object())
            .map(|v| self.user(v))
            .unwrap_or_default();

        Ok(LoginResponse { token, user })
    }

    fn genre_fields(&self, obj: &Value) -> Genre {
        Genre {
            name: pick(obj, &self.aliases.genre_name, as_text).unwrap_or_default(),
            description: pick(obj, &self.aliases.genre_description, as_text).unwrap_or_default(),
        }
    }

    fn director_fields(&self, obj: &Value) -> Director {
        Director {
            name: pick(obj, &self.aliases.director_name, as_text).unwrap_or_default(),
            bio: pick(obj, &self.aliases.director_bio, as_text).unwrap_or_default(),
            birth_date: pick(obj, &self.aliases.director_birth, as_date),
        }
    }

    // Each casing of the parent key may carry its own casing of the child
    // keys, so every child field walks the parents in order. A bare string
    // parent is taken as the name.
    fn nested_genre(&self, raw: &Value) -> Genre {
        let a = &self.aliases;
        let parents: Vec<&Value> = present(raw, &a.genre).collect();
        Genre {
            name: first_nested(&parents, &a.genre_name, as_text, true).unwrap_or_default(),
            description: first_nested(&parents, &a.genre_description, as_text, false)
                .unwrap_or_default(),
        }
    }

    fn nested_director(&self, raw: &Value) -> Director {
        let a = &self.aliases;
        let parents: Vec<&Value> = present(raw, &a.director).collect();
        Director {
            name: first_nested(&parents, &a.director_name, as_text, true).unwrap_or_default(),
            bio: first_nested(&parents, &a.director_bio, as_text, false).unwrap_or_default(),
            birth_date: first_nested(&parents, &a.director_birth, as_date, false),
        }
    }

    fn favorite_ids(&self, value: &Value) -> Option<BTreeSet<String>> {
        let items = value.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(_) => pick(item, &self.aliases.movie_id, as_id),
                    other => as_id(other),
                })
                .collect(),
        )
    }
}

/// First candidate key whose value is non-null and converts.
fn pick<T>(obj: &Value, keys: &[String], convert: impl Fn(&Value) -> Option<T>) -> Option<T> {
    present(obj, keys).find_map(convert)
}

fn present<'a>(obj: &'a Value, keys: &'a [String]) -> impl Iterator<Item = &'a Value> + 'a {
    keys.iter()
        .filter_map(move |k| obj.as_object().and_then(|m| m.get(k)))
        .filter(|v| !v.is_null())
}

fn has_any(obj: &Value, keys: &[String]) -> bool {
    present(obj, keys).next().is_some()
}

fn first_nested<T>(
    parents: &[&Value],
    keys: &[String],
    convert: impl Fn(&Value) -> Option<T> + Copy,
    bare_string: bool,
) -> Option<T> {
    parents.iter().copied().find_map(|parent| match parent {
        Value::Object(_) => pick(parent, keys, convert),
        Value::String(_) if bare_string => convert(parent),
        _ => None,
    })
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ids may also arrive as Mongo extended JSON (`{"$oid": "..."}`).
fn as_id(v: &Value) -> Option<String> {
    match v {
        Value::Object(m) => m.get("$oid").and_then(as_text),
        other => as_text(other).filter(|s| !s.is_empty()),
    }
}

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Keeps the calendar date as written, without shifting it into another zone.
fn as_date(v: &Value) -> Option<NaiveDate> {
    let s = v.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn placeholder_id(raw: &Value) -> String {
    let digest = Sha256::digest(raw.to_string().as_bytes());
    format!("{PLACEHOLDER_ID_PREFIX}{}", &hex::encode(digest)[..16])
}
