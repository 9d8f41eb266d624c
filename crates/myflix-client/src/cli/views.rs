use std::io::{self, Write};

use crate::favorites::FavoriteSet;
use crate::models::{Director, Genre, Movie, User};

pub fn movie_list(out: &mut impl Write, movies: &[Movie], favorites: &FavoriteSet) -> io::Result<()> {
    if movies.is_empty() {
        return writeln!(out, "No movies found.");
    }
    for movie in movies {
        let star = if favorites.contains(&movie.id) { '*' } else { ' ' };
        let featured = if movie.featured { " [featured]" } else { "" };
        writeln!(out, "{star} {:<24} {}{featured}", movie.id, display_or(&movie.title, "(untitled)"))?;

        let mut byline = Vec::new();
        if !movie.genre.name.is_empty() {
            byline.push(movie.genre.name.as_str());
        }
        if !movie.director.name.is_empty() {
            byline.push(movie.director.name.as_str());
        }
        if !byline.is_empty() {
            writeln!(out, "  {:<24} {}", "", byline.join(" / "))?;
        }
    }
    Ok(())
}

/// The synopsis dialog.
pub fn movie_detail(out: &mut impl Write, movie: &Movie) -> io::Result<()> {
    writeln!(out, "{}", display_or(&movie.title, "(untitled)"))?;
    writeln!(out, "id:       {}", movie.id)?;
    if !movie.genre.name.is_empty() {
        writeln!(out, "genre:    {}", movie.genre.name)?;
    }
    if !movie.director.name.is_empty() {
        writeln!(out, "director: {}", movie.director.name)?;
    }
    if !movie.image_path.is_empty() {
        writeln!(out, "image:    {}", movie.image_path)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", display_or(&movie.description, "No synopsis available."))
}

pub fn director(out: &mut impl Write, director: &Director) -> io::Result<()> {
    writeln!(out, "{}", display_or(&director.name, "Unknown Director"))?;
    if let Some(born) = director.birth_date {
        writeln!(out, "born: {}", born.format("%B %-d, %Y"))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", display_or(&director.bio, "No biography available."))
}

pub fn genre(out: &mut impl Write, genre: &Genre) -> io::Result<()> {
    writeln!(out, "{}", display_or(&genre.name, "Unknown Genre"))?;
    writeln!(out)?;
    writeln!(out, "{}", display_or(&genre.description, "No description available."))
}

pub fn profile(out: &mut impl Write, user: &User) -> io::Result<()> {
    writeln!(out, "username:  {}", user.username)?;
    writeln!(out, "email:     {}", display_or(&user.email, "-"))?;
    match user.birth_date {
        Some(date) => writeln!(out, "birthday:  {}", date.format("%Y-%m-%d"))?,
        None => writeln!(out, "birthday:  -")?,
    }
    writeln!(out, "favorites: {}", user.favorite_movie_ids.len())
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
