//! The `myflix` command line: one subcommand per screen of the catalog.

pub mod views;

use std::io::{self, Write};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::favorites::FavoriteSet;
use crate::models::{NewUser, UserPatch};
use crate::validation;

#[derive(Debug, Parser)]
#[command(name = "myflix")]
#[command(about = "Browse the myFlix movie catalog and manage your favorites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        username: String,
        #[arg(short, long)]
        email: String,
        /// Birthday as YYYY-MM-DD
        #[arg(short, long, value_parser = parse_date)]
        birthday: NaiveDate,
        #[arg(short, long, env = "MYFLIX_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(short, long, env = "MYFLIX_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List the catalog
    Movies {
        /// Only featured movies
        #[arg(long)]
        featured: bool,
    },
    /// Show a movie's synopsis
    Movie { title: String },
    /// Show a director's details
    Director { name: String },
    /// Show a genre's description
    Genre { name: String },
    /// Show your profile
    Profile,
    /// Update your profile
    EditProfile {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// Birthday as YYYY-MM-DD
        #[arg(short, long, value_parser = parse_date)]
        birthday: Option<NaiveDate>,
        /// Prompt for a new password
        #[arg(long)]
        change_password: bool,
    },
    /// Delete your account (cannot be undone)
    DeleteAccount {
        #[arg(long)]
        confirm: bool,
    },
    /// List your favorite movies
    Favorites,
    /// Add a movie to your favorites, or remove it if it is already there
    Favorite { movie_id: String },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("`{s}` is not a YYYY-MM-DD date"))
}

pub async fn run(command: Commands, client: &ApiClient) -> anyhow::Result<()> {
    run_with(command, client, &mut io::stdout().lock()).await
}

/// Runs one command, writing what the visitor sees to `out`.
///
/// An auth failure adds a "log in again" hint and leaves the stored session as it was.
pub async fn run_with(command: Commands, client: &ApiClient, out: &mut impl Write) -> anyhow::Result<()> {
    let result = execute(command, client, out).await;

    if let Err(e) = &result {
        if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_auth) {
            writeln!(out, "You are not logged in, or your session has expired.")?;
            writeln!(out, "Run `myflix login <username>` to continue.")?;
        }
    }
    result
}

async fn execute(command: Commands, client: &ApiClient, out: &mut impl Write) -> anyhow::Result<()> {
    let session = client.session();

    match command {
        Commands::Register {
            username,
            email,
            birthday,
            password,
        } => {
            let password = password_or_prompt(password, "Password: ")?;
            let user = NewUser {
                username,
                password,
                email,
                birthday: Some(birthday),
            };
            let created = client.register(&user).await?;
            writeln!(out, "User registration successful: {}", created.username)?;
            writeln!(out, "Run `myflix login {}` to sign in.", created.username)?;
        }
        Commands::Login { username, password } => {
            let password = password_or_prompt(password, "Password: ")?;
            let login = client.login(&username, &password).await?;
            session
                .login(&login.user.username, &login.token)
                .context("failed to save session")?;
            writeln!(out, "Login successful. Welcome, {}!", login.user.username)?;
        }
        Commands::Logout => {
            session.logout().context("failed to clear session")?;
            writeln!(out, "Logged out.")?;
        }
        Commands::Whoami => match session.current_username() {
            Some(username) if session.is_authenticated() => writeln!(out, "{username}")?,
            _ => writeln!(out, "Not logged in.")?,
        },
        Commands::Movies { featured } => {
            let mut movies = client.list_movies().await?;
            if featured {
                movies.retain(|m| m.featured);
            }
            // favorites are decoration here; a failed profile fetch still shows the list
            let favorites = match client.get_user().await {
                Ok(user) => FavoriteSet::from_user(&user),
                Err(e) => {
                    tracing::debug!("Could not load favorites for listing: {e}");
                    FavoriteSet::default()
                }
            };
            views::movie_list(out, &movies, &favorites)?;
        }
        Commands::Movie { title } => views::movie_detail(out, &client.get_movie(&title).await?)?,
        Commands::Director { name } => views::director(out, &client.get_director(&name).await?)?,
        Commands::Genre { name } => views::genre(out, &client.get_genre(&name).await?)?,
        Commands::Profile => views::profile(out, &client.get_user().await?)?,
        Commands::EditProfile {
            username,
            email,
            birthday,
            change_password,
        } => {
            let (password, confirm) = if change_password {
                let password = rpassword::prompt_password("New password: ")?;
                let confirm = rpassword::prompt_password("Confirm password: ")?;
                (Some(password), Some(confirm))
            } else {
                (None, None)
            };
            let patch = UserPatch {
                username,
                email,
                password,
                birth_date: birthday,
            };
            validation::validate_patch_confirmed(&patch, confirm.as_deref())?;

            let token = session.current_token();
            let updated = client.edit_user(&patch).await?;
            if let (Some(new_name), Some(token)) = (patch.username.as_deref(), token) {
                session
                    .login(new_name, &token)
                    .context("failed to save renamed session")?;
            }
            writeln!(out, "Profile updated successfully!")?;
            views::profile(out, &updated)?;
        }
        Commands::DeleteAccount { confirm } => {
            if !confirm {
                bail!("refusing to delete the account without --confirm");
            }
            client.delete_user().await?;
            session.logout().context("failed to clear session")?;
            writeln!(out, "Account deleted successfully.")?;
        }
        Commands::Favorites => {
            let movies = client.favorite_movies().await?;
            let favorites = FavoriteSet::new(movies.iter().map(|m| m.id.clone()));
            views::movie_list(out, &movies, &favorites)?;
        }
        Commands::Favorite { movie_id } => {
            let user = client.get_user().await?;
            let mut favorites = FavoriteSet::from_user(&user);
            if favorites.toggle(client, &movie_id).await? {
                writeln!(out, "Added {movie_id} to favorites.")?;
            } else {
                writeln!(out, "Removed {movie_id} from favorites.")?;
            }
        }
    }
    Ok(())
}

fn password_or_prompt(password: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => rpassword::prompt_password(prompt).context("failed to read password"),
    }
}
