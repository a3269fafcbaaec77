//! Session command handlers.

use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};
use movierama_core::api::RegisterRequest;
use movierama_core::config::{Config, paths};
use movierama_core::controllers::{LoginController, RegisterController};
use movierama_core::session::FileSessionStore;

use crate::cli::{App, open_session};

fn read_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

pub async fn login(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;

    let mut login = LoginController::init(&app.session);
    if !login.submit(&app.auth, &app.session, username, &password).await {
        let message = login.error_message.as_deref().unwrap_or("unknown error");
        bail!("Login failed: {message}");
    }

    println!(
        "Logged in as {}.",
        login.username.as_deref().unwrap_or(username)
    );
    if !app.config.session.persist {
        println!("Session persistence is off; the token is not kept after this command.");
    }
    Ok(())
}

pub async fn register(
    app: &App,
    username: String,
    first_name: String,
    last_name: String,
    password: Option<String>,
) -> Result<()> {
    let form = RegisterRequest {
        password: read_password(password)?,
        username,
        first_name,
        last_name,
    };

    let mut register = RegisterController::new();
    if !register.submit(&app.auth, &form).await {
        let message = register.error_message.as_deref().unwrap_or("unknown error");
        bail!("Registration failed: {message}");
    }
    println!("Registered {}. Run `movierama login` to sign in.", form.username);
    Ok(())
}

/// Works without a readable session file: an unparsable one is deleted
/// unread.
pub fn logout(config: &Config) -> Result<()> {
    let removed = match open_session(config) {
        Ok(session) => session.sign_out().context("clear session")?,
        Err(err) => {
            tracing::warn!(error = %err, "session unreadable, discarding file");
            FileSessionStore::discard(&paths::session_path())?
        }
    };
    if removed {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub fn whoami(app: &App) {
    match app.session.username() {
        Some(username) if !username.is_empty() => println!("{username}"),
        Some(_) => println!("Logged in (username unknown)."),
        None => println!("Not logged in."),
    }
}
