//! Sign-in commands

use crate::app::App;
use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use rentacar_api_client::endpoints::Credentials;
use rentacar_api_client::{AuthSession, AuthStatus};
use rentacar_cli::output::print_json;
use rentacar_cli::Status;
use serde_json::Value;

/// Sign in and store the session tokens
pub async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let mut session = AuthSession::new(app.client.clone());
    let outcome = session.sign_in(&Credentials::new(email, password)).await;
    let outcome = App::require(outcome)?;

    if app.json() {
        print_json(&serde_json::json!({
            "ok": outcome.ok,
            "message": outcome.message,
            "status": session.status(),
            "user": session.user(),
        }))?;
        return Ok(());
    }

    Status::success(&outcome.message);
    if let Some(user) = session.user() {
        println!("  Signed in as {}", describe(user).bold());
    } else {
        Status::warning("Signed in, but the profile could not be loaded");
    }
    Ok(())
}

/// Close the session; local tokens are removed regardless
pub async fn logout(app: &App) -> Result<()> {
    let mut session = AuthSession::new(app.client.clone());
    session.sign_out().await;
    if app.json() {
        print_json(&serde_json::json!({ "ok": true, "status": session.status() }))?;
    } else {
        Status::success("Signed out");
    }
    Ok(())
}

/// Show the signed-in user
pub async fn whoami(app: &App) -> Result<()> {
    let mut session = AuthSession::new(app.client.clone());
    if session.init().await != AuthStatus::Authenticated {
        bail!("Not signed in. Run `rentacar login` first.");
    }

    let user = session.user().cloned().unwrap_or(Value::Null);
    if app.json() {
        print_json(&user)?;
    } else {
        println!("{}", describe(&user));
    }
    Ok(())
}

/// `Name <email>` when the profile has them, else the raw JSON
fn describe(user: &Value) -> String {
    let field = |key: &str| user.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    let name = field("nombre").or_else(|| field("name"));
    let email = field("correo").or_else(|| field("email"));
    match (name, email) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (None, Some(email)) => email.to_string(),
        (Some(name), None) => name.to_string(),
        (None, None) => user.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_user() {
        assert_eq!(
            describe(&json!({ "nombre": "Ana", "correo": "ana@example.com" })),
            "Ana <ana@example.com>"
        );
        assert_eq!(describe(&json!({ "email": "a@b.com" })), "a@b.com");
        assert_eq!(describe(&json!({ "id": 1 })), "{\"id\":1}");
    }
}
