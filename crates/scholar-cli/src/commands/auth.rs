//! `scholar login`, `scholar logout` and `scholar whoami`

use super::AppContext;
use crate::error::{CliError, Result};
use crate::progress;
use crate::session::SessionUser;
use colored::Colorize;
use inquire::Password;

/// Sign in and store the token
pub async fn login(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::new("Password:").without_confirmation().prompt()?,
    };

    ctx.navigate("/login");
    let spinner = progress::create_spinner("Signing in...");
    let response = ctx.client.login(email, &password).await;
    spinner.finish_and_clear();
    let response = response?;

    let user: SessionUser = response.user.into();
    let greeting = user.name.clone().unwrap_or_else(|| user.email.clone());
    let role = user.role;
    {
        let mut session = ctx.session.lock();
        session.sign_in(response.token, user);
        session.save()?;
    }

    println!("{} Signed in as {} ({})", "✓".green(), greeting.bold(), role);
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    let was_signed_in = ctx.session.lock().is_authenticated();
    ctx.session.lock().clear()?;

    if was_signed_in {
        println!("{} Signed out", "✓".green());
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.session.snapshot();
    let user = match (&session.token, &session.user) {
        (Some(_), Some(user)) => user,
        _ => return Err(CliError::NotLoggedIn),
    };

    println!("{:<12} {}", "email:", user.email);
    if let Some(name) = &user.name {
        println!("{:<12} {}", "name:", name);
    }
    println!("{:<12} {}", "role:", user.role);
    if let Some(active) = &session.active_application {
        println!(
            "{:<12} {} (scholarship {})",
            "applying:", active.application_id, active.scholarship_id
        );
    }
    Ok(())
}
