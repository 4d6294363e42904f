//! Login, registration and session commands.

use anyhow::{Context as _, Result};
use basket_auth::{Credentials, Registration, User};
use dialoguer::{Input, Password};

use super::{AuthArgs, AuthCommand};
use crate::context::Context;

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { email, password } => login(email, password, ctx).await,
        AuthCommand::Register { name, email, phone } => register(name, email, phone, ctx).await,
        AuthCommand::Logout => logout(ctx),
        AuthCommand::Whoami => whoami(ctx),
        AuthCommand::Profile => profile(ctx).await,
    }
}

async fn login(email: Option<String>, password: Option<String>, ctx: &Context) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let client = ctx.client()?;
    let spinner = ctx.output.spinner("Signing in...");
    let result = client.login(&Credentials::new(email, password)).await;
    spinner.finish_and_clear();
    let session = result?;

    if ctx.output.is_json() {
        ctx.output.json(&session.user);
        return Ok(());
    }

    ctx.output.success(&format!("Welcome, {}", session.user.display_name()));
    if session.user.is_admin() {
        ctx.output.info("Admin console available: `basket admin`");
    }
    Ok(())
}

async fn register(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    ctx: &Context,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => prompt("Full name")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let registration = Registration {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password,
        phone: phone.filter(|p| !p.trim().is_empty()),
    };

    let client = ctx.client()?;
    let spinner = ctx.output.spinner("Creating account...");
    let result = client.register(&registration).await;
    spinner.finish_and_clear();
    let registered = result?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "email": registration.email,
            "message": registered.message,
        }));
        return Ok(());
    }

    ctx.output.success(
        registered
            .message
            .as_deref()
            .unwrap_or("Account created"),
    );
    ctx.output.info("Run `basket auth login` to sign in.");
    Ok(())
}

fn logout(ctx: &Context) -> Result<()> {
    let had_session = ctx.client()?.logout()?;
    if had_session {
        ctx.output.success("Logged out");
    } else {
        ctx.output.info("Not logged in");
    }
    Ok(())
}

fn whoami(ctx: &Context) -> Result<()> {
    let session = ctx.require_session()?;

    if ctx.output.is_json() {
        ctx.output.json(&session.user);
        return Ok(());
    }

    print_user(&session.user, ctx);
    ctx.output.kv("since", &session.created_at.format("%Y-%m-%d %H:%M").to_string());
    Ok(())
}

async fn profile(ctx: &Context) -> Result<()> {
    let session = ctx.require_session()?;
    let client = ctx.client()?;
    let user = client
        .profile(&session.user.email)
        .await
        .context("Failed to load profile")?;

    if ctx.output.is_json() {
        ctx.output.json(&user);
        return Ok(());
    }

    ctx.output.header("Profile");
    print_user(&user, ctx);
    Ok(())
}

fn print_user(user: &User, ctx: &Context) {
    ctx.output.kv("name", user.display_name());
    ctx.output.kv("email", &user.email);
    if let Some(phone) = &user.phone {
        ctx.output.kv("phone", phone);
    }
    ctx.output.kv("role", user.role.as_str());
}

fn prompt(label: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(label).interact_text()?)
}
