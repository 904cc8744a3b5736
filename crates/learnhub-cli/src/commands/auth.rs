use anyhow::{Context, Result};
use colored::Colorize;
use learnhub_gateway::{Gateway, Role};

use crate::cli::LoginArgs;
use crate::output::{print_error, print_field, print_success};

pub async fn login(gateway: &Gateway, server: &str, args: &LoginArgs) -> Result<()> {
    let session = match (&args.google_token, &args.dev_email) {
        (Some(token), _) => {
            gateway
                .login_with_google(token, args.role.map(Role::from))
                .await?
        }
        (None, Some(email)) => {
            let role = args
                .role
                .map(Role::from)
                .context("--role is required with --dev-email")?;
            println!("Logging in as {email} (dev bypass)...");
            gateway.login_dev_bypass(email, role).await?
        }
        (None, None) => anyhow::bail!("Either --google-token or --dev-email is required"),
    };

    print_success(&format!(
        "Logged in to {} as {} ({})",
        server.cyan(),
        session.principal.display_name().cyan(),
        session.principal.role
    ));
    Ok(())
}

pub fn logout(gateway: &Gateway, profile: &str) {
    if gateway.logout() {
        print_success("Logged out (session removed)");
    } else {
        println!("No session found for profile \"{profile}\"");
    }
}

pub fn whoami(gateway: &Gateway, server: &str, profile: &str) {
    match gateway.session().current() {
        Some(session) => {
            print_field("Profile", profile);
            print_field("Server", server.cyan());
            print_field("User", session.principal.display_name());
            print_field("Email", &session.principal.email);
            print_field("Role", session.principal.role);
            print_field(
                "Auth",
                format!("{} (token: {})", session.scheme.as_str(), session.token_preview()),
            );
        }
        None => {
            print_error(&format!("Not logged in (profile: \"{profile}\")"));
        }
    }
}
