use async_trait::async_trait;
use dialoguer::{Input, Password};

use crate::cli::commands::CallableTrait;
use crate::cli::context::AppContext;
use crate::cli::error::CliError;
use crate::forms::{LoginForm, RegisterForm};
use crate::session::AuthenticatedUser;

fn prompt_text(prompt: &str) -> Result<String, CliError> {
    Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
}

fn prompt_password(confirm: bool) -> Result<String, CliError> {
    let mut password = Password::new().with_prompt("Password");
    if confirm {
        password = password.with_confirmation("Repeat password", "Passwords do not match");
    }
    Ok(password.interact()?)
}

fn print_identity(user: &AuthenticatedUser) {
    eprintln!("✓ Logged in as {} <{}>", user.user.username, user.user.email);
    if user.profile_id().is_none() {
        eprintln!("  No storefront profile is linked to this account; voting is unavailable.");
    }
}

/// `leftorium login [--identifier <name|email>] [--password <pw>]`
///
/// Prompts for whatever was not passed on the command line and stores the
/// token in `~/.config/leftorium/session.json`.
pub struct LoginCommand {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

impl LoginCommand {
    pub fn new(identifier: Option<String>, password: Option<String>) -> Self {
        Self {
            identifier,
            password,
        }
    }
}

#[async_trait]
impl CallableTrait for LoginCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let identifier = match &self.identifier {
            Some(identifier) => identifier.clone(),
            None => prompt_text("Username or email")?,
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => prompt_password(false)?,
        };

        let user = ctx
            .session
            .login(&LoginForm {
                identifier,
                password,
            })
            .await?;
        ctx.sync_read_token().await;
        print_identity(&user);
        Ok(())
    }
}

/// `leftorium register --username <name> --email <email> [--password <pw>]`
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

impl RegisterCommand {
    pub fn new(username: String, email: String, password: Option<String>) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

#[async_trait]
impl CallableTrait for RegisterCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        let password = match &self.password {
            Some(password) => password.clone(),
            None => prompt_password(true)?,
        };
        let user = ctx
            .session
            .register(&RegisterForm {
                username: self.username.clone(),
                email: self.email.clone(),
                password,
            })
            .await?;
        ctx.sync_read_token().await;
        print_identity(&user);
        Ok(())
    }
}

/// `leftorium logout`
pub struct LogoutCommand;

#[async_trait]
impl CallableTrait for LogoutCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        ctx.session.logout().await?;
        ctx.sync_read_token().await;
        eprintln!("✓ Logged out");
        Ok(())
    }
}

/// `leftorium whoami`
pub struct WhoamiCommand;

#[async_trait]
impl CallableTrait for WhoamiCommand {
    async fn call(&self, ctx: &AppContext) -> Result<(), CliError> {
        match ctx.session.current_user().await {
            Some(user) => {
                println!("{} <{}>", user.username, user.email);
                match user.profile_id {
                    Some(profile_id) => println!("Profile: {}", profile_id),
                    None => println!("Profile: none"),
                }
            }
            None => println!("Not logged in. Run: leftorium login"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::context;
    use crate::connectors::cms::MockCmsConnector;
    use std::sync::Arc;

    #[tokio::test]
    async fn login_with_arguments_skips_prompts() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let ctx = context(&mock, None).await;

        LoginCommand::new(Some("ned".into()), Some("okilydokily".into()))
            .call(&ctx)
            .await
            .unwrap();
        assert_eq!(
            ctx.session.current_user().await.map(|u| u.username),
            Some("ned".to_string())
        );

        LogoutCommand.call(&ctx).await.unwrap();
        assert!(ctx.session.current_user().await.is_none());
    }

    #[tokio::test]
    async fn register_with_arguments() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let ctx = context(&mock, None).await;

        RegisterCommand::new("maude".into(), "maude@leftorium.test".into(), Some("secret1".into()))
            .call(&ctx)
            .await
            .unwrap();
        let user = ctx.session.require_user().await.unwrap();
        assert!(user.profile_id().is_some());
        assert!(WhoamiCommand.call(&ctx).await.is_ok());
    }
}
