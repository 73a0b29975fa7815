use livraria_core::{update_allowed_option, ConfigError, Outcome};
use serde_json::json;

use crate::cli::{CredentialArgs, LoginArgs, SetOptionArgs};
use crate::error::CliError;

use super::Context;

pub async fn connectivity(context: &Context) -> Outcome {
    let report = context.api.test_connectivity().await;
    Outcome {
        success: report.success,
        message: report.message,
        data: report
            .details
            .and_then(|details| serde_json::to_value(details).ok()),
    }
}

pub async fn login(context: &Context, args: &LoginArgs) -> Outcome {
    let result = context
        .tokens
        .sign_in(
            &args.url,
            &args.credentials.username,
            &args.credentials.password,
            !args.no_remember,
        )
        .await;

    match result {
        Ok(login) => Outcome {
            success: login.success,
            message: login.message,
            data: login
                .expires_at
                .map(|expires_at| json!({ "expiresAt": expires_at })),
        },
        Err(error) => Outcome::failure(error.to_string()),
    }
}

pub fn logout(context: &Context) -> Result<Outcome, CliError> {
    context.tokens.logout()?;
    Ok(Outcome::ok("Logged out successfully", None))
}

pub async fn test_login(context: &Context, args: &CredentialArgs) -> Outcome {
    let check = context
        .api
        .test_login(&args.username, &args.password)
        .await;
    Outcome {
        success: check.success,
        message: check.message,
        data: check
            .token_expires_at
            .map(|expires_at| json!({ "tokenExpiresAt": expires_at })),
    }
}

pub fn set_option(context: &Context, args: &SetOptionArgs) -> Result<Outcome, CliError> {
    match update_allowed_option(context.options.as_ref(), &args.name, &args.value) {
        Ok(()) => Ok(Outcome::ok(
            "Option updated successfully",
            Some(json!({ "name": args.name })),
        )),
        Err(error @ ConfigError::OptionNotAllowed(_)) => Ok(Outcome::failure(error.to_string())),
        Err(ConfigError::Store(error)) => Err(error.into()),
    }
}
