use livraria_core::{AutoCreateOutcome, Outcome};

use crate::cli::{CustomOrderArgs, OrderArgs, SelectArgs, StatusArgs};
use crate::error::CliError;

use super::{load_custom, Context};

pub async fn quotes(context: &Context, args: &CustomOrderArgs) -> Result<Outcome, CliError> {
    let custom = load_custom(args.custom.as_deref())?;
    let result = context
        .handler
        .get_quotes_for_order(args.order_id, custom.as_ref())
        .await;
    Ok(Outcome::from_result(result, "Quotes retrieved successfully"))
}

pub async fn select(context: &Context, args: &SelectArgs) -> Outcome {
    let result = context
        .handler
        .select_quote(
            args.order_id,
            &args.quote_request_id,
            &args.quote_id,
            args.sender_profile_id.as_deref(),
        )
        .await;
    Outcome::from_result(result, "Quote selected successfully")
}

pub async fn label(context: &Context, args: &OrderArgs) -> Outcome {
    let result = context.handler.generate_label(args.order_id).await;
    Outcome::from_result(result, "Expedition created successfully")
}

pub async fn create(context: &Context, args: &CustomOrderArgs) -> Result<Outcome, CliError> {
    let custom = load_custom(args.custom.as_deref())?;
    let result = context
        .handler
        .create_expedition_for_order(args.order_id, custom.as_ref())
        .await;
    Ok(Outcome::from_result(result, "Expedition created successfully"))
}

/// Runs creation directly; a pending intent for the order is consumed first
/// so a queued run cannot repeat it.
pub async fn auto_create(context: &Context, args: &OrderArgs) -> Outcome {
    let result = match context.handler.run_pending_auto_create(args.order_id).await {
        Ok(Some(outcome)) => Ok(outcome),
        Ok(None) => context.handler.auto_create_expedition(args.order_id).await,
        Err(error) => Err(error),
    };

    let message = match &result {
        Ok(AutoCreateOutcome::Disabled) => "Auto-create is disabled",
        Ok(AutoCreateOutcome::AlreadyExists) => "Expedition already exists for this order",
        _ => "Expedition created successfully",
    };
    Outcome::from_result(result, message)
}

pub async fn status(context: &Context, args: &StatusArgs) -> Outcome {
    let result = context
        .handler
        .update_expedition_status(args.order_id, args.awb.as_deref())
        .await;
    Outcome::from_result(result, "Expedition status updated")
}

pub fn show(context: &Context, args: &OrderArgs) -> Outcome {
    match context.handler.get_order_expedition_data(args.order_id) {
        Ok(Some(record)) => Outcome::from_result(Ok(record), "Expedition data retrieved"),
        Ok(None) => Outcome::failure("No expedition found for this order"),
        Err(error) => Outcome::from_error(&error),
    }
}
