use livraria_core::{AutoCreateQueue, OrderSource, Outcome};
use serde_json::{json, Value};

use crate::cli::OrderStatusArgs;
use crate::error::CliError;

use super::Context;

/// Change the order status the way the shop would, then run the status hook
/// and wait for any queued auto-create to finish.
pub async fn order_status(context: &Context, args: &OrderStatusArgs) -> Result<Outcome, CliError> {
    let Some(previous) = context.orders.set_status(args.order_id, &args.status)? else {
        return Ok(Outcome::failure("Order not found"));
    };

    let queue = AutoCreateQueue::spawn(context.handler.clone());
    let queued = queue.handle_order_status_change(args.order_id, &previous, &args.status);
    let runs = queue.drain().await;

    let queued = match queued {
        Ok(queued) => queued,
        Err(error) => return Ok(Outcome::from_error(&error)),
    };

    let auto_create = runs
        .into_iter()
        .map(|run| match run.outcome {
            Ok(Some(outcome)) => serde_json::to_value(outcome).unwrap_or(Value::Null),
            Ok(None) => json!({ "outcome": "intent_consumed" }),
            Err(error) => json!({ "outcome": "failed", "code": error.code(), "message": error.to_string() }),
        })
        .next();

    Ok(Outcome::ok(
        "Order status updated",
        Some(json!({
            "orderId": args.order_id,
            "previousStatus": previous,
            "status": args.status,
            "autoCreateQueued": queued,
            "autoCreate": auto_create,
        })),
    ))
}
