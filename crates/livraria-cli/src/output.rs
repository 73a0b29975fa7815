use livraria_core::Outcome;

use crate::error::CliError;

pub fn render(outcome: &Outcome, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(outcome)?
    } else {
        serde_json::to_string(outcome)?
    };
    println!("{payload}");
    Ok(())
}
