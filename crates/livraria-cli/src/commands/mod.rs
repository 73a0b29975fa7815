mod account;
mod expedition;
mod hooks;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use livraria_core::{
    ApiClient, CourierConfig, CourierIdCache, CourierTransport, CustomExpeditionData,
    MemoryOrderSource, OptionStore, OrderHandler, Outcome, ReqwestHttpClient, RuntimeEnvironment,
    TokenManager,
};
use livraria_store::{DuckDbStore, StoreConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Services wired for one CLI invocation.
pub struct Context {
    pub options: Arc<dyn OptionStore>,
    pub tokens: Arc<TokenManager>,
    pub api: ApiClient,
    pub handler: Arc<OrderHandler>,
    pub orders: Arc<MemoryOrderSource>,
}

impl Context {
    fn open(cli: &Cli) -> Result<Self, CliError> {
        let config = match &cli.home {
            Some(home) => StoreConfig::in_dir(home),
            None => StoreConfig::default(),
        };
        let store = Arc::new(DuckDbStore::open(config)?);
        let purged = store.purge_expired_transients()?;
        if purged > 0 {
            tracing::debug!(purged, "removed expired transients");
        }
        let options: Arc<dyn OptionStore> = store.clone();

        let courier_config = CourierConfig::from_options(options.as_ref())?;
        let http = ReqwestHttpClient::from_config(&courier_config)?;
        let transport = CourierTransport::new(
            Arc::new(http),
            courier_config,
            RuntimeEnvironment::detect(),
        );
        let tokens = Arc::new(TokenManager::new(transport, Arc::clone(&options)));
        let api = ApiClient::new(Arc::clone(&tokens));
        let couriers = Arc::new(CourierIdCache::new(api.clone(), Arc::clone(&options)));

        let orders = Arc::new(match &cli.orders {
            Some(path) => MemoryOrderSource::from_json_file(path)?,
            None => MemoryOrderSource::default(),
        });

        let handler = Arc::new(OrderHandler::new(
            api.clone(),
            couriers,
            orders.clone(),
            store,
            Arc::clone(&options),
        ));

        Ok(Self {
            options,
            tokens,
            api,
            handler,
            orders,
        })
    }
}

pub async fn run(cli: &Cli) -> Result<Outcome, CliError> {
    let context = Context::open(cli)?;

    let outcome = match &cli.command {
        Command::Connectivity => account::connectivity(&context).await,
        Command::Login(args) => account::login(&context, args).await,
        Command::Logout => account::logout(&context)?,
        Command::TestLogin(args) => account::test_login(&context, args).await,
        Command::SetOption(args) => account::set_option(&context, args)?,
        Command::Quotes(args) => expedition::quotes(&context, args).await?,
        Command::Select(args) => expedition::select(&context, args).await,
        Command::Label(args) => expedition::label(&context, args).await,
        Command::Create(args) => expedition::create(&context, args).await?,
        Command::AutoCreate(args) => expedition::auto_create(&context, args).await,
        Command::Status(args) => expedition::status(&context, args).await,
        Command::Expedition(args) => expedition::show(&context, args),
        Command::OrderStatus(args) => hooks::order_status(&context, args).await?,
    };

    if let Some(path) = &cli.orders {
        context.orders.write_json_file(path)?;
    }

    Ok(outcome)
}

fn load_custom(path: Option<&Path>) -> Result<Option<CustomExpeditionData>, CliError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path).map_err(|error| CliError::CustomData {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|error| CliError::CustomData {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
}
