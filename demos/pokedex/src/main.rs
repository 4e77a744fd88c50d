//! Pokedex command line
//!
//! Drives the application store from the terminal: one command, one or more
//! actions, then the resulting state is printed.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use composable_pokedex_core::environment::{Clock, SystemClock};
use composable_pokedex_http::{
    is_token_expired, FileTokenStore, MemoryNavigator, RequestMethods, TokenStore,
};
use pokedex::clients::{backend_client, pokeapi_client};
use pokedex::features::counter::{parse_increment_amount, select_count, CounterAction, TimerWork};
use pokedex::features::pokemon::{
    select_data, select_single_pokemon, Filters, HttpPokemonApi, PokemonAction,
};
use pokedex::{app_store, AppAction, AppEnvironment, AppStore, Config, Route};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Extra time granted to effects on top of the configured work and request durations
const GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "pokedex", version, about = "Counter and Pokemon browser")]
struct Cli {
    /// Token file used to authenticate backend requests
    #[arg(long, global = true)]
    tokens_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Counter actions
    Counter {
        #[command(subcommand)]
        command: CounterCommand,
    },
    /// List a page of Pokemon
    Pokemons {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Entries per page
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Show one Pokemon
    Pokemon {
        /// Pokemon name, ditto when omitted
        name: Option<String>,
    },
    /// Enter a route and run what it dispatches
    Visit {
        /// Location such as /pokemons/pikachu
        path: String,
    },
    /// End the session
    Logout,
    /// GET a path on the authenticated backend and print the body
    Get {
        /// Path such as /cms/me
        path: String,
    },
}

#[derive(Debug, Subcommand)]
enum CounterCommand {
    /// Add the amount typed in; anything that is not a number adds 0
    Add {
        /// Amount to add
        amount: String,
    },
    /// Add one after the async work completes
    AddAsync,
}

impl Command {
    /// Location the client is at while the command runs
    fn location(&self) -> String {
        match self {
            Self::Counter { .. } | Self::Get { .. } => Route::Home.to_string(),
            Self::Pokemons { page, page_size } => {
                format!("{}?page={page}&pageSize={page_size}", Route::Pokemons)
            },
            Self::Pokemon { name } => Route::Pokemon {
                name: name.clone().unwrap_or_else(|| "ditto".to_string()),
            }
            .to_string(),
            Self::Visit { path } => path.clone(),
            Self::Logout => Route::Logout {
                reason: None,
                from: None,
            }
            .to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(tokens_file) = cli.tokens_file.clone() {
        config.tokens_file = Some(tokens_file);
    }
    if let Some(log_level) = cli.log_level.clone() {
        config.log_level = log_level;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let navigator = MemoryNavigator::new(&cli.command.location());

    let outcome = run(cli.command, &config, &navigator).await;
    for location in navigator.redirects() {
        println!("Redirected to {location}");
    }
    outcome
}

async fn run(command: Command, config: &Config, navigator: &MemoryNavigator) -> Result<()> {
    let env = AppEnvironment::new(
        TimerWork::new(config.async_work),
        HttpPokemonApi::new(pokeapi_client(config)),
    );
    let store = app_store(env);
    let timeout = config.async_work.max(config.request_timeout) + GRACE;

    match command {
        Command::Counter {
            command: CounterCommand::Add { amount },
        } => {
            let amount = parse_increment_amount(&amount);
            store
                .send(AppAction::Counter(CounterAction::IncrementByAmount(amount)))
                .await?;
        },
        Command::Counter {
            command: CounterCommand::AddAsync,
        } => {
            println!("Working...");
            store
                .send_and_wait_for(AppAction::Counter(CounterAction::IncrementAsync), is_settled, timeout)
                .await?;
        },
        Command::Pokemons { page, page_size } => {
            let filters = Filters {
                page,
                page_size,
                ..Filters::default()
            };
            store
                .send_and_wait_for(
                    AppAction::Pokemon(PokemonAction::FetchPokemons(filters)),
                    is_settled,
                    timeout,
                )
                .await?;
        },
        Command::Pokemon { name } => {
            store
                .send_and_wait_for(
                    AppAction::Pokemon(PokemonAction::FetchSinglePokemon { name }),
                    is_settled,
                    timeout,
                )
                .await?;
        },
        Command::Visit { path } => {
            let route = Route::parse(&path);
            let Some(action) = route.on_enter() else {
                if let Route::NotFound(path) = route {
                    bail!("no route matches {path}");
                }
                print_state(&store).await;
                return Ok(());
            };
            tracing::info!(%route, action = action.name(), "Entering route");
            store.send(action).await?;
            store
                .wait_idle(timeout)
                .await
                .context("effects did not settle")?;
        },
        Command::Logout => {
            store.send(AppAction::Logout).await?;
        },
        Command::Get { path } => return get_from_backend(config, &path, navigator).await,
    }

    print_state(&store).await;
    store.shutdown(GRACE).await?;
    Ok(())
}

async fn get_from_backend(config: &Config, path: &str, navigator: &MemoryNavigator) -> Result<()> {
    let Some(tokens_file) = config.tokens_file.clone() else {
        bail!("backend requests need a tokens file (--tokens-file or POKEDEX_TOKENS_FILE)");
    };
    let tokens = FileTokenStore::new(tokens_file);
    log_token_state(&tokens, &SystemClock).await;

    let response = backend_client(config, tokens, navigator.clone()).get(path).await?;
    println!("{}", response.body);
    Ok(())
}

async fn log_token_state(tokens: &impl TokenStore, clock: &impl Clock) {
    match tokens.get_tokens().await {
        Ok(Some(stored)) => match is_token_expired(&stored.access_token, clock.now()) {
            Ok(true) => tracing::info!("Access token expired, it will be refreshed on the first 401"),
            Ok(false) => tracing::debug!("Access token valid"),
            Err(error) => tracing::warn!(%error, "Stored access token is not a JWT"),
        },
        Ok(None) => tracing::warn!("No stored tokens, requests are sent without credentials"),
        Err(error) => tracing::warn!(%error, "Token file unreadable"),
    }
}

/// Whether `action` ends an async flow
fn is_settled(action: &AppAction) -> bool {
    matches!(
        action,
        AppAction::Counter(CounterAction::IncrementAsyncSuccess | CounterAction::IncrementAsyncError(_))
            | AppAction::Pokemon(
                PokemonAction::FetchPokemonsSuccess(_)
                    | PokemonAction::FetchPokemonsError(_)
                    | PokemonAction::FetchSinglePokemonSuccess(_)
                    | PokemonAction::FetchSinglePokemonError(_)
            )
    )
}

async fn print_state<W, P>(store: &AppStore<W, P>)
where
    W: pokedex::features::counter::AsyncWork,
    P: pokedex::features::pokemon::PokemonApi,
{
    let (count, status, error) = store
        .state(|s| (select_count(s), s.counter.status, s.pokemon.error.clone()))
        .await;
    println!("Count: {count} ({status:?})");

    if let Some(pokemons) = store.state(|s| select_data(s).map(<[_]>::to_vec)).await {
        println!("Pokemons:");
        for pokemon in pokemons {
            println!("  {}", pokemon.name);
        }
    }

    if let Some(details) = store.state(|s| select_single_pokemon(s).cloned()).await {
        let types: Vec<&str> = details.types.iter().map(|t| t.kind.name.as_str()).collect();
        println!(
            "#{} {} height {} weight {} types [{}]",
            details.id,
            details.name,
            details.height,
            details.weight,
            types.join(", ")
        );
    }

    if let Some(error) = error {
        println!("Error {}: {}", error.status, error.message);
    }
}
