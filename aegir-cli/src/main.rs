//! Aegir CLI - Sui assistant in the terminal
//!
//! One-shot questions, an interactive session, and direct price and balance
//! lookups that skip the LLM.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use aegir::config;
use aegir::prelude::*;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Aegir - Sui assistant: balances, prices, gas estimates and SUI transfers
#[derive(Parser)]
#[command(name = "aegir")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "AEGIR_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask(AskArgs),

    /// Start an interactive session
    Chat(ChatArgs),

    /// Look up a token price without the LLM
    Price(PriceArgs),

    /// Look up a SUI balance without the LLM
    Balance(BalanceArgs),

    /// List the tools the assistant can use
    Tools,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the ask command
#[derive(Args)]
struct AskArgs {
    /// The question
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Connected wallet address, used for "my wallet" questions
    #[arg(short, long, env = "AEGIR_WALLET")]
    wallet: Option<String>,

    /// Print the full response as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the chat command
#[derive(Args)]
struct ChatArgs {
    /// Connected wallet address, used for "my wallet" questions
    #[arg(short, long, env = "AEGIR_WALLET")]
    wallet: Option<String>,

    /// Custom prompt prefix
    #[arg(short, long, default_value = "You: ")]
    prompt: String,
}

/// Arguments for the price command
#[derive(Args)]
struct PriceArgs {
    /// Token symbol, e.g. SUI or CETUS
    symbol: String,
}

/// Arguments for the balance command
#[derive(Args)]
struct BalanceArgs {
    /// Sui address (0x + 64 hex characters)
    address: String,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (secrets masked)
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "aegir={level},aegir_cli={level},{}",
            if verbosity >= 3 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Ask(args) => cmd_ask(args, &path).await,
        Commands::Chat(args) => cmd_chat(args, &path).await,
        Commands::Price(args) => cmd_price(args, &path).await,
        Commands::Balance(args) => cmd_balance(args, &path).await,
        Commands::Tools => {
            cmd_tools();
            Ok(())
        }
        Commands::Config(args) => cmd_config(args, &path).await,
    }
}

/// Load the file at `path` and apply environment overrides.
async fn load(path: &Path) -> Result<AegirConfig> {
    Ok(config::load_config_from(path).await?.with_env())
}

fn context(wallet: Option<String>) -> QueryContext {
    QueryContext {
        wallet_address: wallet,
    }
}

fn print_response(answer: &AgentResponse) {
    println!("{}", answer.response);
    if !answer.is_success() {
        for error in &answer.errors {
            println!("  error: {error}");
        }
    }
    if let Some(tx) = &answer.transaction {
        println!();
        println!("Unsigned transaction (sign it in your wallet):");
        match serde_json::to_string_pretty(tx) {
            Ok(json) => println!("{json}"),
            Err(e) => println!("  <unprintable: {e}>"),
        }
    }
}

/// Answer one question.
async fn cmd_ask(args: AskArgs, path: &Path) -> Result<()> {
    let agent = load(path).await?.build_agent()?;
    let query = args.query.join(" ");

    let answer = agent
        .process_query_with(&query, &context(args.wallet))
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        print_response(&answer);
    }
    Ok(())
}

/// Interactive session.
async fn cmd_chat(args: ChatArgs, path: &Path) -> Result<()> {
    let agent = load(path).await?.build_agent()?;
    let ctx = context(args.wallet);

    println!("Aegir | type 'exit' to quit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(args.prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        let answer = agent.process_query_with(query, &ctx).await;
        print_response(&answer);
        println!();
    }

    Ok(())
}

/// Price lookup without the LLM.
async fn cmd_price(args: PriceArgs, path: &Path) -> Result<()> {
    let prices = load(path).await?.build_prices()?;
    let quote = prices.get_price(&args.symbol).await?;
    println!("{} ({}): ${}", quote.symbol, quote.coin_id, quote.usd);
    Ok(())
}

/// Balance lookup without the LLM.
async fn cmd_balance(args: BalanceArgs, path: &Path) -> Result<()> {
    let chain = load(path).await?.build_chain()?;
    let owner: SuiAddress = args.address.parse()?;
    let mist = chain.get_balance(&owner).await?;
    println!("{owner}: {} SUI ({mist} MIST)", format_mist(mist));
    Ok(())
}

/// List the built-in tools.
fn cmd_tools() {
    let registry = ToolRegistry::builtin();
    println!("Tools:");
    for definition in registry.list() {
        println!("  {}", definition.signature());
    }
}

fn mask(secret: Option<&str>) -> &'static str {
    match secret {
        Some(s) if !s.trim().is_empty() => "set",
        _ => "-",
    }
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, path: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            let config = load(path).await?;
            println!("Configuration: {}", path.display());
            println!(
                "  Exists: {}",
                if path.exists() { "yes" } else { "no (defaults)" }
            );
            println!();
            println!("LLM:");
            println!("  Provider:    {:?}", config.llm.provider);
            println!("  API key:     {}", mask(config.llm.api_key.as_deref()));
            println!(
                "  Base URL:    {}",
                config.llm.base_url.as_deref().unwrap_or("(preset)")
            );
            println!(
                "  Model:       {}",
                config.llm.model.as_deref().unwrap_or("(preset)")
            );
            println!("  Timeout:     {}s", config.agent.llm_timeout_secs);
            println!();
            println!("Chain:");
            match config.chain.resolve_network() {
                Ok(network) => {
                    println!("  Network:     {} ({})", network.name(), network.rpc_url());
                }
                Err(e) => println!("  Network:     invalid ({e})"),
            }
            println!("  Gas budget:  {} MIST", config.chain.gas_budget);
            println!();
            println!("Price:");
            println!("  API key:     {}", mask(config.price.api_key.as_deref()));
            println!("  Cache TTL:   {}s", config.price.cache_ttl_secs);
            println!("  Extra:       {}", config.price.symbols.len());
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                println!("Configuration already exists at: {}", path.display());
                println!("Use --force to overwrite.");
                return Ok(());
            }
            config::init_config(path, force).await?;
            println!("Configuration created: {}", path.display());
            println!();
            println!("Next steps:");
            println!("  1. export ATOMA_API_KEY=<key>");
            println!("  2. aegir ask \"price of sui\"");
        }
        ConfigCommands::Validate => {
            let config = load(path).await?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
            }
            for issue in &issues {
                println!("{issue}");
            }
            if issues.iter().any(|i| i.level == IssueLevel::Error) {
                return Err(Error::agent("configuration has errors"));
            }
        }
    }

    Ok(())
}
