use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sql_bridge::config::BridgeConfig;
use sql_bridge::db::{self, DdlAction, QueryOutcome};
use sql_bridge::llm::{self, OllamaClient};
use sql_bridge::logging;
use sql_bridge::prompt::{self, SqlGenerator, ERROR_PREFIX};
use sql_bridge::schema;
use sql_bridge::web::{self, AppState};

#[derive(Parser)]
#[command(name = "sql-bridge")]
#[command(about = "Ask questions of a live PostgreSQL database through a local LLM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ollama server URL (overrides config)
    #[arg(long, env = "OLLAMA_URL", global = true)]
    ollama_url: Option<String>,

    /// Model to use (overrides config)
    #[arg(long, env = "OLLAMA_MODEL", global = true)]
    model: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long, short)]
        port: Option<u16>,
        /// Create the sample `users` table before serving
        #[arg(long)]
        seed: bool,
    },
    /// Print the live schema as JSON
    Schema {
        /// Print the DDL context given to the model instead
        #[arg(long)]
        ddl: bool,
    },
    /// Turn a question into SQL
    Ask {
        /// The question to ask
        question: String,
        /// Execute the generated SQL and print the result
        #[arg(long, short)]
        execute: bool,
    },
    /// Execute raw SQL and print the result as JSON
    Exec {
        /// SQL to execute
        sql: String,
    },
    /// Apply a schema edit given as JSON, e.g. '{"action":"create_table","table_name":"notes"}'
    Ddl {
        /// Action as JSON
        action: String,
    },
    /// Create the sample `users` table if it does not exist
    Seed,
    /// List models available on the Ollama server
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing("sql_bridge", logging::level_for_verbosity(cli.verbose))?;

    let mut config = BridgeConfig::load()?;
    if let Some(url) = cli.ollama_url {
        config.llm.url = url;
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    match cli.command {
        Commands::Serve { port, seed } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if seed {
                db::seed_sample(&config.database)
                    .await
                    .context("Failed to create sample table")?;
            }
            web::serve(AppState::new(config)?).await?;
        }
        Commands::Schema { ddl } => {
            let schema = schema::current_schema(&config.database).await;
            if ddl {
                println!("{}", prompt::render_ddl(&schema));
            } else {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
        }
        Commands::Ask { question, execute } => {
            run_ask(&config, &question, execute).await?;
        }
        Commands::Exec { sql } => {
            print_outcome(&db::execute_query(&config.database, &sql).await)?;
        }
        Commands::Ddl { action } => {
            let action: DdlAction =
                serde_json::from_str(&action).context("Failed to parse DDL action JSON")?;
            db::apply_ddl(&config.database, &action).await?;
            println!("{}", action.describe());
        }
        Commands::Seed => {
            db::seed_sample(&config.database).await?;
            println!("Sample table ready.");
        }
        Commands::Models => {
            let models = llm::list_models(&config.llm.url).await?;
            if models.is_empty() {
                println!("No models found.");
            }
            for model in models {
                println!("{:<40} {:>8.1} GB", model.name, model.size as f64 / 1e9);
            }
        }
    }

    Ok(())
}

async fn run_ask(config: &BridgeConfig, question: &str, execute: bool) -> Result<()> {
    let generator = SqlGenerator::new(Arc::new(OllamaClient::new(&config.llm)?));

    let schema = schema::current_schema(&config.database).await;
    let sql = generator.generate_sql(&schema, question).await;
    println!("{}", sql);

    if execute && !sql.starts_with(ERROR_PREFIX) {
        println!();
        print_outcome(&db::execute_query(&config.database, &sql).await)?;
    }

    Ok(())
}

fn print_outcome(outcome: &QueryOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    if outcome.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
