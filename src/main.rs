use clap::Parser;
use docrag::cli::Cli;
use docrag::cli::Commands;
use docrag::cli::{
    self,
};
use docrag::config::AppConfig;
use docrag::Result;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        cli::print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    if cli.verbose {
        docrag::logging::init_logging_with_level("debug")?;
    } else {
        docrag::logging::init_logging(&config)?;
    }
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Init { skip_indexes } => cli::handle_init_command(&config, skip_indexes).await,
        Commands::Serve { host, port, cors } => {
            cli::handle_serve_api(&config, host, port, cors).await
        }
        Commands::Ask {
            question,
            top_k,
            document,
        } => cli::handle_ask_command(&config, question, top_k, document).await,
        Commands::Upload { path } => cli::handle_upload_command(&config, &path).await,
        Commands::List => cli::handle_list_command(&config).await,
        Commands::Delete { id } => cli::handle_delete_command(&config, id).await,
        Commands::Config => cli::handle_config_command(&config),
    }
}
