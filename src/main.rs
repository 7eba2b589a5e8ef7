use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use ontrack::cli::{self, Cli, Commands};
use ontrack::client::TaskClient;
use ontrack::models::NewTask;
use ontrack::{Config, Profile};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr for the server and one-shot commands
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the terminal, so its logs go to `ontrack.log` in the data directory.
/// The returned guard flushes the writer and must live until exit.
fn init_file_logging(profile: Profile) -> Result<WorkerGuard> {
    let log_dir = ontrack::utils::get_data_dir(profile)
        .ok_or_else(|| eyre!("Could not determine data directory"))?;
    std::fs::create_dir_all(&log_dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, "ontrack.log"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps config and database apart from the real ones
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path, profile)?,
        None => Config::load_with_profile(profile)?,
    };

    let command = cli.command.unwrap_or(Commands::Tui);
    if command == Commands::Tui {
        let _guard = init_file_logging(profile)?;
        tracing::info!(server = %config.server_url, "starting tui");
        let client = TaskClient::new(config.server_url.clone());
        let app = ontrack::tui::App::new(config, client);
        ontrack::tui::run_event_loop(app).await?;
        return Ok(());
    }

    init_stderr_logging();
    let client = TaskClient::new(config.server_url.clone());
    let mut stdout = std::io::stdout();

    match command {
        Commands::Serve { listen } => cli::handle_serve(&config, listen).await?,
        Commands::Add { description, category, date, time } => {
            let input = NewTask { description, category, date, time };
            cli::handle_add(&client, input, &mut stdout).await?;
        }
        Commands::List { category } => cli::handle_list(&client, category.as_deref(), &mut stdout).await?,
        Commands::Complete { id } => cli::handle_complete(&client, &id, &mut stdout).await?,
        Commands::Delete { id } => cli::handle_delete(&client, &id, &mut stdout).await?,
        Commands::Tui => {}
    }

    Ok(())
}
