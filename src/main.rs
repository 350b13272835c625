//! presence-picker — user picker and presence chart viewer.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::process;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, PickArgs, ShowArgs};
use presence_picker::config::Config;
use presence_picker::constants;
use presence_picker::env::Env;
use presence_picker::models::UserDirectory;
use presence_picker::render::PresenceChartRenderer;
use presence_picker::selector::{LoadOutcome, SelectionOutcome, UserSelector};
use presence_picker::source::{HttpUserSource, UserSource};
use presence_picker::view::{SharedSurface, TerminalSurface};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Version = cli.command {
        return run_version();
    }

    let cwd = std::env::current_dir().ok();
    let mut config = Config::load(cwd.as_deref(), cli.config.as_deref(), &Env::real())
        .context("failed to load configuration")?;
    cli.apply_to(&mut config);

    match cli.command {
        Command::Users => run_users(&config).await,
        Command::Show(args) => run_show(&config, args).await,
        Command::Pick(args) => run_pick(&config, args).await,
        Command::Version => run_version(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("presence_picker=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print version information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!("{} {}", constants::APP_NAME.bold(), constants::VERSION.green().bold());
    Ok(())
}

/// List the users the endpoint serves.
async fn run_users(config: &Config) -> Result<()> {
    let source = HttpUserSource::new(&config.source.users_endpoint, config.timeout())?;
    let body = source.fetch_users().await.context("failed to load users")?;
    let (directory, avatars) =
        UserDirectory::from_json(&body, &config.source.id_field, source.base_url())
            .context("failed to load users")?;
    print!("{}", cli::format_users(&directory, &avatars));
    Ok(())
}

/// Everything a selector session needs, wired to the terminal.
struct Session {
    selector: UserSelector,
    renderer: PresenceChartRenderer,
    source: HttpUserSource,
}

fn build_session(config: &Config) -> Result<Session> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .context("failed to build HTTP client")?;
    let endpoint = reqwest::Url::parse(&config.source.users_endpoint)
        .with_context(|| format!("invalid users endpoint `{}`", config.source.users_endpoint))?;
    let source = HttpUserSource::with_client(client.clone(), endpoint);

    let api_base = config.api_base()?;
    let renderer =
        PresenceChartRenderer::new(client, &api_base, config.chart.kind, config.chart_settings())?;

    let surface: SharedSurface = Arc::new(Mutex::new(TerminalSurface::stdout()));
    let selector = UserSelector::new(
        surface,
        Arc::new(renderer.clone()),
        config.selector_settings(),
    );
    Ok(Session {
        selector,
        renderer,
        source,
    })
}

async fn load(session: &mut Session) -> Result<()> {
    match session.selector.load(&session.source).await {
        LoadOutcome::Populated { .. } => Ok(()),
        LoadOutcome::Failed(e) => Err(e).context("failed to load users"),
        LoadOutcome::Superseded => bail!("users listing was superseded"),
    }
}

/// Select one user and wait for their chart.
async fn run_show(config: &Config, args: ShowArgs) -> Result<()> {
    let mut session = build_session(config)?;
    load(&mut session).await?;

    match session.selector.select(&args.user) {
        SelectionOutcome::Rendered(id) => session
            .renderer
            .wait_idle()
            .await
            .with_context(|| format!("failed to draw chart for user `{id}`")),
        SelectionOutcome::Cleared => {
            eprintln!("No user selected.");
            Ok(())
        }
        SelectionOutcome::Rejected(id) => bail!("unknown user `{id}`"),
        SelectionOutcome::Ignored => bail!("users listing is not loaded"),
    }
}

/// Read selections from stdin until `q` or EOF.
async fn run_pick(config: &Config, _args: PickArgs) -> Result<()> {
    let mut session = build_session(config)?;
    load(&mut session).await?;

    let sentinel = session.selector.settings().sentinel.clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();

    loop {
        let prompt = format!("select user (`{sentinel}` to clear, q to quit): ");
        stderr.write_all(prompt.as_bytes()).await?;
        stderr.flush().await?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let value = line.trim();
        if matches!(value, "q" | "quit") {
            break;
        }
        // Charts arrive in the background; a newer pick makes older ones inert.
        session.selector.select(value);
    }

    // Failed charts were already drawn in place; a session is not an error.
    if let Err(e) = session.renderer.wait_idle().await {
        tracing::debug!(error = %e, "pick session ended with a failed chart");
    }
    Ok(())
}
