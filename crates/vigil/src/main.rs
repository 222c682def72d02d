mod commands;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vigil_e::WebDriverBackend;
use vigil_e::backend::DEFAULT_WEBDRIVER_URL;
use vigil_engine::backend::Backend;
use vigil_engine::config::{ConfigLoader, VigilConfig};
use vigil_h::HeadlessBackend;

#[derive(Parser)]
#[command(name = "vigil", version, about = "Self-healing locator discovery for UI and API tests")]
struct Args {
    /// Configuration file (defaults to ./vigil.yaml, then ~/.vigil/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe a live surface and write the audit record and stub
    Discover {
        #[command(subcommand)]
        surface: Surface,
    },
    /// Re-emit the stub from a stored audit record, without probing
    Regenerate {
        #[arg(long)]
        record: PathBuf,
        /// Output directory (defaults to the configured one)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Resolve one logical element against a live page
    Resolve {
        #[arg(long)]
        name: String,
        /// Candidate selectors, in priority order
        #[arg(long = "candidate", required = true)]
        candidates: Vec<String>,
        /// Page to open (defaults to the UI base URL)
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Sign in through the login page and check the dashboard loads
    SmokeLogin {
        #[command(flatten)]
        backend: BackendArgs,
    },
}

#[derive(Subcommand)]
enum Surface {
    Ui {
        /// Catalog file (defaults to the built-in login page)
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        backend: BackendArgs,
    },
    Api {
        /// Catalog file (defaults to the built-in auth API)
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Sign in first and probe with the returned bearer token
        #[arg(long)]
        login: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendKind {
    /// Chromium over the DevTools protocol
    Headless,
    /// Any W3C WebDriver endpoint
    Webdriver,
}

#[derive(ClapArgs, Clone, Debug)]
struct BackendArgs {
    #[arg(long, value_enum, default_value_t = BackendKind::Headless)]
    backend: BackendKind,
    /// WebDriver URL for the webdriver backend
    #[arg(long, default_value = DEFAULT_WEBDRIVER_URL)]
    driver_url: String,
    /// Show the browser window
    #[arg(long)]
    visible: bool,
}

impl BackendArgs {
    fn build(&self) -> Box<dyn Backend> {
        match self.backend {
            BackendKind::Headless => Box::new(HeadlessBackend::new_with_visibility(self.visible)),
            BackendKind::Webdriver => {
                Box::new(WebDriverBackend::new(&self.driver_url, !self.visible))
            }
        }
    }
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<VigilConfig> {
    Ok(match path {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref()).await?;

    match args.command {
        Command::Discover { surface } => match surface {
            Surface::Ui {
                catalog,
                out,
                backend,
            } => {
                let mut backend = backend.build();
                commands::discover_ui(&config, &mut *backend, catalog.as_deref(), out.as_deref())
                    .await
            }
            Surface::Api {
                catalog,
                out,
                login,
            } => commands::discover_api(&config, catalog.as_deref(), out.as_deref(), login).await,
        },
        Command::Regenerate { record, out } => {
            commands::regenerate(&config, &record, out.as_deref())
        }
        Command::Resolve {
            name,
            candidates,
            url,
            backend,
        } => {
            let mut backend = backend.build();
            commands::resolve(&config, &mut *backend, &name, &candidates, url.as_deref()).await
        }
        Command::SmokeLogin { backend } => {
            let mut backend = backend.build();
            commands::smoke_login(&config, &mut *backend).await
        }
    }
}
