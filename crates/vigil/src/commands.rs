use anyhow::{Context, anyhow, bail};
use std::path::Path;
use tracing::{info, warn};
use vigil_common::{CandidateList, DiscoveryRecord, HttpMethod};
use vigil_engine::api::{ApiClient, Endpoint};
use vigil_engine::backend::Backend;
use vigil_engine::catalog::{Catalog, CatalogLoader};
use vigil_engine::config::VigilConfig;
use vigil_engine::discovery::Prober;
use vigil_engine::emit::ArtifactEmitter;
use vigil_engine::page::{DashboardPage, LoginPage, PageSession};
use vigil_engine::resolution::{ElementProbe, Resolver};
use vigil_engine::tracker::FailureReporter;
use vigil_engine::transport::ReqwestTransport;

const SMOKE_TEST_NAME: &str = "smoke login";

async fn load_catalog(path: Option<&Path>, builtin: fn() -> Catalog) -> anyhow::Result<Catalog> {
    match path {
        Some(path) => CatalogLoader::load_from(path)
            .await
            .with_context(|| format!("loading catalog {}", path.display())),
        None => Ok(builtin()),
    }
}

fn write_artifacts(
    config: &VigilConfig,
    record: &DiscoveryRecord,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let out_dir = out.unwrap_or(config.discovery.output_dir.as_path());
    let emitter = ArtifactEmitter::new();
    let written = emitter.write(&emitter.emit(record)?, out_dir)?;
    println!("{}", written.audit_path.display());
    println!("{}", written.stub_path.display());

    let unmatched = record.unmatched();
    if !unmatched.is_empty() {
        println!("unmatched: {}", unmatched.join(", "));
    }
    Ok(())
}

async fn close_quietly(backend: &mut dyn Backend) {
    if let Err(e) = backend.close().await {
        warn!("Failed to close backend: {}", e);
    }
}

pub async fn discover_ui(
    config: &VigilConfig,
    backend: &mut dyn Backend,
    catalog: Option<&Path>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog, Catalog::login_page).await?;
    backend.launch().await.context("launching backend")?;

    let result = Prober::from_config(config)
        .discover_ui(&mut *backend, &config.target.ui_base_url, &catalog)
        .await;
    close_quietly(backend).await;

    write_artifacts(config, &result?, out)
}

pub async fn discover_api(
    config: &VigilConfig,
    catalog: Option<&Path>,
    out: Option<&Path>,
    login: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog, Catalog::auth_api).await?;
    let transport = ReqwestTransport::new(config.resolver.request_timeout())?;
    let mut client = ApiClient::new(transport, &config.target.api_base_url)
        .with_policy(config.auth_policy.clone())
        .with_resolver(Resolver::new(config.resolver.request_timeout()));

    if login {
        let list = CandidateList::new("login", ["/auth/login", "/login", "/api/login"])?;
        let endpoint = match client.resolve_endpoint(&list, HttpMethod::Post).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!("{}; using /auth/login", e);
                Endpoint::discovered("login", HttpMethod::Post, &["/auth/login"], false)
            }
        };
        client
            .login(&config.credentials.email, &config.credentials.password, &endpoint)
            .await
            .context("signing in before discovery")?;
    }

    let record = Prober::from_config(config)
        .discover_api(
            client.transport(),
            &config.target.api_base_url,
            &catalog,
            client.token(),
        )
        .await?;
    write_artifacts(config, &record, out)
}

pub fn regenerate(config: &VigilConfig, record: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let out_dir = out.unwrap_or(config.discovery.output_dir.as_path());
    let written = ArtifactEmitter::new()
        .regenerate(record, out_dir)
        .with_context(|| format!("regenerating from {}", record.display()))?;
    println!("{}", written.stub_path.display());
    Ok(())
}

pub async fn resolve(
    config: &VigilConfig,
    backend: &mut dyn Backend,
    name: &str,
    candidates: &[String],
    url: Option<&str>,
) -> anyhow::Result<()> {
    let list = CandidateList::new(name, candidates)?;
    let resolver = Resolver::new(config.resolver.candidate_timeout());
    backend.launch().await.context("launching backend")?;

    let url = url.unwrap_or(&config.target.ui_base_url);
    let result = match backend.navigate(url).await {
        Ok(_) => {
            let mut probe = ElementProbe::visible(&mut *backend, resolver.candidate_timeout());
            resolver.resolve(&list, &mut probe).await.map_err(anyhow::Error::from)
        }
        Err(e) => Err(anyhow!(e).context(format!("opening {}", url))),
    };
    close_quietly(backend).await;

    let target = result?;
    println!("{}", target.matched_candidate);
    if let Some(meta) = target.element() {
        info!("<{}> visible={} text={:?}", meta.tag, meta.visible, meta.text);
    }
    Ok(())
}

async fn run_smoke_login(config: &VigilConfig, backend: &mut dyn Backend) -> anyhow::Result<()> {
    let record_path = config.discovery.output_dir.join("login.discovery.json");
    let login = if record_path.exists() {
        info!("Using discovered locators from {}", record_path.display());
        let record = ArtifactEmitter::new().load_record(&record_path)?;
        LoginPage::from_record(&record, "/login")?
    } else {
        LoginPage::new()?
    };
    let dashboard = DashboardPage::new()?;

    let mut session = PageSession::new(
        backend,
        &config.target.ui_base_url,
        Resolver::new(config.resolver.candidate_timeout()),
    );
    login.open(&mut session).await?;
    login
        .login(
            &mut session,
            &config.credentials.email,
            &config.credentials.password,
        )
        .await?;

    if !dashboard.is_loaded(&mut session).await? {
        if let Some(message) = login.error_message(&mut session).await? {
            bail!("login rejected: {}", message);
        }
        bail!("dashboard did not load after sign-in");
    }
    println!("{}", dashboard.welcome_text(&mut session).await?);
    Ok(())
}

/// Tracker setup problems must not hide the failure being reported.
fn failure_reporter(config: &VigilConfig) -> FailureReporter {
    match FailureReporter::from_config(&config.issue_tracker, config.resolver.request_timeout()) {
        Ok(reporter) => reporter,
        Err(e) => {
            warn!("Issue tracker unavailable, not filing: {}", e);
            FailureReporter::disabled()
        }
    }
}

pub async fn smoke_login(config: &VigilConfig, backend: &mut dyn Backend) -> anyhow::Result<()> {
    backend.launch().await.context("launching backend")?;
    let outcome = run_smoke_login(config, &mut *backend).await;

    if let Err(e) = &outcome {
        let reporter = failure_reporter(config);
        if let Some(ticket) = reporter
            .report(Some(&mut *backend), SMOKE_TEST_NAME, e, Some(format!("{:?}", e)))
            .await
        {
            println!("filed {}", ticket);
        }
    }
    close_quietly(backend).await;
    outcome
}
