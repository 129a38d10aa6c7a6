use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, bail};
use provider_onboarding::application::StepOutcome;
use provider_onboarding::application::dashboard::DashboardView;
use provider_onboarding::application::reauth::ReauthEntry;
use provider_onboarding::application::router::{Router, Screen};
use provider_onboarding::config::{
    DEFAULT_API_BASE_URL, DEFAULT_APP_BASE_URL, DEFAULT_IDENTITY_KEY, OnboardingConfig,
};
use provider_onboarding::domain::identity::AccountId;
use provider_onboarding::domain::ports::IdentityStoreRef;
use provider_onboarding::domain::route::InboundUrl;
use provider_onboarding::infrastructure::console::ConsoleNavigator;
use provider_onboarding::infrastructure::file::FileIdentityStore;
use provider_onboarding::infrastructure::http::HttpPaymentService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the backend fronting the payment platform
    #[arg(long, env = "ONBOARDING_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Base URL this application is served from
    #[arg(long, env = "ONBOARDING_APP_BASE_URL", default_value = DEFAULT_APP_BASE_URL)]
    app_base_url: String,

    /// Key under which the last known account id is stored
    #[arg(long, env = "ONBOARDING_IDENTITY_KEY", default_value = DEFAULT_IDENTITY_KEY)]
    identity_key: String,

    /// Delay before the dashboard sends an unknown provider back to registration
    #[arg(long, env = "ONBOARDING_REDIRECT_GRACE_MS", default_value_t = 2000)]
    redirect_grace_ms: u64,

    /// JSON file holding the persisted account id
    #[arg(long, env = "ONBOARDING_STORE_FILE", default_value = "provider-identity.json")]
    store_file: PathBuf,

    /// Path to a RocksDB database (optional). Used instead of the JSON file
    /// when the `storage-rocksdb` feature is enabled.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a connected account and continue to hosted onboarding
    Register {
        #[arg(long)]
        email: String,
    },
    /// Show the status of the current provider account
    Dashboard {
        #[arg(long, value_parser = parse_account_id)]
        account_id: Option<AccountId>,
    },
    /// Get a fresh onboarding link after the previous one expired
    Reauth {
        #[arg(long, value_parser = parse_account_id)]
        account_id: Option<AccountId>,
        /// Abandon this account and go back to registration
        #[arg(long)]
        start_over: bool,
    },
    /// Follow a URL the platform sent the browser back to
    Open { url: String },
}

fn parse_account_id(raw: &str) -> std::result::Result<AccountId, String> {
    AccountId::new(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = OnboardingConfig::new(
        &cli.api_base_url,
        &cli.app_base_url,
        cli.identity_key.clone(),
        Duration::from_millis(cli.redirect_grace_ms),
    )
    .into_diagnostic()?;

    let store = open_store(&cli)?;
    let service = Arc::new(HttpPaymentService::new(config.api_base_url.clone()).into_diagnostic()?);
    let navigator = Arc::new(ConsoleNavigator::stdout(config.app_base_url.clone()));
    let router = Router::new(service, store, navigator, config);

    match cli.command {
        Command::Register { email } => register(&router, &email).await,
        Command::Dashboard { account_id } => {
            show_dashboard(router.dashboard().load(account_id).await).await
        }
        Command::Reauth {
            account_id,
            start_over,
        } => reauthorize(router.reauth(account_id), start_over).await,
        Command::Open { url } => {
            let inbound = InboundUrl::parse(&url, &router.config().app_base_url).into_diagnostic()?;
            match router.dispatch(inbound).await {
                Screen::Registration(_) => {
                    println!("Registration: run `register --email <EMAIL>` to create an account.");
                    Ok(())
                }
                Screen::Dashboard(view) => show_dashboard(view).await,
                Screen::Reauth(entry) => reauthorize(entry, false).await,
            }
        }
    }
}

fn open_store(cli: &Cli) -> Result<IdentityStoreRef> {
    if let Some(db_path) = &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            use provider_onboarding::infrastructure::rocksdb::RocksDBIdentityStore;
            let store = RocksDBIdentityStore::open(db_path).into_diagnostic()?;
            return Ok(Arc::new(store));
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            let _ = db_path;
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to file storage."
            );
        }
    }

    let store = FileIdentityStore::open(&cli.store_file).into_diagnostic()?;
    Ok(Arc::new(store))
}

async fn register(router: &Router, email: &str) -> Result<()> {
    let workflow = router.registration();

    match workflow.submit_email(email).await {
        StepOutcome::Advanced(_) => {
            if let Some(account_id) = workflow.view().await.account_id {
                println!("Account created: {}", account_id);
            }
        }
        StepOutcome::Invalid(message) | StepOutcome::Failed(message) => bail!(message),
        other => bail!("registration did not start: {:?}", other),
    }

    match workflow.request_onboarding_link().await {
        StepOutcome::Redirected(_) => Ok(()),
        StepOutcome::Failed(message) => bail!(message),
        other => bail!("onboarding link was not issued: {:?}", other),
    }
}

async fn show_dashboard(view: DashboardView) -> Result<()> {
    match view {
        DashboardView::NoAccount { notice, redirect } => {
            println!("{}", notice);
            redirect.wait().await.into_diagnostic()
        }
        DashboardView::Loaded { summary, .. } => {
            println!("{}", summary);
            Ok(())
        }
        DashboardView::Unavailable {
            account_id, error, ..
        } => {
            println!("Account ID: {}", account_id);
            println!("{}", error);
            Ok(())
        }
    }
}

async fn reauthorize(entry: ReauthEntry, start_over: bool) -> Result<()> {
    if start_over {
        return match entry.start_over() {
            StepOutcome::Failed(message) => bail!(message),
            _ => Ok(()),
        };
    }

    match entry {
        ReauthEntry::Ready(workflow) => match workflow.reauthorize().await {
            StepOutcome::Redirected(_) => Ok(()),
            StepOutcome::Failed(message) => bail!(message),
            other => bail!("reauthorization did not complete: {:?}", other),
        },
        ReauthEntry::MissingAccount(missing) => {
            bail!("{} Run again with --start-over.", missing.message())
        }
    }
}
