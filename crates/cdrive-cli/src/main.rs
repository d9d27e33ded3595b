//! CDrive CLI: command-line client for the CDrive file API.
//!
//! Set CDRIVE_API_URL (or API_URL). The session token is kept in a small JSON
//! file in the platform data directory unless --session-file is given.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use cdrive_api_client::ApiClient;
use cdrive_app::{
    Dashboard, DeleteStatus, LoginFlow, Notifier, RegisterFlow, RenameDraft, SystemClipboard,
    ViewMode,
};
use cdrive_cli::{already_reported, init_tracing, render_files, ConsoleNotifier, Reported};
use cdrive_core::{ClientConfig, ClientError, FileSessionStore, SessionStore, UploadCandidate};
use clap::{Parser, Subcommand, ValueEnum};

const NOT_LOGGED_IN: &str = "Not logged in. Run `cdrive login` first.";

#[derive(Parser)]
#[command(name = "cdrive", about = "CDrive command-line client")]
struct Cli {
    /// Session file (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account, then enter the emailed passcode
    Register {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Submit the passcode for an account registered earlier
    Verify { email: String, code: String },
    /// Forget the stored session token
    Logout,
    /// List files
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = ViewArg::List)]
        view: ViewArg,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Upload a local file (10MB max)
    Upload {
        file: PathBuf,
        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename a file
    Rename { id: String, name: String },
    /// Delete a file
    Delete { id: String },
    /// Copy a file's link to the clipboard
    Share { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Grid,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Grid => ViewMode::Grid,
            ViewArg::List => ViewMode::List,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn open_session(path: Option<PathBuf>) -> anyhow::Result<Arc<dyn SessionStore>> {
    let path = match path {
        Some(path) => path,
        None => FileSessionStore::default_path()
            .context("No data directory available. Pass --session-file")?,
    };
    tracing::debug!(path = %path.display(), "Using session file");
    Ok(Arc::new(FileSessionStore::open(path)))
}

fn read_line(prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush().context("Flush stdout")?;
    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Read stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => read_line("Password: ")?.context("No password given"),
    }
}

fn open_dashboard(
    session: Arc<dyn SessionStore>,
    client: Arc<ApiClient>,
) -> anyhow::Result<Dashboard<ApiClient>> {
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    Dashboard::enter(session, client, notifier).map_err(|_| anyhow::anyhow!(NOT_LOGGED_IN))
}

async fn find_file(
    dashboard: &Dashboard<ApiClient>,
    id: &str,
) -> anyhow::Result<cdrive_core::FileResource> {
    dashboard.refresh().await?;
    dashboard
        .collection()
        .get(id)
        .ok_or_else(|| ClientError::NotFound("File not found".to_string()).into())
}

async fn register(
    client: Arc<ApiClient>,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let mut flow = RegisterFlow::new(client);
    let outcome = flow.submit_credentials(email, password).await?;
    println!("{}", outcome.message);

    // Keep asking until the code is accepted or stdin closes.
    while let Some(code) = read_line("Passcode: ")? {
        match flow.submit_passcode(&code).await {
            Ok(outcome) => {
                println!("{}", outcome.message);
                return Ok(());
            }
            Err(e) => eprintln!("{}", e),
        }
    }
    anyhow::bail!("No passcode entered. Run `cdrive verify {} <code>` later.", email)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        // ConsoleNotifier already printed it.
        Err(e) if already_reported(&e) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let session = open_session(cli.session_file)?;
    let client = Arc::new(
        ApiClient::new(&ClientConfig::from_env(), session.clone())
            .context("Failed to create API client. Set CDRIVE_API_URL (or API_URL)")?,
    );

    match cli.command {
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let outcome = LoginFlow::new(client, session)
                .submit(&email, &password)
                .await?;
            println!("{}", outcome.message);
        }
        Commands::Register { email, password } => {
            let password = password_or_prompt(password)?;
            register(client, &email, &password).await?;
        }
        Commands::Verify { email, code } => {
            let outcome = RegisterFlow::awaiting_passcode(client, email)
                .submit_passcode(&code)
                .await?;
            println!("{}", outcome.message);
        }
        Commands::Logout => match open_dashboard(session, client) {
            Ok(dashboard) => {
                dashboard.logout();
                println!("Logged out.");
            }
            Err(_) => println!("Already logged out."),
        },
        Commands::List {
            search,
            view,
            format,
        } => {
            let mut dashboard = open_dashboard(session, client)?;
            dashboard.refresh().await?;
            if let Some(term) = search {
                dashboard.set_search_term(term);
            }
            let files = dashboard.visible_files();
            match format {
                OutputFormat::Json => {
                    let out = serde_json::to_string_pretty(&files).context("Serialize files")?;
                    println!("{}", out);
                }
                OutputFormat::Table => print!("{}", render_files(&files, view.into())),
            }
        }
        Commands::Upload { file, name } => {
            let dashboard = open_dashboard(session, client)?;
            let candidate = UploadCandidate::from_path(Path::new(&file), name.as_deref())?;
            let created = dashboard
                .uploader()
                .upload(candidate)
                .await
                .map_err(|_| Reported)?;
            println!("{}", created.id);
        }
        Commands::Rename { id, name } => {
            let dashboard = open_dashboard(session, client)?;
            let current = find_file(&dashboard, &id).await?;
            let mut draft = RenameDraft::new(&current);
            draft.begin();
            draft.set_draft(name);
            dashboard
                .renamer()
                .rename(&mut draft)
                .await
                .map_err(|_| Reported)?;
        }
        Commands::Delete { id } => {
            let dashboard = open_dashboard(session, client)?;
            let status = dashboard
                .deleter()
                .delete(&id)
                .await
                .map_err(|_| Reported)?;
            if let DeleteStatus::AlreadyInFlight = status {
                println!("Deletion of {} already in progress.", id);
            }
        }
        Commands::Share { id } => {
            let dashboard = open_dashboard(session, client)?;
            let file = find_file(&dashboard, &id).await?;
            println!("{}", file.url);
            dashboard
                .sharer(Arc::new(SystemClipboard))
                .share(&file)
                .map_err(|_| Reported)?;
        }
    }

    Ok(())
}
