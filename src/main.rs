use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use grievance::commands;
use grievance::commands::init::{DB_FILE, DESK_DIR};
use grievance::commands::list::ListOptions;
use grievance::config::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use grievance::filter::Choice;
use grievance::models::{Priority, Status};
use grievance::session::Session;
use grievance::store::Database;
use grievance::{Config, Desk, HttpApi};

#[derive(Parser)]
#[command(name = "grievance")]
#[command(about = "Officer desk for the grievance tracking service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ApiArgs {
    /// Base URL of the grievance API
    #[arg(long, global = true, env = "GRIEVANCE_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(
        long,
        global = true,
        env = "GRIEVANCE_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Retries for failed reads (mutations are never retried)
    #[arg(long, global = true, env = "GRIEVANCE_RETRIES", default_value_t = 2)]
    retries: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a desk in the current directory
    Init,

    /// Store an API token and user profile
    Login {
        /// Bearer token
        #[arg(long)]
        token: String,
        /// User profile JSON, e.g. {"role":"officer","name":"..."}
        #[arg(long)]
        user: Option<String>,
    },

    /// Forget the stored token and profile
    Logout,

    /// Show the current session
    Whoami,

    /// List complaints
    List {
        /// Search title, ID and citizen name
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by status (pending, in progress, resolved, closed, all)
        #[arg(long, default_value = "all")]
        status: Choice<Status>,
        /// Filter by priority (low, medium, high, all)
        #[arg(short, long, default_value = "all")]
        priority: Choice<Priority>,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Complaints per page
        #[arg(long, env = "GRIEVANCE_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Show complaint details
    Show {
        /// Complaint ID
        id: String,
    },

    /// List officers available for assignment
    Officers,

    /// Assign an officer to a complaint
    Assign {
        /// Complaint ID
        id: String,
        /// Officer ID
        officer: String,
    },

    /// Remove the assigned officer from a complaint
    Unassign {
        /// Complaint ID
        id: String,
    },

    /// Stage a status change
    Status {
        /// Complaint ID
        id: String,
        /// New status
        status: Status,
        /// Final message (recorded when resolving)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Stage a progress note
    Note {
        /// Complaint ID
        id: String,
        /// Note text
        text: String,
    },

    /// Stage closing a complaint
    Close {
        /// Complaint ID
        id: String,
        /// Closure feedback
        #[arg(short, long)]
        feedback: Option<String>,
    },

    /// Show the staged draft for a complaint
    Draft {
        /// Complaint ID
        id: String,
    },

    /// List complaints with staged drafts
    Drafts,

    /// Send a staged draft to the server
    Commit {
        /// Complaint ID
        id: String,
    },

    /// Throw away a staged draft
    Discard {
        /// Complaint ID
        id: String,
    },
}

fn find_desk_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(DESK_DIR);
        if candidate.exists() && candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a grievance desk (or any parent). Run 'grievance init' first.");
        }
    }
}

fn get_db() -> Result<Database> {
    let desk_dir = find_desk_dir()?;
    let db_path = desk_dir.join(DB_FILE);
    Database::open(&db_path).context("Failed to open database")
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grievance=warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Build a desk for one command. Requests are cancelled on Ctrl-C.
fn open_desk(args: &ApiArgs, session: Session, page_size: usize, shutdown: &CancellationToken) -> Result<Desk<HttpApi>> {
    let config = Config::new(&args.api_url)
        .with_timeout(args.timeout)
        .with_read_retries(args.retries)
        .with_page_size(page_size);
    let api = HttpApi::new(&config, &session).context("Failed to build HTTP client")?;
    Ok(Desk::new(api, session, config.page_size).with_parent(shutdown))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling requests");
                shutdown.cancel();
            }
        });
    }

    let color = std::io::stdout().is_terminal();

    match cli.command {
        Commands::Init => {
            let cwd = env::current_dir()?;
            commands::init::run(&cwd)
        }

        Commands::Login { token, user } => {
            let db = get_db()?;
            commands::session::login(&db, &token, user.as_deref())
        }

        Commands::Logout => {
            let db = get_db()?;
            commands::session::logout(&db)
        }

        Commands::Whoami => {
            let db = get_db()?;
            commands::session::whoami(&db)
        }

        Commands::List {
            search,
            status,
            priority,
            page,
            page_size,
        } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, page_size, &shutdown)?;
            let options = ListOptions {
                search,
                status,
                priority,
                page,
            };
            commands::list::run(&desk, &options, color).await
        }

        Commands::Show { id } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::show::run(&desk, &db, &id, color).await
        }

        Commands::Officers => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::assign::officers(&desk).await
        }

        Commands::Assign { id, officer } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::assign::assign(&desk, &id, &officer).await
        }

        Commands::Unassign { id } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::assign::unassign(&desk, &id).await
        }

        Commands::Status {
            id,
            status,
            message,
        } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::detail::status(&desk, &db, &id, status, message.as_deref()).await
        }

        Commands::Note { id, text } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::detail::note(&desk, &db, &id, &text).await
        }

        Commands::Close { id, feedback } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::detail::close(&desk, &db, &id, feedback.as_deref()).await
        }

        Commands::Draft { id } => {
            let db = get_db()?;
            commands::detail::show_draft(&db, &id)
        }

        Commands::Drafts => {
            let db = get_db()?;
            commands::detail::list_drafts(&db)
        }

        Commands::Commit { id } => {
            let db = get_db()?;
            let desk = open_desk(&cli.api, Session::load(&db)?, DEFAULT_PAGE_SIZE, &shutdown)?;
            commands::detail::commit(&desk, &db, &id).await
        }

        Commands::Discard { id } => {
            let db = get_db()?;
            commands::detail::discard(&db, &id)
        }
    }
}
