//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use movierama_core::api::{ApiContext, AuthClient, MovieClient};
use movierama_core::config::Config;
use movierama_core::model::{MovieId, SortKey, UserId, VoteAction};
use movierama_core::session::{FileSessionStore, SessionState};

mod commands;
mod logging;
mod render;

#[derive(Parser)]
#[command(name = "movierama")]
#[command(version)]
#[command(about = "Browse, rate and submit movies on a MovieRama server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API root URL (overrides MOVIERAMA_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List movies, site-wide or for one user
    Movies {
        /// Sort key (date, likes, hates)
        #[arg(short, long, value_name = "KEY")]
        sort: Option<String>,

        /// Only show movies submitted by this user
        #[arg(short, long, value_name = "USER_ID")]
        user: Option<UserId>,
    },

    /// Submit a new movie (requires login)
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,
    },

    /// Like or hate a movie, or take the vote back
    Vote {
        #[arg(value_name = "MOVIE_ID")]
        movie_id: MovieId,

        #[arg(value_name = "ACTION", value_parser = parse_vote_action)]
        action: VoteAction,

        /// Remove the vote instead of casting it
        #[arg(long)]
        remove: bool,

        /// Look the movie up in this user's listing
        #[arg(long, value_name = "USER_ID")]
        user: Option<UserId>,
    },

    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Interactive listing (sort, vote, switch feeds)
    Browse {
        /// Start on this user's movies
        #[arg(long, value_name = "USER_ID")]
        user: Option<UserId>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Store the API root URL in the config file
    SetApiUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

fn parse_vote_action(value: &str) -> Result<VoteAction, String> {
    value.parse()
}

/// Everything a command needs to reach the API.
pub struct App {
    pub config: Config,
    pub session: SessionState,
    pub movies: MovieClient,
    pub auth: AuthClient,
}

impl App {
    fn build(config: Config, api_url: Option<&str>) -> Result<Self> {
        let session = open_session(&config)?;
        let ctx = ApiContext::from_config(&config, api_url, session.clone())
            .context("configure API client")?;
        tracing::debug!(api = %ctx.endpoints().root(), signed_in = session.is_signed_in(), "client ready");

        Ok(Self {
            config,
            session,
            movies: MovieClient::new(ctx.clone()),
            auth: AuthClient::new(ctx),
        })
    }

    pub fn default_sort(&self) -> SortKey {
        self.config.default_sort()
    }
}

fn open_session(config: &Config) -> Result<SessionState> {
    if config.session.persist {
        let store = FileSessionStore::open_default().context("open session store")?;
        Ok(SessionState::new(store))
    } else {
        Ok(SessionState::in_memory())
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, api_url } = cli;
    let app = || -> Result<App> {
        let config = Config::load().context("load config")?;
        App::build(config, api_url.as_deref())
    };

    match command {
        Commands::Movies { sort, user } => {
            commands::movies::list(&app()?, sort.as_deref(), user).await
        }
        Commands::Add { title, description } => {
            commands::movies::add(&app()?, &title, &description).await
        }
        Commands::Vote {
            movie_id,
            action,
            remove,
            user,
        } => commands::movies::vote(&app()?, movie_id, action, remove, user).await,
        Commands::Login { username, password } => {
            commands::auth::login(&app()?, &username, password).await
        }
        Commands::Register {
            username,
            first_name,
            last_name,
            password,
        } => {
            commands::auth::register(&app()?, username, first_name, last_name, password).await
        }
        Commands::Logout => {
            let config = Config::load().context("load config")?;
            commands::auth::logout(&config)
        }
        Commands::Whoami => {
            commands::auth::whoami(&app()?);
            Ok(())
        }
        Commands::Browse { user } => commands::browse::run(&app()?, user).await,

        // config commands work even when the config file is broken
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetApiUrl { url } => commands::config::set_api_url(&url),
        },
    }
}
