use crate::commands::{self, FormArgs, QueryArgs};
use application_forms::config::AppConfig;
use application_forms::error::AppError;
use application_forms::telemetry;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "application-forms",
    about = "Inspect and edit application forms through the REST API",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ConnectionArgs {
    /// Override the configured API base URL
    #[arg(long, global = true)]
    pub(crate) base_url: Option<String>,
    /// Override the configured request timeout (at least one second)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List application forms (dates as sent by the server)
    List(QueryArgs),
    /// Fetch one application form
    Get {
        /// Identifier of the form
        id: i64,
    },
    /// Create an application form
    Create(FormArgs),
    /// Replace an existing application form
    Update {
        /// Identifier of the form
        id: i64,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Delete an application form
    Delete {
        /// Identifier of the form
        id: i64,
    },
    /// Full-text search over application forms
    Search {
        /// Search expression
        query: String,
        #[command(flatten)]
        params: QueryArgs,
    },
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(base_url) = cli.connection.base_url.as_deref() {
        config.api.set_base_url(base_url)?;
    }
    if let Some(secs) = cli.connection.timeout_secs {
        config.api.timeout = std::time::Duration::from_secs(secs);
    }

    telemetry::init(&config.telemetry)?;
    let client = commands::connect(&config)?;

    match cli.command {
        Command::List(args) => commands::list(&client, args).await,
        Command::Get { id } => commands::get(&client, id).await,
        Command::Create(form) => commands::create(&client, form).await,
        Command::Update { id, form } => commands::update(&client, id, form).await,
        Command::Delete { id } => commands::delete(&client, id).await,
        Command::Search { query, params } => commands::search(&client, &query, params).await,
    }
}
