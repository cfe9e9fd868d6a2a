//! huginn: command line front end.
//!
//! Prints recommendations and relationship analyses as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

use huginn::config::{Config, Secrets};
use huginn::{EntityKind, Huginn, RecommendRequest};

/// Related GitHub users and repositories.
#[derive(Parser)]
#[command(name = "huginn")]
#[command(about = "Related GitHub users and repositories")]
#[command(disable_version_flag = true)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print version and build information.
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend users or repositories related to a center entity
    Recommend {
        /// Kind of the center entity (user or repo)
        #[arg(long = "type", value_name = "KIND")]
        kind: EntityKind,
        /// Login, or owner/name for repositories
        #[arg(long)]
        name: String,
        /// Kind of entity to recommend (user or repo)
        #[arg(long)]
        find: EntityKind,
        /// Number of results
        #[arg(long)]
        count: Option<usize>,
        /// Print the nodes/links graph instead of the raw result
        #[arg(long)]
        graph: bool,
    },

    /// Explain why two users or repositories are related
    Analyze {
        /// First node (login or owner/name)
        node_a: String,
        /// Second node (login or owner/name)
        node_b: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialise tracing (default: huginn=info; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("huginn=info")),
        )
        .init();

    let args = Args::parse();

    if args.version {
        println!("huginn {}", huginn::version_string());
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;
    let huginn = config.apply(Huginn::builder(), &secrets).build()?;
    debug!(version = huginn::PKG_VERSION, "huginn ready");

    match command {
        Command::Recommend {
            kind,
            name,
            find,
            count,
            graph,
        } => {
            let mut request = RecommendRequest::new(kind, name, find);
            request.count = count;
            let result = huginn.recommend(&request).await;

            match result.to_graph(find).filter(|_| graph) {
                Some(graph) => println!("{}", serde_json::to_string_pretty(&graph)?),
                None => println!("{}", serde_json::to_string_pretty(&result)?),
            }
            Ok(exit_code(result.is_success()))
        }

        Command::Analyze { node_a, node_b } => {
            let result = huginn.analyze(&node_a, &node_b).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(exit_code(result.is_success()))
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
