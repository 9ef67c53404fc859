use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use lunarfix::fixes::{self, FixOptions, FixResult};

#[derive(Parser)]
#[command(
    name = "lunarfix",
    version,
    about = "Scripted source fixes for the LunarCrush GraphQL Workers backend"
)]
struct Cli {
    /// Workspace root containing the packages/ tree
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Do not write timestamped .bak files before overwriting
    #[arg(long)]
    no_backup: bool,

    /// Print unified diff previews of applied patches
    #[arg(long)]
    diff: bool,

    /// Emit a JSON run report on stdout
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wire the Workers env into the GraphQL context
    EnvContext,
    /// Point the GraphQL route at the canonical schema module
    RouteImport,
    /// Generate the schema bridge and rewire the route import
    SchemaImport,
    /// Replace the mock getTopic resolver with the real API call
    ResolverApi,
    /// Reduce getTopic to the raw-data form
    ResolverSimplify,
    /// Route getTopic through config carried in the context
    ResolverConfig,
    /// Run every fix in order
    All,
}

impl Command {
    fn fix_names(&self) -> Vec<&'static str> {
        match self {
            Command::EnvContext => vec!["env-context"],
            Command::RouteImport => vec!["route-import"],
            Command::SchemaImport => vec!["schema-import"],
            Command::ResolverApi => vec!["resolver-api"],
            Command::ResolverSimplify => vec!["resolver-simplify"],
            Command::ResolverConfig => vec!["resolver-config"],
            Command::All => fixes::ALL_FIXES.to_vec(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = FixOptions {
        backup: !cli.no_backup,
        show_diff: cli.diff,
    };

    let results: Vec<FixResult> = cli
        .command
        .fix_names()
        .into_iter()
        .map(|name| fixes::execute_fix(&cli.root, name, &options))
        .collect();

    if cli.json {
        match serde_json::to_string_pretty(&results) {
            Ok(report) => println!("{report}"),
            Err(e) => eprintln!("[REPORT] failed to serialize run report: {e}"),
        }
    }

    if results.iter().all(|r| r.success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
