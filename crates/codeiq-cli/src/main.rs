//! codeiq: Concurrent code scanning and scoring

use clap::{Parser, Subcommand};

use codeiq_cli::{commands, setup_logging, Neo4jArgs, ScanArgs};

#[derive(Parser)]
#[command(name = "codeiq")]
#[command(author, version, about = "Code health, security and knowledge scanner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a repository and score every file
    Scan(ScanArgs),

    /// Show the lifecycle state of a scan
    Status {
        /// Scan id to look up
        #[arg(long)]
        scan_id: String,

        #[command(flatten)]
        neo4j: Neo4jArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Scan(args) => {
            let output = commands::scan::run(&args).await?;
            println!("{}", output.summary);
            if let Some(path) = output.report_path {
                println!("Report written to {}", path.display());
            }
        }
        Commands::Status { scan_id, neo4j } => {
            let status = commands::status::run(&scan_id, &neo4j).await?;
            println!("{status}");
        }
    }

    Ok(())
}
