//! Binary for the SMS backup service.

use anyhow::Result;
use clap::Parser;
use sms_backup::{load_config, run_list, run_service, run_sync, Cli, Commands};
use storage::derived_key;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            events,
            exit_on_eof,
        } => {
            let config = load_config()?;
            run_service(config, events, exit_on_eof).await
        }
        Commands::Sync => {
            let config = load_config()?;
            let report = run_sync(config).await?;
            println!(
                "scanned={} saved={} failed={}",
                report.scanned, report.saved, report.failed
            );
            Ok(())
        }
        Commands::Key { sender, timestamp } => {
            println!("{}", derived_key(timestamp, &sender));
            Ok(())
        }
        Commands::List { limit } => {
            let config = load_config()?;
            for (key, record) in run_list(config, limit).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    key, record.date, record.sender, record.message
                );
            }
            Ok(())
        }
    }
}
