// CLI modules
mod args;
mod op;
mod ops;
mod process;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Backup, Restore, SyncStores, Version};

command_enum! {
    (Sync, "sync", SyncStores),
    (Backup, "backup", Backup),
    (Restore, "restore", Restore),
    (Version, "version", Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_guard = process::init_logging(args.log_level);

    let code = match op::OpContext::new(&args) {
        Ok(ctx) => match args.command.execute(&ctx).await {
            Ok(output) => {
                if let Some(report) = output.report() {
                    println!("{}", report);
                }
                0
            }
            Err(e) => {
                tracing::error!(command = args.command.name(), "{}", e);
                1
            }
        },
        Err(e) => {
            tracing::error!("failed to load configuration: {}", e);
            1
        }
    };

    // process::exit skips destructors; flush buffered log lines first
    drop(log_guard);
    std::process::exit(code);
}
