use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use runtime::{
    config::{Cli, Command, HashArgs, RunArgs},
    digest::{expand, file_digest},
    logging::init_logging,
    session::Session,
};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Hash(args) => hash(args),
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    info!("facebit v{} starting", env!("CARGO_PKG_VERSION"));
    let mut session = Session::open(&args).context("startup failed")?;
    let summary = session.run(quit_signal()).await;
    drop(session);
    info!(
        frames = summary.frames,
        sent = summary.commands_sent,
        failed = summary.send_failures,
        "program finished"
    );
    Ok(())
}

/// Completes on Ctrl-C. Never completes if the handler cannot be installed.
async fn quit_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("interrupted, shutting down"),
        Err(e) => {
            error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await
        }
    }
}

fn hash(args: HashArgs) -> anyhow::Result<()> {
    let files = expand(&args.paths)?;
    let mut failed = 0;
    for file in &files {
        match file_digest(file) {
            Ok(digest) => println!("{digest}  {}", file.display()),
            Err(e) => {
                error!(file = %file.display(), error = %e, "cannot hash file");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} files could not be hashed", files.len());
    }
    Ok(())
}
