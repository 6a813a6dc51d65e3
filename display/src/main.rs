use clap::Parser;
use display::{parse_idle_after, Dispatcher, TerminalScreen};
use link::{open_serial, LineReceiver, BAUD_RATE};
use std::{io, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Serial port to listen on, or `-` for standard input
    #[arg(long, env = "FACEBIT_DISPLAY_PORT")]
    port: String,
    /// Line speed
    #[arg(long, default_value_t = BAUD_RATE)]
    baud: u32,
    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
    /// Seconds without a command before showing the sleeping face again.
    /// Serial ports only: stdin blocks between lines.
    #[arg(long, env = "FACEBIT_IDLE_AFTER", value_parser = parse_idle_after)]
    idle_after: Option<Duration>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    if cli.port == "-" && cli.idle_after.is_some() {
        anyhow::bail!("--idle-after needs a serial port; stdin blocks between lines");
    }

    let mut dispatcher = Dispatcher::new(TerminalScreen::new(io::stdout()));
    if let Some(after) = cli.idle_after {
        dispatcher = dispatcher.with_idle_timeout(after);
    }
    let poll = Duration::from_millis(cli.poll_ms);

    let last = if cli.port == "-" {
        info!("reading commands from stdin");
        dispatcher.run(&mut LineReceiver::new(io::stdin().lock()), poll)
    } else {
        let port = open_serial(&cli.port, cli.baud, Duration::from_millis(10))?;
        dispatcher.run(&mut LineReceiver::new(port), poll)
    };
    info!(state = ?last, "input closed");
    Ok(())
}
