//! `nsi_report`: drive an NSI2000 session from the command line.
//!
//! ```text
//! nsi_report --file C:\NSI2000\Data\pla11.nsi --config nsi.toml report --json
//! nsi_report script C:\NSI2000\Script\HelloWorld.bas
//! nsi_report info
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_nsi::report::{self, ReportOptions};
use rust_nsi::{BeamTable, FarField, ScriptRunner, Session, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nsi_report", version, about = "NSI2000 far-field automation")]
struct Cli {
    /// Measurement file to open; defaults to the file active in NSI2000
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Process beams and print the far-field summary
    Report {
        /// Only this beam (1-based); all beams when omitted
        #[arg(long)]
        beam: Option<u32>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Search the global peak on a 2x2 grid first
        #[arg(long)]
        fast_peak: bool,
        /// Beamwidth level in dB below peak
        #[arg(long, allow_hyphen_values = true)]
        level: Option<f64>,
    },
    /// Run an NSI2000 script file
    Script {
        /// Full path of the script
        path: PathBuf,
    },
    /// Print version, bound file, beam count and current frequency
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rust_nsi=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let session = open_session(cli.file.as_deref(), settings)?;

    match cli.command.unwrap_or(Action::Report {
        beam: None,
        json: false,
        fast_peak: false,
        level: None,
    }) {
        Action::Report {
            beam,
            json,
            fast_peak,
            level,
        } => run_report(&session, beam, json, fast_peak, level),
        Action::Script { path } => ScriptRunner::new(&session)
            .run(&path)
            .with_context(|| format!("Script {} failed", path.display())),
        Action::Info => print_info(&session),
    }
}

#[cfg(all(windows, feature = "com"))]
fn open_session(file: Option<&Path>, settings: Settings) -> Result<Session> {
    Session::connect(file, settings).context("Failed to open NSI2000 session")
}

#[cfg(not(all(windows, feature = "com")))]
fn open_session(_file: Option<&Path>, _settings: Settings) -> Result<Session> {
    anyhow::bail!("NSI2000 automation requires a Windows build with the `com` feature")
}

fn run_report(
    session: &Session,
    beam: Option<u32>,
    json: bool,
    fast_peak: bool,
    level: Option<f64>,
) -> Result<()> {
    let processing = &session.settings().processing;
    let mut options = ReportOptions::from(processing);
    options.fast_peak |= fast_peak;
    if let Some(level) = level {
        options.beamwidth_level_db = level;
    }

    report::prepare(&FarField::new(session), processing)
        .context("Failed to apply processing settings")?;

    let reports = match beam {
        Some(beam) => vec![report::collect_beam(session, beam, options)
            .with_context(|| format!("Beam #{beam} failed"))?],
        None => report::collect_all(session, options).context("Beam sweep failed")?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{report}");
        }
    }
    info!("Reported {} beam(s)", reports.len());
    Ok(())
}

fn print_info(session: &Session) -> Result<()> {
    println!(
        "- NSI2000 Professional Version: {}",
        session.application_version()?
    );
    println!("- Measurement: {}", session.file().display());
    println!("- Number of beams: {}", BeamTable::new(session).count()?);
    println!("- Frequency: {:.1} MHz", session.frequency()? / 1e6);
    Ok(())
}
