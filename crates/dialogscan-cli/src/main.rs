//! dialogscan - report CLI dialogs drawn in a terminal session
//!
//! Usage:
//!   dialogscan replay session.log --cols 120 --rows 40
//!   some-pty-recorder | dialogscan watch
//!   dialogscan parse list dialog.txt

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use alacritty_terminal::event::VoidListener;
use alacritty_terminal::term::{Config as TermConfig, Term};
use alacritty_terminal::vte::ansi::Processor;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dialogscan_core::{
    parse_server_detail, parse_server_list, parse_slash_menu, DialogDetector, DialogState,
    GridSnapshot, ScanConfig, ScanReport, ScanTrigger, TermSize,
};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

const DEFAULT_COLS: usize = 120;
const DEFAULT_ROWS: usize = 40;
const READ_CHUNK: usize = 8192;

#[derive(Parser, Debug)]
#[command(name = "dialogscan")]
#[command(about = "Detect interactive CLI dialogs in terminal output")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct TermArgs {
    /// Terminal width
    #[arg(long, default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Terminal height
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Scan config (YAML). Defaults to $DIALOGSCAN_CONFIG or the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat bare LF as CRLF (plain text captures)
    #[arg(long)]
    crlf: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a recorded PTY stream through the emulator and scan the final screen
    Replay {
        /// Raw PTY capture
        file: PathBuf,

        #[command(flatten)]
        term: TermArgs,
    },
    /// Read PTY output from stdin and print every dialog state change
    Watch {
        #[command(flatten)]
        term: TermArgs,
    },
    /// Run a single parser over a block of dialog text
    Parse {
        kind: ParseKind,

        /// Text file; stdin when omitted
        file: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ParseKind {
    List,
    Detail,
    Slash,
}

/// Build log filter: RUST_LOG > DIALOGSCAN_LOG_LEVEL > default "warn"
fn log_filter() -> tracing_subscriber::EnvFilter {
    let level = if let Ok(v) = std::env::var("RUST_LOG") {
        v
    } else if let Ok(v) = std::env::var("DIALOGSCAN_LOG_LEVEL") {
        match v.as_str() {
            "silent" => "off".to_string(),
            "fatal" => "error".to_string(),
            other => other.to_string(),
        }
    } else {
        "warn".to_string()
    };

    tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DIALOGSCAN_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("dialogscan").join("config.yaml"))
}

fn load_config(explicit: Option<&Path>) -> Result<ScanConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) => path,
            None => return Ok(ScanConfig::default()),
        },
    };

    let config = ScanConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    debug!(path = %path.display(), "Scan config loaded");
    Ok(config)
}

fn new_term(args: &TermArgs) -> Result<Term<VoidListener>> {
    if args.cols == 0 || args.rows == 0 {
        anyhow::bail!("Terminal size must be non-zero (got {}x{})", args.cols, args.rows);
    }
    let size = TermSize::new(args.cols, args.rows);
    Ok(Term::new(TermConfig::default(), &size, VoidListener))
}

/// Expand bare `\n` into `\r\n`
fn to_crlf(data: &[u8], prev: &mut u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 16);
    for &b in data {
        if b == b'\n' && *prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        *prev = b;
    }
    out
}

fn replay(file: &Path, args: &TermArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let data = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let data = if args.crlf { to_crlf(&data, &mut 0) } else { data };

    let mut term = new_term(args)?;
    let mut processor: Processor = Processor::new();
    processor.advance(&mut term, &data);

    let report = DialogDetector::new(config).scan_report(&term);
    info!(state = report.state.kind(), bytes = data.len(), "Replay scanned");

    println!("{}", serde_json::to_string_pretty(&report.state)?);
    Ok(())
}

fn print_report(report: &ScanReport) -> Result<()> {
    let line = serde_json::to_string(report)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}

async fn watch(args: &TermArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let quiet = config.quiet_period();
    let lookback = config.lookback_lines;
    let detector = DialogDetector::new(config);

    let term = Arc::new(Mutex::new(new_term(args)?));

    let scan = {
        let term = term.clone();
        let detector = detector.clone();
        move || {
            // Copy under the lock, scan without it
            let grid = {
                let term = term.lock().unwrap_or_else(|e| e.into_inner());
                GridSnapshot::capture(&*term, lookback)
            };
            detector.scan_report(&grid)
        }
    };
    let (trigger, mut reports) = ScanTrigger::spawn(quiet, scan);

    let printer = tokio::spawn(async move {
        let mut last: Option<DialogState> = None;
        while let Some(report) = reports.recv().await {
            if last.as_ref() == Some(&report.state) {
                continue;
            }
            print_report(&report)?;
            last = Some(report.state);
        }
        Ok::<_, anyhow::Error>(last)
    });

    let mut processor: Processor = Processor::new();
    let mut stdin = tokio::io::stdin();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut prev = 0u8;

    loop {
        let n = stdin.read(&mut buf).await.context("Failed to read stdin")?;
        if n == 0 {
            break;
        }
        let chunk = if args.crlf {
            to_crlf(&buf[..n], &mut prev)
        } else {
            buf[..n].to_vec()
        };
        {
            let mut term = term.lock().unwrap_or_else(|e| e.into_inner());
            processor.advance(&mut *term, &chunk);
        }
        trigger.notify();
    }

    debug!("Input closed, flushing final state");
    trigger.shutdown().await;
    let last = printer.await.context("Printer task failed")??;

    // A scan still pending at EOF was dropped; run it now
    let grid = {
        let term = term.lock().unwrap_or_else(|e| e.into_inner());
        GridSnapshot::capture(&*term, lookback)
    };
    let report = detector.scan_report(&grid);
    if last.as_ref() != Some(&report.state) {
        print_report(&report)?;
    }
    Ok(())
}

fn parse(kind: ParseKind, file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let json = match kind {
        ParseKind::List => serde_json::to_string_pretty(&parse_server_list(&text))?,
        ParseKind::Detail => serde_json::to_string_pretty(&parse_server_detail(&text))?,
        ParseKind::Slash => serde_json::to_string_pretty(&parse_slash_menu(&text))?,
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay { file, term } => replay(&file, &term),
        Command::Watch { term } => watch(&term).await,
        Command::Parse { kind, file } => parse(kind, file.as_deref()),
    }
}
