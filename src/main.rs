//! enscript: error-tolerant Enforce Script parser with a terminal outline viewer
//!
//! Run with: `enscript [OPTIONS] <FILE>`

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use enscript::parser::{parse, ParserConfig};
use enscript::ui::App;

#[derive(Parser)]
#[command(name = "enscript")]
#[command(about = "Parse an Enforce Script file and browse its outline and diagnostics")]
#[command(version)]
struct Cli {
    /// Script file to parse
    file: PathBuf,

    /// Define a preprocessor symbol (repeatable)
    #[arg(short = 'D', value_name = "SYMBOL")]
    define: Vec<String>,

    /// Swallow missing-semicolon and similar stylistic errors
    #[arg(long)]
    lenient: bool,

    /// Editor mode: synthesize placeholders for incomplete member access
    #[arg(long)]
    ide: bool,

    /// Brace-match function bodies instead of parsing them
    #[arg(long)]
    skip_bodies: bool,

    /// Start from the library preset (lenient, bodies skipped)
    #[arg(long)]
    library: bool,

    /// Stop at the first error instead of recovering
    #[arg(long)]
    no_recovery: bool,

    /// JSON parser settings (camelCase keys), applied before the flags above
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print diagnostics and exit instead of opening the viewer
    #[arg(long)]
    check: bool,

    /// Log recovery decisions
    #[arg(long)]
    debug: bool,
}

fn load_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None if cli.library => ParserConfig::library(),
        None => ParserConfig::workspace(),
    };

    config = config.with_definitions(cli.define.iter().cloned());
    config.lenient_semicolons |= cli.lenient;
    config.ide_mode |= cli.ide;
    config.skip_function_bodies |= cli.skip_bodies;
    config.debug |= cli.debug;
    if cli.no_recovery {
        config.error_recovery = false;
    }
    Ok(config)
}

fn uri_for(path: &std::path::Path) -> String {
    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

fn run_check(cli: &Cli, config: &ParserConfig, source: &str) -> ExitCode {
    let filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let output = parse(&uri_for(&cli.file), source, 1, config);
    for diagnostic in &output.diagnostics {
        println!("{}: {}", cli.file.display(), diagnostic);
    }
    info!(
        declarations = output.file.body.len(),
        handled = output.handled.len(),
        "check finished"
    );
    println!(
        "{}: {} errors, {} warnings",
        cli.file.display(),
        output.errors().count(),
        output.warnings().count()
    );

    if output.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_viewer(cli: &Cli, config: ParserConfig, source: String) -> Result<()> {
    let mut app = App::new(uri_for(&cli.file), source, config, Some(cli.file.clone()));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Viewer failed")
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    if cli.check {
        return Ok(run_check(&cli, &config, &source));
    }

    run_viewer(&cli, config, source)?;
    Ok(ExitCode::SUCCESS)
}
