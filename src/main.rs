// Chisel: versioned comment-directive preprocessor

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser as _;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tracing::{debug, info, info_span};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use chisel::config::{ConfigError, ProjectConfig};
use chisel::eval::Parameters;
use chisel::parser::Diagnostic;
use chisel::ui::{App, Target};
use chisel::Processor;

#[derive(clap::Parser)]
#[command(name = "chisel", author, version, about, long_about = None)]
struct Cli {
    /// Files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to a JSON project config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target version (defaults to the config's current version)
    #[arg(short, long)]
    target: Option<String>,

    /// Define a constant: NAME or NAME=BOOL
    #[arg(short = 'D', long = "define", value_name = "NAME[=BOOL]", value_parser = parse_define)]
    defines: Vec<(String, bool)>,

    /// Register a swap replacement
    #[arg(short, long = "swap", value_name = "NAME=VALUE", value_parser = parse_pair)]
    swaps: Vec<(String, String)>,

    /// Set a dependency version
    #[arg(long = "dependency", value_name = "NAME=VERSION", value_parser = parse_pair)]
    dependencies: Vec<(String, String)>,

    /// Rewrite files in place instead of printing them
    #[arg(short, long, conflicts_with_all = ["check", "preview"])]
    write: bool,

    /// Exit with an error if any file would change
    #[arg(long, conflicts_with = "preview")]
    check: bool,

    /// Preview every configured version of a file in a terminal UI
    #[arg(long)]
    preview: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{}: {}", path.display(), diagnostic.line, diagnostic.message)]
    Syntax {
        path: PathBuf,
        diagnostic: Diagnostic,
    },

    #[error("Preview takes a single file, got {0}")]
    PreviewFiles(usize),

    #[error("Terminal error: {0}")]
    Terminal(#[source] io::Error),
}

fn parse_define(arg: &str) -> Result<(String, bool), String> {
    match arg.split_once('=') {
        None => Ok((arg.to_string(), true)),
        Some((name, value)) => {
            let value = value
                .parse::<bool>()
                .map_err(|_| format!("expected true or false, got '{}'", value))?;
            Ok((name.to_string(), value))
        }
    }
}

fn parse_pair(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))
}

impl Cli {
    fn load_config(&self) -> Result<ProjectConfig, CliError> {
        match &self.config {
            Some(path) => Ok(ProjectConfig::load(path)?),
            None => Ok(ProjectConfig::default()),
        }
    }

    /// Apply command-line overrides on top of config parameters.
    fn apply_overrides(&self, params: &mut Parameters) {
        params.merge(&Parameters {
            version: None,
            constants: self.defines.iter().cloned().collect(),
            swaps: self.swaps.iter().cloned().collect(),
            dependencies: self.dependencies.iter().cloned().collect(),
        });
    }

    fn parameters(&self, config: &ProjectConfig) -> Result<Parameters, CliError> {
        let mut params = config.parameters(self.target.as_deref())?;
        self.apply_overrides(&mut params);
        Ok(params)
    }

    /// One preview target per configured version, or the command-line target alone.
    fn targets(&self, config: &ProjectConfig) -> Result<Vec<Target>, CliError> {
        if config.versions.is_empty() || self.target.is_some() {
            let params = self.parameters(config)?;
            let label = params.version.clone().unwrap_or_else(|| String::from("default"));
            return Ok(vec![Target { label, params }]);
        }
        config
            .version_names()
            .into_iter()
            .map(|version| -> Result<Target, CliError> {
                let mut params = config.parameters(Some(version))?;
                self.apply_overrides(&mut params);
                Ok(Target {
                    label: version.to_string(),
                    params,
                })
            })
            .collect()
    }
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Process one file. Returns whether it changed.
fn run_file(
    cli: &Cli,
    processor: &Processor,
    params: &Parameters,
    path: &Path,
) -> Result<bool, CliError> {
    let _span = info_span!("file", path = %path.display()).entered();
    let source = read_source(path)?;
    let processed = processor
        .process(&source, params)
        .map_err(|diagnostic| CliError::Syntax {
            path: path.to_path_buf(),
            diagnostic,
        })?;
    let changed = processed.changed(&source);

    if cli.write {
        if changed {
            fs::write(path, &processed.text).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!("rewrote file");
        }
    } else if cli.check {
        if changed {
            println!("{} would change", path.display());
        }
    } else {
        print!("{}", processed.text);
    }
    Ok(changed)
}

fn run(cli: &Cli) -> Result<bool, CliError> {
    let config = cli.load_config()?;
    let params = cli.parameters(&config)?;
    debug!(version = ?params.version, constants = params.constants.len(), "resolved parameters");

    let processor = Processor::default();
    let mut ok = true;
    for path in &cli.files {
        match run_file(cli, &processor, &params, path) {
            Ok(changed) => ok &= !(cli.check && changed),
            Err(err) => {
                eprintln!("{}", err);
                ok = false;
            }
        }
    }
    Ok(ok)
}

fn preview(cli: &Cli) -> Result<(), CliError> {
    if cli.files.len() != 1 {
        return Err(CliError::PreviewFiles(cli.files.len()));
    }
    let path = &cli.files[0];
    let config = cli.load_config()?;
    let targets = cli.targets(&config)?;
    let source = read_source(path)?;
    let mut app = App::new(path.clone(), source, targets);

    // Set up terminal
    enable_raw_mode().map_err(CliError::Terminal)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(CliError::Terminal)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(CliError::Terminal)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode().map_err(CliError::Terminal)?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).map_err(CliError::Terminal)?;
    terminal.show_cursor().map_err(CliError::Terminal)?;

    res.map_err(CliError::Terminal)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The preview owns the terminal, so it stays quiet unless asked
    let default_level = match (cli.verbose, cli.preview) {
        (true, _) => "debug",
        (false, true) => "off",
        (false, false) => "warn",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let result = if cli.preview {
        preview(&cli).map(|()| true)
    } else {
        run(&cli)
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
