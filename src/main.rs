use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flatconf::{
    document_key, export_env, export_json, load_path, print_flat, EventSink, ExportError,
    LoadError, ProcessEnv, SinkChoice, TracingSink, DEFAULT_ENV_FILE, DEFAULT_JSON_FILE,
};

const LOG_FILE: &str = "flatconf.log";

const SINK_MENU: &str = "Enter 1 to print the flattened config\n\
     Enter 2 to write a .env file and set environment variables\n\
     Enter 3 to write a .json file\n\
     Your choice: ";

#[derive(Parser)]
#[command(name = "flatconf")]
#[command(version, about = "Flatten INI and YAML config files into env or JSON exports")]
struct Cli {
    /// Config file to load (prompted for when omitted)
    path: Option<PathBuf>,

    /// Export sink: 1 = print, 2 = .env file, 3 = JSON file (prompted for when omitted)
    #[arg(short, long, value_name = "CHOICE")]
    sink: Option<String>,

    /// Target file for the .env or JSON sink (prompted for when omitted)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Directory for the append-only log file
    #[arg(long, value_name = "DIR", default_value = ".")]
    log_dir: PathBuf,
}

/// Error type for the driver: everything here is fatal and exits with 1.
#[derive(Debug)]
enum AppError {
    Load(LoadError),
    Export(ExportError),
    Io(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Load(e) => write!(f, "{e}"),
            AppError::Export(e) => write!(f, "{e}"),
            AppError::Io(e) => write!(f, "input error: {e}"),
        }
    }
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        AppError::Load(e)
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Export(e)
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_dir);
    let events = TracingSink;

    match run(&cli, &events) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            events.error(&e.to_string());
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Single-shot flow: resolve the input path, load, pick a sink, export.
fn run(cli: &Cli, events: &dyn EventSink) -> Result<(), AppError> {
    let path = match &cli.path {
        Some(p) => p.clone(),
        None => PathBuf::from(prompt("Enter absolute file path: ")?),
    };
    events.info(&format!("loading config file {}", path.display()));
    let config = load_path(&path, events)?;

    let answer = match &cli.sink {
        Some(choice) => choice.clone(),
        None => prompt(SINK_MENU)?,
    };
    let Some(choice) = SinkChoice::parse(&answer) else {
        // The one recoverable outcome: report and end the run without exporting.
        events.warning(&format!("invalid sink choice {answer:?}"));
        println!("Invalid choice! Try again!");
        return Ok(());
    };

    match choice {
        SinkChoice::Dict => {
            events.info("printing flattened config");
            print_flat(&config);
        }
        SinkChoice::Env => {
            let target = env_target(cli)?;
            export_env(&config, &target, &mut ProcessEnv, events)?;
            println!("Dumped into file {}.", target.display());
        }
        SinkChoice::Json => {
            let target = json_target(cli, events)?;
            export_json(&config, &document_key(&path), &target, events)?;
            println!("Dumped into file {}.", target.display());
        }
    }

    Ok(())
}

/// Resolve the dotenv target: `--output`, then a prompt, then `.env` in the
/// working directory. A directory answer gets `.env` appended.
fn env_target(cli: &Cli) -> io::Result<PathBuf> {
    let given = match &cli.output {
        Some(p) => Some(p.clone()),
        None => {
            let answer = prompt(
                "Enter the .env file to create or append to (empty = .env in the current dir): ",
            )?;
            (!answer.is_empty()).then(|| PathBuf::from(answer))
        }
    };
    Ok(match given {
        Some(p) if p.is_dir() => p.join(DEFAULT_ENV_FILE),
        Some(p) => p,
        None => PathBuf::from(DEFAULT_ENV_FILE),
    })
}

/// Resolve the JSON target: an existing file is merged into; anything else
/// falls back to `result.json` in the working directory.
fn json_target(cli: &Cli, events: &dyn EventSink) -> io::Result<PathBuf> {
    let given = match &cli.output {
        Some(p) => Some(p.clone()),
        None => {
            let answer = prompt(
                "Enter an existing .json file to append to (empty = new result.json in the current dir): ",
            )?;
            (!answer.is_empty()).then(|| PathBuf::from(answer))
        }
    };
    Ok(match given {
        Some(p) if p.is_file() => p,
        Some(p) => {
            events.warning(&format!(
                "json file {} not found, creating {DEFAULT_JSON_FILE}",
                p.display()
            ));
            println!("File not found. Creating new file {DEFAULT_JSON_FILE}");
            PathBuf::from(DEFAULT_JSON_FILE)
        }
        None => PathBuf::from(DEFAULT_JSON_FILE),
    })
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn init_logging(dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}
