use clap::Parser as ClapParser;
use mdpreview::error::{CliError, Result};
use mdpreview::{DEFAULT_STYLESHEET, OutputMode, Parser};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Convert Markdown to HTML
#[derive(Debug, ClapParser)]
#[command(name = "mdpreview", version, about)]
struct Args {
    /// Markdown file to convert; reads stdin when absent or `-`
    input: Option<PathBuf>,

    /// Output a body fragment or a standalone styled page
    #[arg(long, value_enum, default_value_t = OutputMode::Html)]
    mode: OutputMode,

    /// Stylesheet embedded in `html-css` mode instead of the built-in one
    #[arg(long, value_name = "FILE")]
    stylesheet: Option<PathBuf>,

    /// Print the parsed document tree as JSON instead of HTML
    #[arg(long)]
    ast: bool,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let input = read_input(args.input.as_ref())?;
    debug!(bytes = input.len(), mode = ?args.mode, "converting");

    let output = if args.ast {
        let document = Parser::new().parse(&input);
        serde_json::to_string_pretty(&document)?
    } else {
        let stylesheet = match &args.stylesheet {
            Some(path) => fs::read_to_string(path).map_err(|source| CliError::Stylesheet {
                path: path.clone(),
                source,
            })?,
            None => DEFAULT_STYLESHEET.to_string(),
        };
        args.mode.render(&input, &stylesheet)
    };

    write_output(args.output.as_ref(), &output)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(path).map_err(|source| CliError::Read {
                path: Some(path.clone()),
                source,
            })
        }
        _ => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|source| CliError::Read { path: None, source })?;
            Ok(input)
        }
    }
}

fn write_output(path: Option<&PathBuf>, output: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, format!("{}\n", output)).map_err(|source| CliError::Write {
            path: Some(path.clone()),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", output)
                .and_then(|_| stdout.flush())
                .map_err(|source| CliError::Write { path: None, source })
        }
    }
}
