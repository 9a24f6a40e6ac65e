use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use log::{debug, error};

use reqframe::{
    FragmentedReader, ParserConfig, Request, format_debug, format_headers_only, format_json,
    request_from_reader_with_config,
};

/// reqframe CLI — streaming HTTP/1.1 request inspector.
///
/// Reads a raw HTTP request from a file, --raw string, or stdin through the
/// incremental reader and prints the parsed request in the chosen format.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full HTTP request as a single shell argument.
#[derive(ClapParser)]
#[command(name = "reqframe-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing a raw HTTP request.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP request string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Deliver input to the parser at most this many bytes per read.
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Initial read buffer size in bytes.
    #[arg(long, default_value = "8")]
    initial_buffer_size: usize,

    /// Fail when the read buffer would grow past this many bytes.
    #[arg(long, value_name = "BYTES")]
    max_buffer_size: Option<usize>,

    /// Reject requests declaring a Content-Length above this many bytes.
    #[arg(long, value_name = "BYTES")]
    max_body_size: Option<usize>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// Request-line + headers only
    Headers,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // When no input source is provided and stdin is a terminal (not piped),
    // show help instead of blocking.
    if cli.file.is_none() && cli.raw.is_none() && io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let source = match open_input(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    let config = ParserConfig {
        initial_buffer_size: cli.initial_buffer_size,
        max_buffer_size: cli.max_buffer_size,
        max_body_size: cli.max_body_size,
    };

    let request = match parse(source, cli.chunk_size, config) {
        Ok(r) => r,
        Err(e) => {
            error!("request rejected: {e:?}");
            eprintln!("Parse error: {e}");
            process::exit(2);
        }
    };

    let output = match cli.format {
        OutputFormat::Json => format_json(&request, cli.pretty),
        OutputFormat::Debug => format_debug(&request),
        OutputFormat::Headers => format_headers_only(&request),
    };

    print!("{output}");
}

fn parse(
    source: Box<dyn Read>,
    chunk_size: Option<usize>,
    config: ParserConfig,
) -> Result<Request, reqframe::ParseError> {
    match chunk_size {
        Some(n) => {
            debug!("feeding input in {n}-byte reads");
            request_from_reader_with_config(FragmentedReader::new(source, n), config)
        }
        None => request_from_reader_with_config(source, config),
    }
}

/// Open the request source: --raw, a file, or stdin.
fn open_input(cli: &Cli) -> io::Result<Box<dyn Read>> {
    if let Some(raw) = &cli.raw {
        return Ok(Box::new(io::Cursor::new(unescape(raw).into_bytes())));
    }
    match &cli.file {
        Some(path) => Ok(Box::new(File::open(path)?)),
        None => Ok(Box::new(io::stdin())),
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
