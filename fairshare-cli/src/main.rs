mod bootstrap;

use std::{borrow::Cow, env, fs, io, process};

use fairshare_application::{AllocationOutcome, AllocationService, RequestParser};
use fairshare_infrastructure::JsonRequestParser;
use fairshare_presentation::{AllocationPresenter, format_allocation_error, format_request_error};

use crate::bootstrap::{AppConfig, init_logging};

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "Usage: fairshare <request.json | -> [--format json|text|csv]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Json,
    Text,
    Csv,
}

impl OutputFormat {
    fn parse(value: &str) -> CliResult<Self> {
        match value {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            other => Err(format!("Unknown format '{other}'. {USAGE}").into()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    path: String,
    format: OutputFormat,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let args = parse_args(env::args().skip(1))?;

    init_logging();
    let config =
        AppConfig::from_env().map_err(|err| format!("Invalid configuration: {err}"))?;

    tracing::debug!(path = %args.path, format = ?args.format, "Reading allocation request");
    let content = read_request(&args.path)?;
    let request = JsonRequestParser
        .parse(&content)
        .map_err(|err| format_request_error(&err))?;

    let solver = config.build_solver();
    let outcome = AllocationService::new(&solver)
        .allocate(&request)
        .map_err(|err| format_allocation_error(&err))?;

    println!("{}", render(&outcome, args.format)?);
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> CliResult<CliArgs> {
    let mut path = None;
    let mut format = OutputFormat::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--format=") {
            format = OutputFormat::parse(value)?;
        } else if arg == "--format" {
            let Some(value) = args.next() else {
                return Err(format!("--format needs a value. {USAGE}").into());
            };
            format = OutputFormat::parse(&value)?;
        } else if arg == "-h" || arg == "--help" {
            return Err(USAGE.into());
        } else if path.is_none() {
            path = Some(arg);
        } else {
            return Err(format!("Unexpected argument '{arg}'. {USAGE}").into());
        }
    }

    let Some(path) = path else {
        return Err(USAGE.into());
    };
    Ok(CliArgs { path, format })
}

fn read_request(path: &str) -> CliResult<String> {
    if path == "-" {
        return io::read_to_string(io::stdin())
            .map_err(|err| format!("Failed to read stdin: {err}").into());
    }
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{path}': {err}").into())
}

fn render(outcome: &AllocationOutcome, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => AllocationPresenter::render_json(outcome)
            .map_err(|err| format!("Failed to encode result: {err}").into()),
        OutputFormat::Text => Ok(AllocationPresenter::render_text(outcome)),
        OutputFormat::Csv => Ok(AllocationPresenter::render_csv(outcome)),
    }
}
