use flowmend_core::{
    ConfigError, ConfigLayers, EditError, EditOp, EditorConfig, IdGenerator, ShapeKind,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Config(ConfigError),
    Edit(EditError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Config(err) => write!(f, "config error: {err}"),
            CliError::Edit(err) if err.is_warning() => {
                write!(f, "warning: {}", err.user_message())
            }
            CliError::Edit(err) => write!(f, "{}", err.user_message()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<EditError> for CliError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Index,
    Format,
    Apply,
    NewId,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    write: bool,
    verbosity: u8,
    config: Option<String>,
    indent: Option<u64>,
    op: Option<String>,
    shape: Option<ShapeKind>,
    seed: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyOut<'a> {
    text: &'a str,
    created_id: Option<&'a str>,
}

fn usage() -> &'static str {
    "flowmend-cli\n\
\n\
USAGE:\n\
  flowmend-cli [index] [--pretty] [<path>|-]\n\
  flowmend-cli format [--indent <n>] [--write] [<path>|-]\n\
  flowmend-cli apply --op <json> [--write] [--pretty] [<path>|-]\n\
  flowmend-cli new-id --shape <kind> [--seed <text>] [<path>|-]\n\
\n\
OPTIONS:\n\
  --config <path>   JSON editor config (format/ids sections)\n\
  -v, -vv           more log output on stderr (RUST_LOG also works)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - --write replaces the input file instead of printing the result.\n\
  - apply prints the new text; with --pretty it prints {text, createdId} as JSON.\n\
  - A rejected edit prints its message on stderr and exits with status 3.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "index" => args.command = Command::Index,
            "format" => args.command = Command::Format,
            "apply" => args.command = Command::Apply,
            "new-id" => args.command = Command::NewId,
            "--pretty" => args.pretty = true,
            "--write" => args.write = true,
            "-v" | "--verbose" => args.verbosity += 1,
            "-vv" => args.verbosity += 2,
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--indent" => {
                let n = next_value(&mut it)?;
                args.indent = Some(n.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--op" => args.op = Some(next_value(&mut it)?.clone()),
            "--shape" => {
                let kind = next_value(&mut it)?;
                args.shape = Some(
                    kind.parse::<ShapeKind>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--seed" => args.seed = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Apply) && args.op.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::NewId) && args.shape.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if args.write && args.input.as_deref().is_none_or(|p| p == "-") {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "flowmend_core=debug",
        _ => "flowmend_core=trace",
    };
    let filter = if verbosity == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    } else {
        EnvFilter::new(default_level)
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Defaults, then the config file, then command-line flags.
fn load_config(args: &Args) -> Result<EditorConfig, CliError> {
    let mut layers = ConfigLayers::defaults();
    if let Some(path) = args.config.as_deref() {
        let json = std::fs::read_to_string(path)?;
        layers.merge_json_str(&json)?;
    }
    if let Some(indent) = args.indent {
        layers.set_value("format.indent", Value::from(indent));
    }
    let config = layers.resolve()?;
    tracing::debug!(?config, "resolved config");
    Ok(config)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, args: &Args) -> Result<(), CliError> {
    match args.input.as_deref() {
        Some(path) if args.write => {
            std::fs::write(path, text)?;
            Ok(())
        }
        _ => {
            print!("{text}");
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Index => {
            let index = flowmend_core::index(&text);
            for diagnostic in &index.diagnostics {
                tracing::warn!(line = diagnostic.line, "{}", diagnostic.message);
            }
            write_json(&index, args.pretty)
        }
        Command::Format => {
            let formatted = flowmend_core::format_with(&text, &config.format);
            write_text(&formatted, &args)
        }
        Command::Apply => {
            let raw = args.op.as_deref().ok_or(CliError::Usage(usage()))?;
            let op: EditOp = serde_json::from_str(raw)?;
            let applied = flowmend_core::apply_with(&text, &op, &config)?;
            if args.pretty {
                return write_json(
                    &ApplyOut {
                        text: &applied.text,
                        created_id: applied.created_id.as_deref(),
                    },
                    true,
                );
            }
            if let Some(id) = applied.created_id.as_deref() {
                tracing::info!(id, "created node");
            }
            write_text(&applied.text, &args)
        }
        Command::NewId => {
            let kind = args.shape.ok_or(CliError::Usage(usage()))?;
            let index = flowmend_core::index(&text);
            let mut ids = IdGenerator::with_options(&index, config.ids.clone());
            println!("{}", ids.generate(kind, args.seed.as_deref()));
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_logging(args.verbosity);

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::Edit(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
