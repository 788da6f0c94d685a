use merbox::export::raster::RasterOptions;
use merbox::export::{ExportFormat, export};
use merbox::storage::{self, FileStore, Source};
use merbox::{EditorState, RenderConfig, Theme};
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    State(merbox::Error),
    UnknownTheme(String),
    EmptyCode,
    Undecodable,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::State(err) => write!(f, "{err}"),
            CliError::UnknownTheme(name) => write!(
                f,
                "unknown theme `{name}` (expected default, dark, forest, neutral, base or custom)"
            ),
            CliError::EmptyCode => write!(f, "Nothing to encode: diagram source is blank"),
            CliError::Undecodable => write!(f, "No decodable editor state in input"),
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

impl From<merbox::Error> for CliError {
    fn from(value: merbox::Error) -> Self {
        Self::State(value)
    }
}

impl From<merbox::error::Error> for CliError {
    fn from(value: merbox::error::Error) -> Self {
        Self::State(value.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Encode,
    Decode,
    Config,
    Embed,
    Export,
}

#[derive(Debug)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    theme: Theme,
    theme_config: Option<String>,
    base_url: Option<String>,
    store: Option<String>,
    format: ExportFormat,
    width: u32,
    background: String,
    out: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        let raster = RasterOptions::default();
        Self {
            command: Command::default(),
            input: None,
            pretty: false,
            theme: Theme::default(),
            theme_config: None,
            base_url: None,
            store: None,
            format: ExportFormat::Svg,
            width: raster.width,
            background: raster.background,
            out: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadOut<'a> {
    source: &'static str,
    clear_fragment: bool,
    state: &'a EditorState,
}

fn usage() -> &'static str {
    "merbox-cli\n\
\n\
USAGE:\n\
  merbox-cli encode [--theme <name>] [--theme-config <path>] [--base-url <url>] [--store <path>] [<path>|-]\n\
  merbox-cli decode [--pretty] [--store <path>] [<token|url>]\n\
  merbox-cli config [--pretty] <token|url>\n\
  merbox-cli embed <token|url>\n\
  merbox-cli export [--format svg|png|jpg|webp|pdf] [--width <px>] [--background <css-color>] [--out <path>] [<svg>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - encode prints the '#pako:' fragment, or a full URL with --base-url.\n\
  - decode accepts a bare token, a '#pako:' fragment or a URL carrying one.\n\
  - --store reads and writes editor state in a JSON file, like the editor's local storage.\n\
  - export prints SVG to stdout by default; raster formats default to writing next to the\n\
    input file (or ./diagram.<ext> for stdin). Use --out - to write bytes to stdout.\n\
  - Set MERBOX_LOG (e.g. MERBOX_LOG=debug) to control diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "encode" => args.command = Command::Encode,
            "decode" => args.command = Command::Decode,
            "config" => args.command = Command::Config,
            "embed" => args.command = Command::Embed,
            "export" => args.command = Command::Export,
            "--pretty" => args.pretty = true,
            "--theme" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.theme = name
                    .parse::<Theme>()
                    .map_err(|_| CliError::UnknownTheme(name.clone()))?;
            }
            "--theme-config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.theme_config = Some(path.clone());
            }
            "--base-url" => {
                let Some(url) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.base_url = Some(url.clone());
            }
            "--store" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.store = Some(path.clone());
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = fmt
                    .parse::<ExportFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = w.parse::<u32>().map_err(|_| CliError::Usage(usage()))?;
                if args.width == 0 {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = bg.trim().to_string();
                }
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
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
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            input => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(input.to_string());
            }
        }
    }

    if matches!(args.command, Command::Config | Command::Embed) && args.input.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => read_stdin(),
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

/// The token argument itself, or stdin when omitted.
fn read_token_arg(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => Ok(read_stdin()?.trim().to_string()),
        Some(token) => Ok(token.trim().to_string()),
    }
}

/// Accepts a bare token, a `#pako:` fragment or a URL.
fn decode_arg(input: &str) -> Result<EditorState, CliError> {
    let state = if input.contains('#') {
        merbox::decode_fragment(input)
    } else {
        merbox::decode(input)
    };
    state.ok_or(CliError::Undecodable)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn default_out_path(input: Option<&str>, format: ExportFormat) -> PathBuf {
    match input {
        Some(path) if path != "-" => PathBuf::from(path).with_extension(format.extension()),
        _ => PathBuf::from(format.file_name()),
    }
}

fn source_name(source: Source) -> &'static str {
    match source {
        Source::Url => "url",
        Source::Storage => "storage",
        Source::Empty => "empty",
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Encode => {
            let code = read_input(args.input.as_deref())?;
            let code = code.strip_suffix('\n').unwrap_or(&code);
            if code.trim().is_empty() {
                return Err(CliError::EmptyCode);
            }
            let theme_config = match args.theme_config.as_deref() {
                // Kept as the text the editor pane holds, not re-serialized.
                Some(path) => Some(Value::String(std::fs::read_to_string(path)?)),
                None => None,
            };
            let state = EditorState::new(code, args.theme).with_theme_config(theme_config);

            if let Some(path) = args.store.as_deref() {
                let mut store = FileStore::open(path)?;
                let dark_mode = storage::load_dark_mode(&store);
                storage::save_state(&mut store, &state, dark_mode);
            }

            let shared = match args.base_url.as_deref() {
                Some(base) => merbox::share_url(base, &state),
                None => merbox::share_fragment(&state),
            };
            println!("{shared}");
            Ok(())
        }
        Command::Decode => {
            if let Some(path) = args.store.as_deref() {
                let store = FileStore::open(path)?;
                let fragment = match args.input.as_deref() {
                    Some(arg) if arg != "-" => Some(arg.trim().to_string()),
                    _ => None,
                };
                // A bare token is treated as the fragment it came from.
                let fragment = fragment.map(|f| {
                    if f.contains('#') {
                        f
                    } else {
                        format!("{}{f}", merbox::FRAGMENT_PREFIX)
                    }
                });
                let outcome = storage::load_state(fragment.as_deref(), &store);
                return write_json(
                    &LoadOut {
                        source: source_name(outcome.source),
                        clear_fragment: outcome.clear_fragment,
                        state: &outcome.state,
                    },
                    args.pretty,
                );
            }

            let token = read_token_arg(args.input.as_deref())?;
            if token.contains('#') {
                return write_json(&decode_arg(&token)?, args.pretty);
            }
            match merbox::try_decode(&token) {
                Ok(state) => write_json(&state, args.pretty),
                Err(err) => {
                    tracing::warn!(%err, "token did not decode");
                    Err(CliError::Undecodable)
                }
            }
        }
        Command::Config => {
            let state = decode_arg(&read_token_arg(args.input.as_deref())?)?;
            write_json(RenderConfig::for_state(&state).as_value(), args.pretty)
        }
        Command::Embed => {
            let state = decode_arg(&read_token_arg(args.input.as_deref())?)?;
            println!("{}", merbox::meta::embed_html(&state));
            Ok(())
        }
        Command::Export => {
            let svg = read_input(args.input.as_deref())?;
            let options = RasterOptions {
                width: args.width,
                background: args.background.clone(),
                ..Default::default()
            };
            let bytes = export(&svg, args.format, &options)?;

            let out = match (args.out, args.format) {
                (Some(out), _) => Some(PathBuf::from(out)),
                (None, ExportFormat::Svg) => None,
                (None, format) => Some(default_out_path(args.input.as_deref(), format)),
            };
            match out {
                Some(path) if path.as_os_str() != "-" => {
                    std::fs::write(&path, bytes)?;
                    tracing::info!(path = %path.display(), "wrote export");
                }
                _ => std::io::stdout().lock().write_all(&bytes)?,
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("MERBOX_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(
            err @ (CliError::Undecodable
            | CliError::State(merbox::Error::Svg(merbox::svg::Error::MissingSvg))),
        ) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
