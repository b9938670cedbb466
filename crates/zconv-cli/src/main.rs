use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
use zconv::convert::DEFAULT_ROW_TAG;
use zconv::{ConvertOptions, CsvConfig, Format};

#[derive(Debug, Parser)]
#[command(name = "zconv", version, about = "Convert between XML, JSON and CSV")]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Input format (xml, json, csv); inferred from the input extension
    #[arg(short, long, value_enum)]
    from: Option<FormatArg>,
    /// Output format (xml, json, csv)
    #[arg(short, long, value_enum)]
    to: FormatArg,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Root element name for XML output
    #[arg(long, value_name = "TAG")]
    root: Option<String>,
    /// Element name for array items directly under the XML root
    /// (`row` for CSV input)
    #[arg(long, value_name = "TAG")]
    item_tag: Option<String>,
    /// CSV field delimiter (a single ASCII character, or "tab")
    #[arg(short, long, value_name = "C", default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,
    /// CSV input has no header row, and CSV output is written without one
    #[arg(long)]
    no_header: bool,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
    /// Indent XML output by this many spaces per level
    #[arg(long, value_name = "N")]
    indent: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Xml,
    Json,
    Csv,
}

impl From<FormatArg> for Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xml => Self::Xml,
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let input_data = read_input(&args.input)?;
    let from = match args.from.map(Format::from).or_else(|| infer_format(&args.input)) {
        Some(format) => format,
        None => {
            bail!(
                "could not infer input format; pass --from or provide an input file with extension"
            );
        }
    };
    let to = Format::from(args.to);
    debug!(from = from.name(), to = to.name(), "converting input");

    let options = options(&args, from);
    let output = zconv::convert_with_options(&input_data, from, to, &options)
        .with_context(|| format!("failed to convert {} to {}", from.name(), to.name()))?;

    write_output(&args.output, output.as_bytes())?;
    Ok(())
}

fn options(args: &Args, from: Format) -> ConvertOptions {
    let mut options = ConvertOptions::default();
    if let Some(root) = &args.root {
        options.root_tag.clone_from(root);
    }
    options.xml.item_tag = match (&args.item_tag, from) {
        (Some(tag), _) => Some(tag.clone()),
        (None, Format::Csv) => Some(DEFAULT_ROW_TAG.to_string()),
        (None, _) => None,
    };
    options.xml.indent = args.indent;
    options.json.pretty = args.pretty;
    options.csv = CsvConfig::new(args.delimiter, !args.no_header);
    options
}

fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got {value:?}")),
        },
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}

fn infer_format(path: &Option<PathBuf>) -> Option<Format> {
    path.as_ref().and_then(zconv::detect_format_from_path)
}
