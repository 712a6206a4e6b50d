use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossterm::terminal;
use thiserror::Error;

use relative_layout::{
    FileSink, FramePreview, LayoutDocument, LayoutError, LogLevel, Logger, LoggingError,
    PreviewSettings, ResolvedLayout, ResolverConfig, WriterSink,
};

#[derive(Debug, Error)]
enum RelayoutError {
    #[error("{0}")]
    Layout(#[from] LayoutError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser)]
#[command(name = "relayout")]
#[command(about = "Resolve a relative layout document and print the element frames")]
struct Args {
    /// Path to the JSON layout document
    document: PathBuf,

    /// Print frames as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Draw an ASCII preview after the frames
    #[arg(long)]
    preview: bool,

    /// Layout units per preview cell
    #[arg(long, default_value_t = 1)]
    scale: i32,

    /// Use the current terminal size as the container size
    #[arg(long)]
    fit_terminal: bool,

    /// Emit resolver log events as JSON lines on stderr
    #[arg(long)]
    verbose: bool,

    /// Append resolver log events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("relayout: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), RelayoutError> {
    let mut document = LayoutDocument::from_path(&args.document)?;
    if args.fit_terminal {
        let (cols, rows) =
            terminal::size().map_err(|err| RelayoutError::Terminal(err.to_string()))?;
        document.width = i32::from(cols).saturating_mul(args.scale.max(1));
        document.height = i32::from(rows).saturating_mul(args.scale.max(1));
    }

    let layout = document.into_layout()?;
    let config = resolver_config(args)?;
    let outcome = layout.resolve_with(&config);
    config.log_metrics()?;
    let resolved = outcome?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        writeln!(out, "{}", resolved.to_json()?)?;
    } else {
        write_table(&mut out, &resolved)?;
    }

    if args.preview {
        writeln!(out)?;
        let preview = FramePreview::new(PreviewSettings {
            scale: args.scale,
            ..PreviewSettings::default()
        });
        preview.write_to(&mut out, &resolved, layout.size())?;
    }

    Ok(())
}

fn resolver_config(args: &Args) -> Result<ResolverConfig, RelayoutError> {
    let mut config = ResolverConfig::default();
    if let Some(path) = &args.log_file {
        config.logger = Some(Logger::new(FileSink::new(path, 0)?));
    } else if args.verbose {
        config.logger = Some(Logger::new(WriterSink::stderr()).with_min_level(LogLevel::Debug));
    }
    if config.logger.is_some() {
        config.enable_metrics();
    }
    Ok(config)
}

fn write_table(out: &mut impl Write, resolved: &ResolvedLayout) -> io::Result<()> {
    let width = resolved
        .iter()
        .map(|(id, _)| resolved.label(id).len())
        .max()
        .unwrap_or(0)
        .max("element".len());

    writeln!(
        out,
        "{:<width$}  {:>6} {:>6} {:>6} {:>6}",
        "element", "left", "top", "right", "bottom"
    )?;
    for (id, frame) in resolved.iter() {
        writeln!(
            out,
            "{:<width$}  {:>6} {:>6} {:>6} {:>6}",
            resolved.label(id),
            frame.left,
            frame.top,
            frame.right,
            frame.bottom
        )?;
    }
    Ok(())
}
