use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pdfsift::export::export_csv;
use pdfsift::{Capabilities, Event, FnSink, SearchError, SearchRequest};

/// Search a folder of PDFs for text and print page-level hits
#[derive(Parser, Debug)]
#[command(name = "pdfsift", version, about)]
struct Cli {
    /// Folder containing PDFs
    folder: PathBuf,

    /// Text to find (a regular expression with --regex)
    query: String,

    /// Treat the query as a regular expression
    #[arg(long)]
    regex: bool,

    /// Match regardless of case
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Descend into subfolders
    #[arg(short, long)]
    recursive: bool,

    /// OCR pages with little or no embedded text (slow, needs tesseract and pdftoppm)
    #[arg(long)]
    include_ocr: bool,

    /// Render resolution for OCR
    #[arg(long, default_value_t = pdfsift::resolver::DEFAULT_OCR_DPI)]
    ocr_dpi: u32,

    /// Characters of context on each side of a match
    #[arg(long, default_value_t = pdfsift::snippet::DEFAULT_SNIPPET_RADIUS)]
    snippet_radius: usize,

    /// Also write results to this CSV file
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Stream every event as a JSON line instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SearchError> {
    let request = SearchRequest {
        folder:         cli.folder,
        query:          cli.query,
        recursive:      cli.recursive,
        use_regex:      cli.regex,
        ignore_case:    cli.ignore_case,
        include_ocr:    cli.include_ocr,
        ocr_dpi:        cli.ocr_dpi,
        snippet_radius: cli.snippet_radius,
        ..SearchRequest::default()
    };

    let mut builder = pdfsift::search()
        .request(request)
        .capabilities(Capabilities::detect());

    if cli.json {
        builder = builder.sink(FnSink(print_json_line));
    }

    let outcome = builder.run()?;

    if !cli.json {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for m in &outcome.matches {
            let tag = if m.used_ocr { " [OCR]" } else { "" };
            // A closed pipe (e.g. `| head`) is not an error worth reporting.
            let path = m.path.display();
            if writeln!(out, "{path} | page {}{tag} | {}", m.page, m.snippet).is_err() {
                break;
            }
        }
        for e in &outcome.errors {
            eprintln!("warning: {e}");
        }
    }

    if let Some(path) = &cli.csv {
        export_csv(path, &outcome.matches)?;
        log::info!("wrote {} match(es) to {}", outcome.matches.len(), path.display());
    }

    Ok(())
}

fn print_json_line(event: Event) {
    match event.to_json_line() {
        Ok(line) => println!("{line}"),
        Err(e) => log::warn!("could not encode event: {e}"),
    }
}
