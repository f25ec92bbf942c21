#![forbid(unsafe_code)]

//! Ekudden CLI — Canonical XML 1.0.

use ekudden_c14n::{C14nMode, C14nOptions, Canonicalizer};
use ekudden_core::{Error, Result};
use ekudden_xml::Document;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "ekudden",
    about = "Ekudden — Pure Rust Canonical XML 1.0",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize an XML document or one of its elements
    C14n {
        /// Input XML file
        file: PathBuf,

        /// Keep comments (C14N 1.0 #WithComments)
        #[arg(long = "with-comments")]
        with_comments: bool,

        /// Canonicalize only the first element with this local name
        #[arg(short = 'e', long)]
        element: Option<String>,

        /// Namespace URI of --element (default: no namespace)
        #[arg(long, default_value = "")]
        ns: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List supported canonicalization algorithms
    Algorithms,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::C14n {
            file,
            with_comments,
            element,
            ns,
            output,
            verbose,
        } => {
            init_logging(verbose);
            cmd_c14n(file, with_comments, element, ns, output)
        }
        Commands::Algorithms => cmd_algorithms(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_c14n(
    file: PathBuf,
    with_comments: bool,
    element: Option<String>,
    ns: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let xml = read_file(&file)?;
    let doc = Document::parse(&xml)?;
    let mode = if with_comments {
        C14nMode::InclusiveWithComments
    } else {
        C14nMode::Inclusive
    };

    let (node, options) = match element {
        Some(name) => {
            let node = doc.find_element(&ns, &name).ok_or_else(|| {
                Error::XmlStructure(format!("no element {{{ns}}}{name} in {}", file.display()))
            })?;
            let options =
                C14nOptions::new().with_ancestor_namespaces(doc.ancestor_namespaces(node));
            (node, options)
        }
        None => (doc.root(), C14nOptions::default()),
    };

    tracing::debug!(file = %file.display(), algorithm = mode.uri(), "canonicalizing file");
    let canonical = Canonicalizer::new(mode).canonicalize(&doc, node, &options)?;
    write_output(output, canonical.as_bytes())
}

fn cmd_algorithms() -> Result<()> {
    println!("Supported canonicalization:");
    for mode in C14nMode::all() {
        println!("  {}", mode.uri());
    }
    Ok(())
}

// ── Utility functions ────────────────────────────────────────────────

fn read_file(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), "cannot read input");
        Error::Io(e)
    })
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(p) => std::fs::write(&p, data).map_err(|e| {
            tracing::error!(path = %p.display(), "cannot write output");
            Error::Io(e)
        }),
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
