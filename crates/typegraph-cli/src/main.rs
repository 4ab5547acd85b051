use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use typegraph::{TypegraphOptions, run_main};
use typegraph_dot::ExportFormat;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Graphviz DOT, rendered afterwards unless --no-render
    Dot,
    /// JSON document, never rendered
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Dot => ExportFormat::Dot,
            Format::Json => ExportFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "typegraph",
    about = "typegraph: draw the struct and interface graph of Go packages",
    version
)]
pub struct Cli {
    /// Packages to scan: import paths, or directories starting with '.'
    #[arg(value_name = "NAMESPACE", default_value = ".")]
    namespaces: Vec<String>,

    /// Follow types matching NAMESPACE:TYPE regular expressions (repeatable)
    #[arg(long = "include", value_name = "PATTERN", action = clap::ArgAction::Append)]
    includes: Vec<String>,

    /// Skip types matching NAMESPACE:TYPE regular expressions (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    excludes: Vec<String>,

    /// Keep entities that have no edges
    #[arg(long = "includeOrphans", alias = "include-orphans", default_value_t = false)]
    include_orphans: bool,

    /// Directory to run in; go.mod is searched from here upwards
    #[arg(short = 'C', long = "dir", value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Graph description file
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "typegraph.dot")]
    output: PathBuf,

    /// Description format
    #[arg(long, value_enum, default_value_t = Format::Dot)]
    format: Format,

    /// Graphviz output format passed as -T
    #[arg(short = 'T', long = "render-format", value_name = "FMT", default_value = "svg")]
    render_format: String,

    /// Write the description only, do not run Graphviz
    #[arg(long = "no-render", default_value_t = false)]
    no_render: bool,

    /// Graphviz layout program
    #[arg(long = "renderer", value_name = "PROGRAM", default_value = "dot")]
    renderer: String,

    /// Link attached to the graph caption
    #[arg(long = "url", value_name = "URL")]
    url: Option<String>,
}

impl From<Cli> for TypegraphOptions {
    fn from(args: Cli) -> Self {
        TypegraphOptions {
            namespaces: args.namespaces,
            includes: args.includes,
            excludes: args.excludes,
            include_orphans: args.include_orphans,
            dir: args.dir,
            output: args.output,
            format: args.format.into(),
            render_format: args.render_format,
            render: !args.no_render,
            render_program: args.renderer,
            url: args.url,
        }
    }
}

pub fn main() -> ExitCode {
    let args = Cli::parse();

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let opts = TypegraphOptions::from(args);
    match run_main(&opts) {
        Ok(report) => {
            tracing::info!(
                entities = report.graph.len(),
                edges = report.graph.edges().len(),
                "complete"
            );
            if let Some(artifact) = report.artifact {
                eprintln!("Wrote {}", artifact.display());
            } else {
                eprintln!("Wrote {}", report.description.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            tracing::error!(error = %e, "execution failed");
            ExitCode::from(2)
        }
    }
}
