//! Cnav CLI - command-line interface and protocol host

use clap::{Parser, Subcommand};
use cnav::config::{load_config, NavConfig};
use cnav::coord::Coordinate;
use cnav::engine::Engine;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cnav")]
#[command(version)]
#[command(about = "Cross-file name resolution for C source trees")]
#[command(long_about = r#"
Cnav indexes a C source tree into per-file scope graphs, links them
across #include boundaries, and answers position queries:

  cnav index --path ./src
  cnav resolve --root ./src --coord src/main.c:36:4
  cnav usages --root ./src --coord src/def1.h:0:0
  cnav serve        # line-delimited JSON protocol on stdin/stdout
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the line-delimited JSON protocol loop on stdin/stdout
    Serve,

    /// Index a source tree and report cross-link statistics
    Index {
        /// Directory to index (falls back to cnav.toml, then ".")
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Exclude pattern (regex, partial path match); repeatable
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,
    },

    /// Resolve the identifier at a coordinate to its definition
    Resolve {
        /// Directory to index first
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Query position as file:line:column (0-indexed)
        #[arg(short, long)]
        coord: String,

        /// Exclude pattern (regex, partial path match); repeatable
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,
    },

    /// List every usage of the definition at a coordinate
    Usages {
        /// Directory to index first
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Query position as file:line:column (0-indexed)
        #[arg(short, long)]
        coord: String,

        /// Exclude pattern (regex, partial path match); repeatable
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,
    },

    /// Load one file and print its scope graph
    Dump {
        /// File to load
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(None)?.unwrap_or_default();

    match cli.command {
        Commands::Serve => {
            let mut engine = Engine::new()?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            cnav::protocol::serve(&mut engine, stdin.lock(), stdout.lock())?;
        }

        Commands::Index { path, exclude } => {
            let root = pick_root(path, &config);
            let excludes = pick_excludes(exclude, &config);

            let mut engine = Engine::new()?;
            engine.load_directory(&root, &excludes);
            let stats = engine.cross_link();

            println!("Indexed {} ({} units)", root.display(), engine.unit_count());
            println!("{}", stats);
        }

        Commands::Resolve { root, coord, exclude } => {
            let root = pick_root(root, &config);
            let excludes = pick_excludes(exclude, &config);
            let coord = parse_query(&coord)?;

            let mut engine = Engine::new()?;
            engine.load_directory(&root, &excludes);
            engine.cross_link();

            match engine.resolve(&coord) {
                Some(found) => println!("{}", found),
                None => println!("not found"),
            }
        }

        Commands::Usages { root, coord, exclude } => {
            let root = pick_root(root, &config);
            let excludes = pick_excludes(exclude, &config);
            let coord = parse_query(&coord)?;

            let mut engine = Engine::new()?;
            engine.load_directory(&root, &excludes);
            engine.cross_link();

            let usages = engine.find_usages(&coord);
            if usages.is_empty() {
                println!("no usages");
            } else {
                for usage in usages {
                    println!("{}", usage);
                }
            }
        }

        Commands::Dump { file } => {
            let mut engine = Engine::new()?;
            if !engine.load_file(&file) {
                anyhow::bail!("failed to load {}", file.display());
            }
            let abs = std::fs::canonicalize(&file)?;
            if let Some(rendered) = engine.render_unit(&abs.to_string_lossy()) {
                print!("{}", rendered);
            }
        }
    }

    Ok(())
}

fn pick_root(flag: Option<PathBuf>, config: &NavConfig) -> PathBuf {
    flag.or_else(|| config.root.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn pick_excludes(flags: Vec<String>, config: &NavConfig) -> Vec<String> {
    if !flags.is_empty() {
        return flags;
    }
    config.excludes.clone().unwrap_or_default()
}

/// Parse `file:line:column`, canonicalizing the file so it matches the
/// absolute paths units are keyed by.
fn parse_query(text: &str) -> anyhow::Result<Coordinate> {
    let coord = Coordinate::parse(text)?;
    let path = std::fs::canonicalize(&coord.path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or(coord.path);
    Ok(Coordinate::new(path, coord.line, coord.column))
}
