//! Command-line interface for the laneflow utility
//!
//! Lays out graph descriptions into positioned swimlane diagrams.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use laneflow::core::logging::init_logging;
use laneflow::{layout_with_config, parse_description, Direction, EngineConfig, NodeKind};

/// Laneflow - Lay out swimlane process diagrams
#[derive(Parser)]
#[command(name = "laneflow")]
#[command(about = "Lay out process flow descriptions into swimlane diagram geometry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Flow direction inside lanes
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum DirectionChoice {
    /// Top to bottom
    #[default]
    Tb,
    /// Left to right
    Lr,
}

impl From<DirectionChoice> for Direction {
    fn from(value: DirectionChoice) -> Self {
        match value {
            DirectionChoice::Tb => Direction::TopBottom,
            DirectionChoice::Lr => Direction::LeftRight,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lay out a graph description and print the positioned diagram as JSON
    Layout {
        /// Input file containing the description (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the laid-out diagram (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Flow direction
        #[arg(short, long, value_enum, default_value_t = DirectionChoice::Tb)]
        direction: DirectionChoice,

        /// JSON file overriding spacing and container constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that a description parses and report what it contains
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List node kinds with their default dimensions
    Kinds {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Main CLI application
pub struct LaneflowApp {
    config: EngineConfig,
}

impl LaneflowApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new application instance with an engine config
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("LANEFLOW_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("LANEFLOW_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Laneflow v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Layout {
                input,
                output,
                direction,
                config,
                pretty,
            } => {
                if let Some(path) = config {
                    self.config = Self::load_config(&path)?;
                }
                self.layout_command(input, output, direction.into(), pretty, cli.verbose)
            }
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
            Commands::Kinds { json } => self.kinds_command(json, cli.verbose),
        }
    }

    /// Read an engine configuration file
    pub fn load_config(path: &Path) -> Result<EngineConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = EngineConfig::from_json(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Lay out `content` and serialize the resulting state
    pub fn layout_to_json(&self, content: &str, direction: Direction, pretty: bool) -> Result<String> {
        let state = parse_description(content)?.into_state();
        let laid_out = layout_with_config(&state.nodes, &state.connections, direction, &self.config);
        info!(
            nodes = laid_out.nodes.len(),
            connections = laid_out.connections.len(),
            "Diagram laid out"
        );
        let json = if pretty {
            serde_json::to_string_pretty(&laid_out)?
        } else {
            serde_json::to_string(&laid_out)?
        };
        Ok(json)
    }

    /// Handle the layout command
    fn layout_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        direction: Direction,
        pretty: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let json = self.layout_to_json(&content, direction, pretty)?;

        if verbose {
            eprintln!("Laid out diagram ({})", direction);
        }

        self.write_output(output, &json)
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match parse_description(&content) {
            Ok(description) => {
                let edges = description.edges.len();
                let state = description.into_state();
                let count = |kind: NodeKind| state.nodes.iter().filter(|n| n.kind == kind).count();
                let pools = count(NodeKind::Pool);
                let lanes = count(NodeKind::Lane);
                println!(
                    "✓ Valid description: {} nodes, {} connections, {} pools, {} lanes",
                    state.nodes.len() - pools - lanes,
                    state.connections.len(),
                    pools,
                    lanes
                );
                if state.connections.len() < edges {
                    println!(
                        "  {} edge(s) dropped: self-loop or unknown endpoint",
                        edges - state.connections.len()
                    );
                }
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid description: {}", e);
                Err(anyhow!(e))
            }
        }
    }

    /// Handle the kinds command
    fn kinds_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing node kinds");
        }

        if json {
            let kinds: Vec<serde_json::Value> = NodeKind::ALL
                .iter()
                .map(|kind| {
                    let size = kind.dimensions();
                    serde_json::json!({
                        "name": kind.as_str(),
                        "width": size.width,
                        "height": size.height,
                        "container": kind.is_container(),
                    })
                })
                .collect();
            let listing = serde_json::json!({
                "kinds": kinds,
                "total": NodeKind::ALL.len()
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Node kinds:");
            for kind in NodeKind::ALL {
                let size = kind.dimensions();
                let note = if kind.is_container() { "  (sized by content)" } else { "" };
                println!(
                    "  {:<18} {:>4} x {:<4}{}",
                    kind.as_str(),
                    size.width,
                    size.height,
                    note
                );
            }
            println!();
            println!("Total: {} node kinds", NodeKind::ALL.len());
        }

        Ok(())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                if content.is_empty() || content.ends_with('\n') {
                    print!("{}", content);
                } else {
                    println!("{}", content);
                }
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for LaneflowApp {
    fn default() -> Self {
        Self::new()
    }
}
