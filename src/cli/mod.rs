//! Command-line interface for shellext
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Dispatch of the demo subcommands to the library

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapter::{CompletionAdapter, WordListCompleter};
use crate::completion::{BoundParameters, CommandAst};
use crate::config::{Config, LogLevel};
use crate::error::{Result, ShellextError};
use crate::quoting::QuotationStyle;

pub mod completion;

/// Async shell extension toolkit
#[derive(Parser, Debug)]
#[command(
    name = "shellext",
    version,
    about = "Async extension toolkit for synchronous shell hosts",
    long_about = "Exercises the shellext library from the command line: token quoting,
time-boxed argument completion and configuration handling."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for shellext
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quote text in a quotation style
    Quote {
        /// Style name (None, SingleQuote, DoubleQuote) or quote character
        #[arg(short = 's', long, value_name = "STYLE", default_value = "SingleQuote")]
        style: String,

        /// Text to quote
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Show the quotation style and interior of a token
    Unquote {
        /// Raw token, possibly quoted
        #[arg(value_name = "TOKEN", allow_hyphen_values = true)]
        token: String,
    },

    /// Complete a word against a candidate list
    Complete {
        /// Word being completed, possibly with an opening quote
        #[arg(value_name = "WORD", allow_hyphen_values = true)]
        word: String,

        /// Comma-separated candidate values
        #[arg(long, value_name = "LIST", value_delimiter = ',')]
        candidates: Vec<String>,

        /// Delay before each candidate, imitating a slow source
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Completion time box, overriding configuration
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion script
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Create a CLI interface over already-loaded configuration
    pub fn with_config(args: CliArgs, mut config: Config) -> Self {
        Self::apply_args_to_config(&mut config, &args);
        Self { args, config }
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;

        // Validate loaded configuration
        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        // Apply CLI arguments to override config values
        Self::apply_args_to_config(&mut config, args);

        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Explicit configuration file path, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.args.config_file.as_deref()
    }

    /// Apply CLI arguments to configuration
    ///
    /// # Arguments
    /// * `config` - Configuration to modify
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };

        if let Commands::Complete {
            timeout_ms: Some(timeout_ms),
            ..
        } = args.command
        {
            config.completion.timeout_ms = timeout_ms;
        }
    }

    /// Run the selected subcommand, writing its output to `out`
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn execute(&self, out: &mut dyn Write) -> Result<()> {
        match &self.args.command {
            Commands::Quote { style, text } => {
                let style = QuotationStyle::parse(Some(style.as_str()))?;
                writeln!(out, "{}", style.quote(text))?;
            }
            Commands::Unquote { token } => {
                let (style, interior) = QuotationStyle::extract(token);
                writeln!(out, "{}\t{}", style, interior)?;
            }
            Commands::Complete {
                word,
                candidates,
                delay_ms,
                json,
                ..
            } => self.complete(out, word, candidates, *delay_ms, *json)?,
            Commands::Completions { shell } => completion::generate_completion(shell, out)?,
            Commands::Config { show, validate } => {
                self.handle_config_command(out, *show, *validate)?
            }
        }
        Ok(())
    }

    /// Drive a word-list completer through the completion adapter
    fn complete(
        &self,
        out: &mut dyn Write,
        word: &str,
        candidates: &[String],
        delay_ms: Option<u64>,
        json: bool,
    ) -> Result<()> {
        let mut completer = WordListCompleter::new(candidates.iter().map(|c| c.trim()));
        if let Some(delay_ms) = delay_ms {
            completer = completer.with_delay(Duration::from_millis(delay_ms));
        }

        let adapter = CompletionAdapter::with_config(completer, self.config.completion.clone());
        let ast = CommandAst::new(format!("shellext complete {word}"));
        let bound = BoundParameters::new();
        let results = adapter.complete_argument("shellext", "Word", word, &ast, &bound)?;

        if json {
            let text = serde_json::to_string_pretty(&results).map_err(ShellextError::operation)?;
            writeln!(out, "{}", text)?;
        } else {
            for result in &results {
                writeln!(out, "{}", result.completion_text)?;
            }
        }
        Ok(())
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    fn handle_config_command(&self, out: &mut dyn Write, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file(out)?;
        }

        if show {
            self.show_config(out)?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self, out: &mut dyn Write) -> Result<()> {
        let path = self.get_config_path();
        writeln!(out, "Validating configuration file: {}", path.display())?;

        if !path.exists() {
            writeln!(out, "Configuration file does not exist")?;
            return Ok(());
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(_) => writeln!(out, "Configuration is valid")?,
                Err(e) => writeln!(out, "Configuration validation failed: {}", e)?,
            },
            Err(e) => writeln!(out, "Failed to load configuration: {}", e)?,
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "# Configuration file: {}", self.get_config_path().display())?;
        write!(out, "{}", self.config.to_toml_string()?)?;
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}
