//! shellext command-line demo
//!
//! Exercises the library the way a shell host would: each subcommand makes
//! one synchronous call that runs async extension code to completion on the
//! main thread.
//!
//! # Usage
//!
//! ```bash
//! shellext quote --style DoubleQuote 'a $b'
//! shellext complete "'al" --candidates alpha,alps,beta --delay-ms 100
//! shellext completions zsh
//! ```

use std::io;

use shellext::cli::CliInterface;
use shellext::error::Result;
use shellext::logging::init_logging;

/// Application entry point
///
/// Not a tokio entry point: the executor blocks this thread and must not
/// run inside a runtime worker.
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Run the subcommand
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    init_logging(&cli.config().logging);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli.execute(&mut out)
}
