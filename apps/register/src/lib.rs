//! # Balcão Register Library
//!
//! Application-state container for one register: the Sale Draft, the cash
//! ledger and the configuration, plus the commands a front end invokes.
//!
//! ## Module Organization
//! ```text
//! balcao_register/
//! ├── lib.rs          ◄─── You are here (logging setup & run)
//! ├── cli.rs          ◄─── Line-oriented terminal front end
//! ├── state/
//! │   ├── mod.rs      ◄─── RegisterState
//! │   ├── cart.rs     ◄─── Sale Draft behind a mutex
//! │   ├── cash.rs     ◄─── Cash ledger behind a mutex
//! │   └── config.rs   ◄─── register.toml + BALCAO_* overrides
//! ├── commands/
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── discount.rs ◄─── Discounts and cascade preview
//! │   ├── cash.rs     ◄─── Drawer session
//! │   ├── sale.rs     ◄─── Sale completion
//! │   └── config.rs   ◄─── Configuration retrieval
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::io;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Args;
use state::{RegisterConfig, RegisterState};

/// Runs the terminal register until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Register Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ───► stderr, RUST_LOG or info,balcao=debug      │
/// │                                                                         │
/// │  2. Load Configuration ───► --config path or per-user register.toml    │
/// │     • BALCAO_* environment overrides                                    │
/// │     • Falls back to defaults on any error                               │
/// │                                                                         │
/// │  3. Initialize State ─────► empty draft, in-memory cash ledger         │
/// │                                                                         │
/// │  4. Serve ────────────────► stdin lines in, JSON lines out             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> io::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = RegisterConfig::load_or_default(args.config.as_deref());
    info!(
        store = %config.store.name,
        register_id = %config.register.id,
        "Starting Balcão register"
    );

    let state = RegisterState::in_memory(config);
    let stdin = io::stdin();
    cli::serve(&state, stdin.lock(), io::stdout().lock())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr; stdout carries only responses.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages everywhere
/// - `RUST_LOG=balcao_core=trace` - Trace the core only
/// - Default: `info,balcao=debug`
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,balcao=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
