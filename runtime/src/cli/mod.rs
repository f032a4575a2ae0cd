//! CLI subcommand implementations for the dynjump binary.

pub mod config_cmd;
pub mod jump_cmd;
pub mod output;
pub mod scan_cmd;

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber: `RUST_LOG` plus a `dynjump` default,
/// written to stderr so stdout carries only reports.
pub fn init_tracing() {
    let default = if output::is_verbose() {
        "dynjump=debug"
    } else {
        "dynjump=info"
    };
    let directive: Directive = default
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    let filter = EnvFilter::from_default_env().add_directive(directive);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if output::is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}
