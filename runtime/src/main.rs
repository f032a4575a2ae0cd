use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use dynjump_runtime::cli::{self, jump_cmd::JumpOptions, output};
use dynjump_runtime::dynjump::{Aggressiveness, DEFAULT_WINDOW};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dynjump",
    about = "dynjump: scroll a Bilibili dynamic feed back to a given month or day",
    version,
    after_help = "Run 'dynjump <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Preferences file (default: $DYNJUMP_PREFS or ~/.dynjump/preferences.json)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a feed page and scroll until the target period is reached
    Jump {
        /// Feed URL (e.g. "https://space.bilibili.com/<uid>/dynamic")
        url: String,
        /// Target year
        #[arg(long)]
        year: i32,
        /// Target month (1-12)
        #[arg(long)]
        month: u32,
        /// Target day of month; omit to match the whole month
        #[arg(long)]
        day: Option<u32>,
        /// Consecutive cycles without new items before giving up (1-50)
        #[arg(long)]
        max_retries: Option<u32>,
        /// Wait for content after each scroll, in milliseconds (500-10000)
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Scroll mode (normal, aggressive, extreme)
        #[arg(long)]
        aggressiveness: Option<Aggressiveness>,
        /// Extra pixels pushed past the bottom (0-10000)
        #[arg(long)]
        extra_scroll: Option<u32>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
        /// Page load timeout in milliseconds
        #[arg(long, default_value = "30000")]
        timeout: u64,
    },
    /// Scan a saved feed page once, without a browser
    Scan {
        /// Saved HTML file
        file: PathBuf,
        /// Target year
        #[arg(long)]
        year: i32,
        /// Target month (1-12)
        #[arg(long)]
        month: u32,
        /// Target day of month
        #[arg(long)]
        day: Option<u32>,
        /// Number of trailing items to inspect
        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: usize,
    },
    /// Show or change the stored scroll preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the stored preferences
    Show,
    /// Set one value (max_retries, delay_ms, aggressiveness, extra_scroll)
    Set { key: String, value: String },
    /// Forget stored values and use defaults
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    if cli.verbose {
        std::env::set_var(output::VERBOSE_ENV, "1");
    }
    if cli.no_color {
        std::env::set_var(output::NO_COLOR_ENV, "1");
    }
    cli::init_tracing();

    let prefs = cli.prefs.as_deref();
    let result = match cli.command {
        Commands::Jump {
            url,
            year,
            month,
            day,
            max_retries,
            delay_ms,
            aggressiveness,
            extra_scroll,
            headful,
            timeout,
        } => {
            cli::jump_cmd::run(JumpOptions {
                url,
                year,
                month,
                day,
                max_retries,
                delay_ms,
                aggressiveness,
                extra_scroll,
                headful,
                nav_timeout_ms: timeout,
                prefs: cli.prefs.clone(),
            })
            .await
        }
        Commands::Scan {
            file,
            year,
            month,
            day,
            window,
        } => cli::scan_cmd::run(&file, year, month, day, window).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config_cmd::run_show(prefs).await,
            ConfigAction::Set { key, value } => {
                cli::config_cmd::run_set(prefs, &key, &value).await
            }
            ConfigAction::Reset => cli::config_cmd::run_reset(prefs).await,
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "dynjump", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else if !output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
