use anyhow::Result;
use clap::{Parser, Subcommand};

use crm_audit::cli::{handle_diff_command, handle_history_command, DiffArgs, HistoryArgs};
use crm_audit::config::{AuditPaths, Settings};
use crm_audit::AuditResult;

#[derive(Parser)]
#[command(
    name = "crm-audit",
    version,
    about = "Human-readable audit trails for CRM entities",
    long_about = "crm-audit compares snapshots of CRM records and renders their \
                  audit history, showing only the edits that matter: bookkeeping \
                  fields, cleared values, and system-filled values are left out."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the changes between two snapshots of a record
    Diff(DiffArgs),

    /// Show the audit timeline of an entity
    #[command(alias = "log")]
    History(HistoryArgs),

    /// Write default settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    crm_audit::logging::init(cli.verbose);

    let command = match cli.command {
        // Comparing two snapshots does not need a working config directory
        Some(Commands::Diff(args)) => {
            let settings = load_settings().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "using default settings");
                Settings::default()
            });
            handle_diff_command(&settings, args)?;
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("crm-audit - Human-readable audit trails for CRM entities");
            println!();
            println!("Run 'crm-audit --help' for usage information.");
            return Ok(());
        }
    };

    let paths = AuditPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match command {
        Commands::History(args) => handle_history_command(&settings, args)?,
        Commands::Init => {
            settings.save(&paths)?;
            println!("Settings written to: {}", paths.settings_file().display());
        }
        Commands::Config => {
            println!("crm-audit Configuration");
            println!("=======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Timestamp format: {}", settings.timestamp_format);
            println!("  Time zone:        {:?}", settings.time_zone);
            println!("  Diff format:      {}", settings.diff_format);
        }
        Commands::Diff(args) => handle_diff_command(&settings, args)?,
    }

    Ok(())
}

fn load_settings() -> AuditResult<Settings> {
    let paths = AuditPaths::new()?;
    Settings::load_or_create(&paths)
}
