use clap::{Parser, Subcommand};
use std::path::PathBuf;

use turnout::settings::{SettingsFile, SettingsStore};

#[derive(Parser)]
#[command(name = "turnout-cli")]
#[command(about = "Switch maintenance mode on and off", long_about = None)]
struct Cli {
    /// Application root containing tmp/maintenance.yml.
    #[arg(short, long, default_value = ".")]
    app_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable maintenance mode
    Start {
        /// Message shown to intercepted clients (HTML allowed)
        #[arg(long)]
        reason: Option<String>,

        /// Regex for paths that stay reachable; repeatable
        #[arg(long = "allowed-path")]
        allowed_paths: Vec<String>,

        /// IP address or CIDR block that stays unaffected; repeatable
        #[arg(long = "allowed-ip")]
        allowed_ips: Vec<String>,
    },
    /// Disable maintenance mode
    End,
    /// Show whether maintenance mode is on, and its settings
    Status,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = SettingsStore::new(&cli.app_root);

    match cli.command {
        Commands::Start {
            reason,
            allowed_paths,
            allowed_ips,
        } => {
            let file = SettingsFile {
                allowed_paths: non_empty(allowed_paths),
                allowed_ips: non_empty(allowed_ips),
                reason: reason.map(serde_yaml::Value::String),
            };
            store.enable(&file)?;
            println!("Maintenance mode on ({})", store.path().display());
        }
        Commands::End => {
            if store.disable()? {
                println!("Maintenance mode off");
            } else {
                println!("Maintenance mode was not on");
            }
        }
        Commands::Status => match store.read_file()? {
            Some(file) => {
                println!("Maintenance mode on ({})", store.path().display());
                print!("{}", serde_yaml::to_string(&file)?);
            }
            None => println!("Maintenance mode off"),
        },
    }

    Ok(())
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
