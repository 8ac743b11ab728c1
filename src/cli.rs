use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::models::Priority;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Task API base URL (overrides config and TASKDESK_API__BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Log level filter, e.g. "debug" or "warn"
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch TUI interface
    Tui {
        /// Route to open first, e.g. /example/tasks/2 or /example/about
        #[arg(long, value_name = "PATH")]
        open: Option<String>,
    },
    /// List all tasks
    List,
    /// Create a task
    Add {
        /// Task title (at least 3 characters)
        #[arg(short, long)]
        title: String,
        /// Due date as YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,
        /// Free-form description
        #[arg(short = 'D', long)]
        description: Option<String>,
        #[arg(short, long, value_enum, default_value_t = Priority::Med)]
        priority: Priority,
    },
    /// Show a single task
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn log_level(&self) -> Option<String> {
        if self.verbose {
            Some("debug".to_string())
        } else {
            self.log_level.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_defaults_priority_to_med() {
        let cli = Cli::try_parse_from(["taskdesk", "add", "--title", "Buy milk"]).unwrap();
        match cli.command {
            Some(Commands::Add {
                title,
                date,
                description,
                priority,
            }) => {
                assert_eq!(title, "Buy milk");
                assert_eq!(date, None);
                assert_eq!(description, None);
                assert_eq!(priority, Priority::Med);
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["taskdesk", "list", "--base-url", "http://api", "-v"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://api"));
        assert_eq!(cli.log_level().as_deref(), Some("debug"));
    }

    #[test]
    fn tui_accepts_start_route() {
        let cli = Cli::try_parse_from(["taskdesk", "tui", "--open", "/example/about"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Tui { open: Some(ref path) }) if path == "/example/about"
        ));
    }

    #[test]
    fn priority_accepts_lowercase_names() {
        let cli =
            Cli::try_parse_from(["taskdesk", "add", "-t", "Pay rent", "-p", "high"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Add { priority: Priority::High, .. })
        ));
    }
}
