use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "userprobe")]
#[command(about = "Check whether a username exists across many web platforms")]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download the site catalog, or refresh it if the remote copy changed
    Sync,
    /// Probe every catalog site for a username
    Probe {
        /// Username to look for
        username: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_command() {
        let cli = Cli::try_parse_from(["userprobe", "probe", "alice"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Command::Probe { username } => assert_eq!(username, "alice"),
            other => panic!("expected probe, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sync_with_verbose() {
        let cli = Cli::try_parse_from(["userprobe", "sync", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Sync));
    }

    #[test]
    fn test_probe_requires_username() {
        assert!(Cli::try_parse_from(["userprobe", "probe"]).is_err());
    }
}
