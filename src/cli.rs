use clap::{Parser, Subcommand};

/// Command-line surface for the crawler.
#[derive(Parser, Debug)]
#[command(name = "scopecrawl")]
#[command(about = "A scoped, politeness-aware web crawler")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl from seed URLs, resuming from persisted state when present.
    Crawl {
        #[arg(short, long, required = true, help = "Seed URL (repeatable)")]
        seed: Vec<String>,

        #[arg(
            short,
            long,
            required = true,
            help = "Allowed domain; subdomains are included (repeatable)"
        )]
        domain: Vec<String>,

        #[arg(
            long,
            default_value = "./data",
            help = "Directory for the frontier store, analytics, and logs"
        )]
        data_dir: String,

        #[arg(short, long, default_value = "8", help = "Concurrent worker tasks")]
        workers: usize,

        #[arg(
            short,
            long,
            default_value = "0.5",
            help = "Minimum seconds between requests to the same domain"
        )]
        politeness: f64,

        #[arg(
            short,
            long,
            default_value = "Scopecrawl/0.1",
            help = "User agent string for requests"
        )]
        user_agent: String,

        #[arg(short, long, default_value = "20", help = "Request timeout in seconds")]
        timeout: u64,

        #[arg(
            long,
            default_value_t = 300,
            help = "Seconds between analytics snapshots (0 disables periodic saves)"
        )]
        save_interval: u64,

        #[arg(
            long,
            help = "Discard any persisted frontier and analytics, start from seeds"
        )]
        restart: bool,
    },

    /// Print the analytics snapshot accumulated by previous crawls.
    Report {
        #[arg(
            long,
            default_value = "./data",
            help = "Directory containing crawl state"
        )]
        data_dir: String,

        #[arg(long, default_value = "50", help = "How many top words to print")]
        top: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_command_minimal() {
        let cli = Cli::try_parse_from([
            "scopecrawl",
            "crawl",
            "--seed",
            "https://ics.uci.edu/",
            "--domain",
            "ics.uci.edu",
        ]);
        assert!(cli.is_ok());
        match cli.unwrap().command {
            Commands::Crawl {
                seed,
                domain,
                workers,
                politeness,
                restart,
                ..
            } => {
                assert_eq!(seed, vec!["https://ics.uci.edu/"]);
                assert_eq!(domain, vec!["ics.uci.edu"]);
                assert_eq!(workers, 8); // default
                assert_eq!(politeness, 0.5); // default
                assert!(!restart);
            }
            _ => panic!("Expected Crawl command"),
        }
    }

    #[test]
    fn test_crawl_command_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "scopecrawl",
            "crawl",
            "--seed",
            "https://ics.uci.edu/",
            "--seed",
            "https://cs.uci.edu/",
            "--domain",
            "ics.uci.edu",
            "--domain",
            "cs.uci.edu",
            "--workers",
            "4",
            "--politeness",
            "2",
            "--restart",
        ]);
        assert!(cli.is_ok());
        match cli.unwrap().command {
            Commands::Crawl {
                seed,
                domain,
                workers,
                politeness,
                restart,
                ..
            } => {
                assert_eq!(seed.len(), 2);
                assert_eq!(domain.len(), 2);
                assert_eq!(workers, 4);
                assert_eq!(politeness, 2.0);
                assert!(restart);
            }
            _ => panic!("Expected Crawl command"),
        }
    }

    #[test]
    fn test_crawl_requires_seed_and_domain() {
        let cli = Cli::try_parse_from(["scopecrawl", "crawl", "--domain", "ics.uci.edu"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["scopecrawl", "crawl", "--seed", "https://ics.uci.edu/"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_report_command() {
        let cli = Cli::try_parse_from(["scopecrawl", "report", "--data-dir", "./crawl", "--top", "10"]);
        assert!(cli.is_ok());
        match cli.unwrap().command {
            Commands::Report { data_dir, top } => {
                assert_eq!(data_dir, "./crawl");
                assert_eq!(top, 10);
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_invalid_command() {
        let cli = Cli::try_parse_from(["scopecrawl", "invalid-command"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_help_does_not_panic() {
        let cli = Cli::try_parse_from(["scopecrawl", "--help"]);
        assert!(cli.is_err());
        assert_eq!(
            cli.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayHelp
        );
    }
}
