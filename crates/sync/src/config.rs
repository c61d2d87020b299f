#![forbid(unsafe_code)]

use crate::feed::FeedSource;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) const DEFAULT_DB_PATH: &str = "/etc/pihole/gravity.db";
pub(crate) const DEFAULT_FEED_URL: &str = "https://v.firebog.net/hosts/csv.txt";

/// Sync Pi-hole adlists with the firebog CSV feed.
///
/// Adlists whose comment starts with '[' are owned by this tool: missing ones are
/// added, ones no longer published are disabled, and each is assigned to the
/// tick/std/cross group named by its tick type. Every other adlist is left alone.
#[derive(Debug, Parser)]
#[command(name = "gs_sync", version)]
pub(crate) struct Cli {
    /// The gravity.db file path
    #[arg(short, long, env = "GRAVITY_SYNC_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// CSV feed to sync from
    #[arg(long, env = "GRAVITY_SYNC_FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Read the CSV feed from a local file instead of downloading it (wins over --feed-url)
    #[arg(long)]
    pub feed_file: Option<PathBuf>,

    /// HTTP timeout for the feed download, in seconds
    #[arg(
        long,
        env = "GRAVITY_SYNC_TIMEOUT_S",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_s: u64,

    /// Compute and log the changes, then roll them back
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final report as a JSON object on stdout
    #[arg(long)]
    pub json: bool,

    /// Accept a feed with no rows (disables every managed adlist)
    #[arg(long)]
    pub allow_empty: bool,
}

impl Cli {
    /// `--feed-file` takes precedence over any feed URL, including one set through
    /// `GRAVITY_SYNC_FEED_URL`.
    pub(crate) fn feed_source(&self) -> FeedSource {
        match &self.feed_file {
            Some(path) => FeedSource::File(path.clone()),
            None => FeedSource::Http {
                url: self.feed_url.clone(),
                timeout: Duration::from_secs(self.timeout_s),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "gs_sync",
            "--db",
            "/tmp/gravity.db",
            "--feed-url",
            "https://lists.example/csv.txt",
            "--timeout-s",
            "5",
            "--dry-run",
            "--json",
        ])
        .expect("parse");
        assert_eq!(cli.db, PathBuf::from("/tmp/gravity.db"));
        assert!(cli.dry_run);
        assert!(cli.json);
        assert!(!cli.allow_empty);
        assert_eq!(
            cli.feed_source(),
            FeedSource::Http {
                url: "https://lists.example/csv.txt".to_string(),
                timeout: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn feed_file_selects_file_source() {
        let cli = Cli::try_parse_from(["gs_sync", "-d", "g.db", "--feed-file", "feed.csv"])
            .expect("parse");
        assert_eq!(cli.feed_source(), FeedSource::File(PathBuf::from("feed.csv")));
    }

    #[test]
    fn feed_file_wins_over_explicit_url() {
        let cli = Cli::try_parse_from([
            "gs_sync",
            "--feed-url",
            "https://x",
            "--feed-file",
            "feed.csv",
        ])
        .expect("parse");
        assert_eq!(cli.feed_url, "https://x");
        assert_eq!(cli.feed_source(), FeedSource::File(PathBuf::from("feed.csv")));
    }

    const ENV_CHILD_MARKER: &str = "GS_SYNC_ENV_CHILD";
    const ENV_FEED_URL: &str = "https://env.example/csv.txt";

    // The environment is only set on a re-executed copy of this test binary, so the
    // parent process never mutates its own environment.
    #[test]
    fn feed_file_wins_over_env_feed_url() {
        if std::env::var_os(ENV_CHILD_MARKER).is_some() {
            let cli = Cli::try_parse_from(["gs_sync", "--feed-file", "feed.csv"]).expect("parse");
            assert_eq!(cli.feed_url, ENV_FEED_URL);
            assert_eq!(cli.feed_source(), FeedSource::File(PathBuf::from("feed.csv")));
            return;
        }

        let exe = std::env::current_exe().expect("test binary path");
        let output = std::process::Command::new(exe)
            .args([
                "--exact",
                "config::tests::feed_file_wins_over_env_feed_url",
                "--test-threads=1",
            ])
            .env(ENV_CHILD_MARKER, "1")
            .env("GRAVITY_SYNC_FEED_URL", ENV_FEED_URL)
            .env_remove("GRAVITY_SYNC_DB")
            .env_remove("GRAVITY_SYNC_TIMEOUT_S")
            .output()
            .expect("spawn test binary");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            output.status.success(),
            "child failed:\n{stdout}\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(stdout.contains("1 passed"), "child ran no test:\n{stdout}");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Cli::try_parse_from(["gs_sync", "--timeout-s", "0"]).expect_err("range");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
