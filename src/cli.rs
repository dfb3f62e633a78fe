use clap::Parser;
use digester::config::{Config, HumanDuration};
use digester::Algorithm;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "digester")]
#[command(about = "Fetch URLs concurrently and print the digest of each response body", long_about = None)]
pub struct Cli {
    /// Number of concurrent requests; unset or <= 0 uses the configured default
    #[arg(short, long, allow_negative_numbers = true)]
    pub parallel: Option<i64>,

    /// Per-request timeout (e.g. "750ms", "5s")
    #[arg(short, long)]
    pub timeout: Option<HumanDuration>,

    /// Digest algorithm applied to each body
    #[arg(short, long, value_enum)]
    pub algorithm: Option<Algorithm>,

    /// Configuration file (defaults to $DIGESTER_CONFIG or config/digester.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print results sorted by URL
    #[arg(long)]
    pub sorted: bool,

    /// URLs to fetch
    pub urls: Vec<String>,
}

impl Cli {
    /// Layer command-line flags over loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(parallel) = self.parallel {
            config.run.parallel = parallel;
        }
        if let Some(timeout) = self.timeout {
            config.run.request_timeout = timeout;
        }
        if let Some(algorithm) = self.algorithm {
            config.run.algorithm = algorithm;
        }
    }
}

/// One `"<url>: <result>"` line per entry
pub fn render(output: &HashMap<String, String>, sorted: bool) -> Vec<String> {
    let mut entries: Vec<(&String, &String)> = output.iter().collect();
    if sorted {
        entries.sort_by(|a, b| a.0.cmp(b.0));
    }

    entries
        .into_iter()
        .map(|(url, result)| format!("{}: {}", url, result))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_and_urls() {
        let cli = Cli::parse_from([
            "digester",
            "--parallel",
            "3",
            "--timeout",
            "250ms",
            "--algorithm",
            "sha256",
            "http://a.test",
            "http://b.test",
        ]);

        assert_eq!(cli.parallel, Some(3));
        assert_eq!(cli.timeout, Some(HumanDuration::from_millis(250)));
        assert_eq!(cli.algorithm, Some(Algorithm::Sha256));
        assert_eq!(cli.urls, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_negative_parallel_falls_back_to_default() {
        let cli = Cli::parse_from(["digester", "--parallel", "-2", "http://a.test"]);
        let mut config = Config::default();
        config.run.parallel = 4;

        cli.apply(&mut config);
        config.normalize();

        assert_eq!(config.parallel().get(), 10);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let cli = Cli::parse_from(["digester", "http://a.test"]);
        let mut config = Config::default();
        config.run.parallel = 4;

        cli.apply(&mut config);

        assert_eq!(config.run.parallel, 4);
        assert_eq!(config.run.algorithm, Algorithm::Md5);
        assert!(!cli.sorted);
    }

    #[test]
    fn test_render_sorted() {
        let output = HashMap::from([
            ("http://b.test".to_string(), "failed: remote returned rsp code 500".to_string()),
            ("http://a.test".to_string(), "d41d8cd98f00b204e9800998ecf8427e".to_string()),
        ]);

        assert_eq!(
            render(&output, true),
            vec![
                "http://a.test: d41d8cd98f00b204e9800998ecf8427e",
                "http://b.test: failed: remote returned rsp code 500",
            ]
        );
    }
}
