use clap::Parser;
use kbo_core::{FreshnessPolicy, Result, TEAMS};
use kbo_scrapers::cli::{handle_command, ScraperArgs, ScraperCommands as KboScraperCommands};
use kbo_scrapers::logging::init_logging;
use kbo_scrapers::{ScrapeConfig, ScraperManager};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Parses `90`, `5m`, `1h30m` and the like. A bare number means seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let spec: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if spec.is_empty() {
            return Err("Duration must include a number".to_string());
        }

        let mut total: u64 = 0;
        let mut rest = spec.as_str();
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Expected a number before {:?}", rest));
            }
            let amount: u64 = rest[..digits]
                .parse()
                .map_err(|_| format!("Number too large in duration: {}", &rest[..digits]))?;
            rest = &rest[digits..];

            let unit = rest.chars().next();
            let scale = match unit {
                None | Some('s') => 1,
                Some('m') => 60,
                Some('h') => 60 * 60,
                Some('d') => 24 * 60 * 60,
                Some(other) => return Err(format!("Invalid duration unit: {}", other)),
            };
            if let Some(unit) = unit {
                rest = &rest[unit.len_utf8()..];
            }

            total = amount
                .checked_mul(scale)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(|| format!("Duration out of range: {}", s))?;
        }

        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "KBO community hot issue monitor", long_about = None)]
pub struct Cli {
    /// Maximum post age in whole days
    #[arg(long, global = true, default_value_t = 2)]
    window_days: u32,
    /// Only keep posts dated today (overrides --window-days)
    #[arg(long, global = true)]
    same_day: bool,
    /// Drop posts whose timestamp cannot be read instead of showing them
    #[arg(long, global = true)]
    fail_closed: bool,
    /// Accept posts dated up to this many days in the future
    #[arg(long, global = true, default_value_t = 0)]
    future_tolerance_days: u32,
    /// Posts shown per site
    #[arg(long, global = true, default_value_t = 3)]
    limit: usize,
    /// Per-site fetch timeout (e.g. 10s)
    #[arg(long, global = true, default_value = "10s")]
    timeout: HumanDuration,
    /// How long a site listing stays cached (e.g. 5m)
    #[arg(long, global = true, default_value = "5m")]
    cache_ttl: HumanDuration,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Query the community sites
    Scrape {
        #[command(subcommand)]
        command: ScraperCommands,
    },
    /// List the supported teams
    Teams,
    /// Serve the web dashboard
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ScraperCommands {
    Issues {
        /// Team slug, name or keyword (e.g. hanwha, 한화)
        team: String,
        #[arg(long)]
        site: Option<String>,
        #[arg(long)]
        json: bool,
        /// Refresh periodically with the specified interval (e.g. 5m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    List,
    Classify {
        raw: String,
        #[arg(long)]
        now: Option<String>,
    },
}

impl Cli {
    fn scrape_config(&self) -> ScrapeConfig {
        let policy = if self.same_day {
            FreshnessPolicy::same_day()
        } else {
            FreshnessPolicy::default().with_window_days(self.window_days)
        };
        ScrapeConfig {
            policy: policy
                .with_unparseable_default(!self.fail_closed)
                .with_future_tolerance_days(self.future_tolerance_days),
            limit: self.limit,
            timeout: self.timeout.0,
            cache_ttl: self.cache_ttl.0,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.scrape_config();
    info!(
        "🗓️ Freshness window {} day(s), {} per site, timeout {:?}",
        config.policy.window_days, config.limit, config.timeout
    );
    let manager = Arc::new(ScraperManager::new(config)?);

    match cli.command {
        Commands::Teams => {
            for team in TEAMS.iter() {
                println!("{:<8} {} (DC: {}, 검색어: {})", team.slug, team.name, team.dc_id, team.keyword);
            }
        }
        Commands::Serve { addr } => {
            kbo_web::serve(addr, kbo_web::AppState::new(manager)).await?;
        }
        Commands::Scrape { command } => match command {
            ScraperCommands::Issues { team, site, json, interval } => {
                let args = ScraperArgs {
                    command: KboScraperCommands::Issues { team, site, json },
                };

                if let Some(interval) = interval {
                    info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                    loop {
                        if let Err(e) = handle_command(args.clone(), &manager).await {
                            error!("Error during scrape: {}", e);
                        }
                        tokio::time::sleep(interval.0).await;
                    }
                } else {
                    handle_command(args, &manager).await?;
                }
            }
            ScraperCommands::List => {
                let args = ScraperArgs {
                    command: KboScraperCommands::List,
                };
                handle_command(args, &manager).await?;
            }
            ScraperCommands::Classify { raw, now } => {
                let args = ScraperArgs {
                    command: KboScraperCommands::Classify { raw, now },
                };
                handle_command(args, &manager).await?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("10s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(10));
        assert_eq!("5m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(300));
        assert_eq!(
            "1h15m30s".parse::<HumanDuration>().unwrap().0,
            Duration::from_secs(4530)
        );
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
        assert!("5x".parse::<HumanDuration>().is_err());
        assert!("".parse::<HumanDuration>().is_err());
        assert!("m".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_rejects_overflow() {
        assert!("300000000000000d".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s1s".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_flags_build_policy() {
        let cli = Cli::parse_from(["kbo", "--fail-closed", "--window-days", "1", "teams"]);
        let config = cli.scrape_config();
        assert_eq!(config.policy.window_days, 1);
        assert!(!config.policy.unparseable_default);
        assert_eq!(config.limit, 3);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));

        let cli = Cli::parse_from(["kbo", "scrape", "issues", "hanwha", "--same-day"]);
        assert_eq!(cli.scrape_config().policy, FreshnessPolicy::same_day());
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
