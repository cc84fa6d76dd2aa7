use std::env;
use std::path::PathBuf;

use chrono::FixedOffset;

use crate::errors::AdvisorError;
use crate::schedule::Schedule;

/// Everything the process needs, built once at startup and passed down.
///
/// Values come from the environment (after `.env` is loaded by the binary):
///
/// | Env Var              | Default                               |
/// |----------------------|---------------------------------------|
/// | `BOT_TOKEN`          | required                              |
/// | `CHAT_ID`            | required                              |
/// | `WORKDIR`            | `.`                                   |
/// | `PORTFOLIO_FILE`     | `$WORKDIR/portfolio.json`             |
/// | `TICKERS_FILE`       | `$WORKDIR/nse_tickers.txt`            |
/// | `FUNDS_FILE`         | built-in catalog                      |
/// | `REPORTS_DIR`        | `$WORKDIR/reports`                    |
/// | `SYMBOL_SUFFIX`      | `.NS`                                 |
/// | `PICKS_MIN_PRICE`    | `100`                                 |
/// | `PICKS_MAX_PRICE`    | `500`                                 |
/// | `HISTORY_RANGE`      | `1y`                                  |
/// | `HISTORY_INTERVAL`   | `1d`                                  |
/// | `YAHOO_BASE_URL`     | `https://query1.finance.yahoo.com`    |
/// | `FETCH_CONCURRENCY`  | `5`                                   |
/// | `TZ_OFFSET_MINUTES`  | `330`                                 |
/// | `WEEKLY_SCHEDULE`    | `sun 18:00`                           |
/// | `MONTHLY_SCHEDULE`   | `1 09:00`                             |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub paths: PathsConfig,
    pub market: MarketConfig,
    pub picks: PicksConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub portfolio_file: PathBuf,
    pub tickers_file: PathBuf,
    pub funds_file: Option<PathBuf>,
    pub reports_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub base_url: String,
    pub symbol_suffix: String,
    pub history_range: String,
    pub history_interval: String,
    pub fetch_concurrency: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct PicksConfig {
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    pub offset: FixedOffset,
    pub weekly: Schedule,
    pub monthly: Schedule,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AdvisorError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdvisorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| AdvisorError::Config(format!("{} must be set", key)))
        };

        let chat_id = required("CHAT_ID")?;
        let telegram = TelegramConfig {
            bot_token: required("BOT_TOKEN")?,
            chat_id: parse_number("CHAT_ID", &chat_id)?,
        };

        let workdir = PathBuf::from(var("WORKDIR").unwrap_or_else(|| ".".to_string()));
        let path_or = |key: &str, default: &str| {
            var(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| workdir.join(default))
        };
        let paths = PathsConfig {
            portfolio_file: path_or("PORTFOLIO_FILE", "portfolio.json"),
            tickers_file: path_or("TICKERS_FILE", "nse_tickers.txt"),
            funds_file: var("FUNDS_FILE").map(PathBuf::from),
            reports_dir: path_or("REPORTS_DIR", "reports"),
        };

        let fetch_concurrency: usize = match var("FETCH_CONCURRENCY") {
            Some(v) => parse_number("FETCH_CONCURRENCY", &v)?,
            None => 5,
        };
        if fetch_concurrency == 0 {
            return Err(AdvisorError::Config(
                "FETCH_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        let market = MarketConfig {
            base_url: var("YAHOO_BASE_URL")
                .unwrap_or_else(|| "https://query1.finance.yahoo.com".to_string()),
            symbol_suffix: var("SYMBOL_SUFFIX").unwrap_or_else(|| ".NS".to_string()),
            history_range: var("HISTORY_RANGE").unwrap_or_else(|| "1y".to_string()),
            history_interval: var("HISTORY_INTERVAL").unwrap_or_else(|| "1d".to_string()),
            fetch_concurrency,
        };

        let picks = PicksConfig {
            min_price: match var("PICKS_MIN_PRICE") {
                Some(v) => parse_number("PICKS_MIN_PRICE", &v)?,
                None => 100.0,
            },
            max_price: match var("PICKS_MAX_PRICE") {
                Some(v) => parse_number("PICKS_MAX_PRICE", &v)?,
                None => 500.0,
            },
        };
        if picks.min_price > picks.max_price {
            return Err(AdvisorError::Config(format!(
                "PICKS_MIN_PRICE ({}) exceeds PICKS_MAX_PRICE ({})",
                picks.min_price, picks.max_price
            )));
        }

        let offset_minutes: i32 = match var("TZ_OFFSET_MINUTES") {
            Some(v) => parse_number("TZ_OFFSET_MINUTES", &v)?,
            None => 330,
        };
        let schedule = ScheduleConfig {
            offset: FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
                AdvisorError::Config(format!("TZ_OFFSET_MINUTES out of range: {}", offset_minutes))
            })?,
            weekly: Schedule::parse_weekly(
                &var("WEEKLY_SCHEDULE").unwrap_or_else(|| "sun 18:00".to_string()),
            )?,
            monthly: Schedule::parse_monthly(
                &var("MONTHLY_SCHEDULE").unwrap_or_else(|| "1 09:00".to_string()),
            )?,
        };

        Ok(Self {
            telegram,
            paths,
            market,
            picks,
            schedule,
        })
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, AdvisorError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AdvisorError::Config(format!("{} must be a number ('{}'): {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AdvisorError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_credentials() {
        let config = load(&[("BOT_TOKEN", "123:abc"), ("CHAT_ID", "-100200")]).unwrap();

        assert_eq!(config.telegram.chat_id, -100200);
        assert_eq!(config.paths.portfolio_file, PathBuf::from("./portfolio.json"));
        assert_eq!(config.paths.reports_dir, PathBuf::from("./reports"));
        assert!(config.paths.funds_file.is_none());
        assert_eq!(config.market.symbol_suffix, ".NS");
        assert_eq!(config.market.fetch_concurrency, 5);
        assert_eq!(config.picks.min_price, 100.0);
        assert_eq!(config.picks.max_price, 500.0);
        assert_eq!(config.schedule.offset.local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_workdir_prefixes_default_paths() {
        let config = load(&[
            ("BOT_TOKEN", "t"),
            ("CHAT_ID", "1"),
            ("WORKDIR", "/srv/advisor"),
            ("TICKERS_FILE", "/etc/tickers.txt"),
        ])
        .unwrap();

        assert_eq!(
            config.paths.portfolio_file,
            PathBuf::from("/srv/advisor/portfolio.json")
        );
        assert_eq!(config.paths.tickers_file, PathBuf::from("/etc/tickers.txt"));
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let err = load(&[("CHAT_ID", "1")]).unwrap_err();
        assert!(matches!(err, AdvisorError::Config(msg) if msg.contains("BOT_TOKEN")));
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        assert!(load(&[("BOT_TOKEN", "t"), ("CHAT_ID", "me")]).is_err());
        assert!(
            load(&[("BOT_TOKEN", "t"), ("CHAT_ID", "1"), ("PICKS_MIN_PRICE", "cheap")]).is_err()
        );
        assert!(
            load(&[
                ("BOT_TOKEN", "t"),
                ("CHAT_ID", "1"),
                ("PICKS_MIN_PRICE", "600"),
                ("PICKS_MAX_PRICE", "500"),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let config = load(&[("BOT_TOKEN", "secret-token"), ("CHAT_ID", "1")]).unwrap();
        assert!(!format!("{:?}", config).contains("secret-token"));
    }
}
