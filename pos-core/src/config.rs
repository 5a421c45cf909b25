//! Engine configuration

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::utils::time::parse_cutoff;

/// Settlement engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file path
    pub db_path: String,
    /// Venue timezone for business day math
    pub timezone: Tz,
    /// Tax rate applied when deriving net revenue (e.g. 0.10)
    pub tax_rate: f64,
    /// Time of day at which one business day rolls into the next
    pub business_day_cutoff: NaiveTime,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// Optional directory for daily-rolling log files
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let timezone = std::env::var("POS_TIMEZONE")
            .ok()
            .and_then(|tz| {
                tz.parse::<Tz>()
                    .map_err(|_| tracing::warn!("unknown timezone '{tz}', using Europe/Madrid"))
                    .ok()
            })
            .unwrap_or(chrono_tz::Europe::Madrid);

        let tax_rate = std::env::var("POS_TAX_RATE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|r| (0.0..1.0).contains(r))
            .unwrap_or(0.10);

        let cutoff = std::env::var("POS_BUSINESS_DAY_CUTOFF").unwrap_or_else(|_| "00:00".into());

        Self {
            db_path: std::env::var("POS_DB_PATH").unwrap_or_else(|_| "data/pos.db".into()),
            timezone,
            tax_rate,
            business_day_cutoff: parse_cutoff(&cutoff),
            log_level: std::env::var("POS_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("POS_LOG_DIR").ok().filter(|s| !s.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "data/pos.db".into(),
            timezone: chrono_tz::Europe::Madrid,
            tax_rate: 0.10,
            business_day_cutoff: NaiveTime::MIN,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}
