use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Telegram user ids allowed to use admin commands and receive reports.
    pub admin_ids: Vec<i64>,
    /// Maximum concurrent bookings per time slot.
    pub max_parallel_bookings: u32,
    /// How many hours before the appointment the reminder fires.
    pub reminder_hours_before: i64,
    pub daily_report_time: String,
    pub weekly_report_day: String,
    pub weekly_report_time: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "sqlite:./data/detailing.db".to_string());

        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let admin_ids = parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default())?;

        let max_parallel_bookings = parse_or_default(&env::var("MAX_PARALLEL_BOOKINGS").ok(), 12)?;
        let reminder_hours_before = parse_or_default(&env::var("REMINDER_HOURS_BEFORE").ok(), 3)?;

        let daily_report_time = env::var("DAILY_REPORT_TIME").unwrap_or_else(|_| "21:00".to_string());
        let weekly_report_day = env::var("WEEKLY_REPORT_DAY").unwrap_or_else(|_| "Sun".to_string());
        let weekly_report_time = env::var("WEEKLY_REPORT_TIME").unwrap_or_else(|_| "22:00".to_string());

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            admin_ids,
            max_parallel_bookings,
            reminder_hours_before,
            daily_report_time,
            weekly_report_day,
            weekly_report_time,
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// Parses a comma-separated list of Telegram user ids. Empty input is allowed:
/// the bot then runs without admin features.
pub fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| anyhow!("ADMIN_IDS contains a non-numeric id: '{}'", part.trim()))
        })
        .collect()
}

/// Parses an "HH:MM" time of day into (hour, minute) for cron registration.
pub fn parse_report_time(raw: &str) -> Result<(u32, u32)> {
    let (h, m) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Report time must be HH:MM, got '{raw}'"))?;
    let hour: u32 = h.parse().map_err(|_| anyhow!("Invalid hour in '{raw}'"))?;
    let minute: u32 = m.parse().map_err(|_| anyhow!("Invalid minute in '{raw}'"))?;
    if hour > 23 || minute > 59 {
        return Err(anyhow!("Report time out of range: '{raw}'"));
    }
    Ok((hour, minute))
}

fn parse_or_default<T: std::str::FromStr>(var: &Option<String>, default: T) -> Result<T> {
    match var {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid numeric configuration value: '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_ids_parsing() {
        assert_eq!(parse_admin_ids("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_admin_ids("123").unwrap(), vec![123]);
        assert_eq!(parse_admin_ids(" 1, 2 ,3 ").unwrap(), vec![1, 2, 3]);
        assert!(parse_admin_ids("1,abc").is_err());
    }

    #[test]
    fn report_time_parsing() {
        assert_eq!(parse_report_time("21:00").unwrap(), (21, 0));
        assert_eq!(parse_report_time("9:05").unwrap(), (9, 5));
        assert!(parse_report_time("24:00").is_err());
        assert!(parse_report_time("21").is_err());
        assert!(parse_report_time("21:xx").is_err());
    }

    #[test]
    fn numeric_defaults() {
        assert_eq!(parse_or_default::<u32>(&None, 12).unwrap(), 12);
        assert_eq!(parse_or_default::<u32>(&Some("".into()), 12).unwrap(), 12);
        assert_eq!(parse_or_default::<u32>(&Some("4".into()), 12).unwrap(), 4);
        assert!(parse_or_default::<u32>(&Some("x".into()), 12).is_err());
    }
}
