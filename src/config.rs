use std::env;

use chrono::FixedOffset;

/// America/Mexico_City standard time.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -360;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Offset used to decide which reservations belong to "today".
    pub restaurant_offset: FixedOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let offset_minutes = env::var("RESTAURANT_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i32>().ok())
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        let restaurant_offset = offset_from_minutes(offset_minutes)?;

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            restaurant_offset,
        })
    }
}

pub fn offset_from_minutes(minutes: i32) -> anyhow::Result<FixedOffset> {
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| anyhow::anyhow!("invalid UTC offset: {minutes} minutes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_accepts_mexico_city() {
        let offset = offset_from_minutes(-360).unwrap();
        assert_eq!(offset.local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn offset_rejects_out_of_range() {
        assert!(offset_from_minutes(24 * 60).is_err());
    }
}
