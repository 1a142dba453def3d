use chrono::{DateTime, Datelike, FixedOffset, Utc, Weekday};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub spin: SpinConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub deals: DealsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 通知网关地址；为空时只记录日志
    #[serde(default)]
    pub endpoint: Option<String>,
    /// 实物奖品履约频道
    #[serde(default)]
    pub ops_channel: Option<String>,
    #[serde(default = "default_notify_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_notify_timeout_ms() -> u64 {
    3000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            ops_channel: None,
            timeout_ms: default_notify_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    pub cooldown_hours: i64,
    pub voucher_validity_days: i64,
    /// 新用户奖池为空时兜底的折扣券百分比
    pub new_user_fallback_percent: i64,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: 24,
            voucher_validity_days: 14,
            new_user_fallback_percent: 10,
        }
    }
}

/// Post-purchase reward rules. Amounts are in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    pub cashback_threshold: i64,
    pub cashback_percent: i64,
    pub rice_chicken_bonus: i64,
    pub beef_chicken_bonus: i64,
    pub free_delivery_threshold: i64,
    pub free_delivery_value: i64,
    pub free_delivery_validity_days: i64,
    /// (最低实付金额, 积分)，取达到的最高档
    pub loyalty_tiers: Vec<(i64, i64)>,
    pub referral_bonus_percent: i64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            cashback_threshold: 25_000,
            cashback_percent: 10,
            rice_chicken_bonus: 2_000,
            beef_chicken_bonus: 1_000,
            free_delivery_threshold: 50_000,
            free_delivery_value: 2_500,
            free_delivery_validity_days: 14,
            loyalty_tiers: vec![(200_000, 1), (500_000, 2), (1_000_000, 3)],
            referral_bonus_percent: 10,
        }
    }
}

/// Pre-payment deals. Passed by value into the discount calculator on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DealsConfig {
    pub family_feast_threshold: i64,
    pub family_feast_percent: i64,
    pub flash_sale_percent: i64,
    pub flash_sale_days: Vec<Weekday>,
    pub fresh_produce_keywords: Vec<String>,
    /// 门店时区（相对 UTC 的小时数），限时抢购按门店当地星期判断
    pub utc_offset_hours: i32,
}

impl Default for DealsConfig {
    fn default() -> Self {
        Self {
            family_feast_threshold: 45_000,
            family_feast_percent: 15,
            flash_sale_percent: 20,
            flash_sale_days: vec![Weekday::Fri, Weekday::Sat],
            fresh_produce_keywords: ["fruit", "vegetable", "pepper", "tomato", "onion"]
                .into_iter()
                .map(String::from)
                .collect(),
            utc_offset_hours: 1,
        }
    }
}

impl DealsConfig {
    /// Weekday on the store's wall clock. Offsets outside ±23h fall back to UTC.
    pub fn store_weekday(&self, now: DateTime<Utc>) -> Weekday {
        match FixedOffset::east_opt(self.utc_offset_hours * 3600) {
            Some(offset) => now.with_timezone(&offset).weekday(),
            None => now.weekday(),
        }
    }
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str, &config_path)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                let database_url = env::var("DATABASE_URL").map_err(|_| {
                    AppError::ConfigError(
                        "DATABASE_URL is required when config.toml is absent".to_string(),
                    )
                })?;

                Config {
                    server: ServerConfig {
                        host: "0.0.0.0".to_string(),
                        port: 8080,
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: 10,
                    },
                    jwt: JwtConfig {
                        secret: "change-me-in-production".to_string(),
                    },
                    notifications: NotificationConfig::default(),
                    spin: SpinConfig::default(),
                    rewards: RewardsConfig::default(),
                    deals: DealsConfig::default(),
                }
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Unable to read {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn parse(raw: &str, source: &str) -> AppResult<Self> {
        toml::from_str(raw)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse {source}: {e}")))
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("NOTIFY_ENDPOINT") {
            self.notifications.endpoint = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("NOTIFY_OPS_CHANNEL") {
            self.notifications.ops_channel = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("NOTIFY_TIMEOUT_MS")
            && let Ok(ms) = v.parse()
        {
            self.notifications.timeout_ms = ms;
        }
        if let Ok(v) = env::var("STORE_UTC_OFFSET_HOURS")
            && let Ok(h) = v.parse()
        {
            self.deals.utc_offset_hours = h;
        }
        if let Ok(v) = env::var("SPIN_COOLDOWN_HOURS")
            && let Ok(h) = v.parse()
        {
            self.spin.cooldown_hours = h;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_gets_reward_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [jwt]
            secret = "s3cret"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.spin.cooldown_hours, 24);
        assert_eq!(config.rewards.cashback_threshold, 25_000);
        assert_eq!(config.rewards.loyalty_tiers.len(), 3);
        assert_eq!(config.deals.flash_sale_days, vec![Weekday::Fri, Weekday::Sat]);
        assert!(config.notifications.endpoint.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [jwt]
            secret = "s3cret"

            [deals]
            family_feast_percent = 12
            flash_sale_days = ["Sun"]
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.deals.family_feast_percent, 12);
        assert_eq!(config.deals.family_feast_threshold, 45_000);
        assert_eq!(config.deals.flash_sale_days, vec![Weekday::Sun]);
        assert_eq!(config.deals.utc_offset_hours, 1);
    }

    #[test]
    fn unparsable_file_is_a_config_error() {
        let err = Config::parse("[server]\nport = \"not a number\"", "bad.toml").unwrap_err();
        match err {
            AppError::ConfigError(msg) => assert!(msg.contains("bad.toml")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn flash_sale_day_follows_store_clock() {
        use chrono::TimeZone;

        // 2026-10-15 是周四
        let thursday_late = Utc.with_ymd_and_hms(2026, 10, 15, 23, 30, 0).unwrap();
        let deals = DealsConfig::default();
        assert_eq!(deals.store_weekday(thursday_late), Weekday::Fri);

        let utc_store = DealsConfig {
            utc_offset_hours: 0,
            ..DealsConfig::default()
        };
        assert_eq!(utc_store.store_weekday(thursday_late), Weekday::Thu);

        let bogus = DealsConfig {
            utc_offset_hours: 48,
            ..DealsConfig::default()
        };
        assert_eq!(bogus.store_weekday(thursday_late), Weekday::Thu);
    }
}
