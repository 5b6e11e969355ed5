use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub shop: ShopConfig,
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
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// 门店本地时间与时段划分（用于早间/晚间/周末加成）
/// 小时区间均为左闭右开 [start, end)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub utc_offset_minutes: i32,
    pub morning_start_hour: u32,
    pub morning_end_hour: u32,
    pub evening_start_hour: u32,
    pub evening_end_hour: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            morning_start_hour: 6,
            morning_end_hour: 11,
            evening_start_hour: 18,
            evening_end_hour: 23,
        }
    }
}

/// 示例配置中的占位密钥，出现即视为未配置
const PLACEHOLDER_JWT_SECRETS: &[&str] = &["change-me-in-production", "changeme", "secret"];

impl ShopConfig {
    /// 门店时区；偏移量非法时退回 UTC（validate 已拦截）
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;
                // 签名密钥同样必须显式提供，不允许使用内置默认值
                let jwt_secret = get_env("JWT_SECRET")
                    .ok_or("JWT_SECRET is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                        connect_timeout_secs: get_env_parse(
                            "DB_CONNECT_TIMEOUT",
                            default_connect_timeout(),
                        ),
                    },
                    jwt: JwtConfig {
                        secret: jwt_secret,
                    },
                    cors: CorsConfig {
                        allowed_origins: get_env("CORS_ALLOWED_ORIGINS")
                            .map(|v| parse_origins(&v))
                            .unwrap_or_default(),
                    },
                    shop: ShopConfig {
                        utc_offset_minutes: get_env_parse("SHOP_UTC_OFFSET_MINUTES", 0i32),
                        ..ShopConfig::default()
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

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
        if let Ok(v) = env::var("DB_CONNECT_TIMEOUT")
            && let Ok(t) = v.parse()
        {
            self.database.connect_timeout_secs = t;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = parse_origins(&v);
        }
        if let Ok(v) = env::var("SHOP_UTC_OFFSET_MINUTES")
            && let Ok(m) = v.parse()
        {
            self.shop.utc_offset_minutes = m;
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let shop = &self.shop;
        if shop.utc_offset_minutes.abs() >= 24 * 60 {
            return Err("shop.utc_offset_minutes must be within (-1440, 1440)".into());
        }
        for h in [
            shop.morning_start_hour,
            shop.morning_end_hour,
            shop.evening_start_hour,
            shop.evening_end_hour,
        ] {
            if h > 24 {
                return Err("shop hour windows must be within 0..=24".into());
            }
        }
        let secret = self.jwt.secret.trim();
        if secret.is_empty() {
            return Err("jwt.secret must not be empty".into());
        }
        if PLACEHOLDER_JWT_SECRETS.contains(&secret) {
            return Err("jwt.secret is a placeholder value, set JWT_SECRET".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let config = Config::parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/bonus"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.connect_timeout_secs, 8);
        assert!(config.cors.allowed_origins.is_empty());
        assert_eq!(config.shop.morning_start_hour, 6);
        assert_eq!(config.shop.evening_end_hour, 23);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_shop_and_cors_sections() {
        let config = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/bonus"
            max_connections = 5

            [jwt]
            secret = "s3cret"

            [cors]
            allowed_origins = ["https://shop.example.com"]

            [shop]
            utc_offset_minutes = 180
            morning_start_hour = 7
            morning_end_hour = 10
            evening_start_hour = 19
            evening_end_hour = 22
            "#,
        )
        .unwrap();
        assert_eq!(config.cors.allowed_origins, vec!["https://shop.example.com"]);
        assert_eq!(config.shop.utc_offset_minutes, 180);
        assert_eq!(config.shop.morning_end_hour, 10);
    }

    #[test]
    fn test_validate_rejects_bad_offset() {
        let mut config = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/bonus"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        config.shop.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_or_placeholder_secret() {
        let mut config = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/bonus"
            max_connections = 5

            [jwt]
            secret = "change-me-in-production"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        config.jwt.secret = "   ".to_string();
        assert!(config.validate().is_err());

        config.jwt.secret = "k3y-from-vault".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
