use crate::pipeline::model::{NullCounts, PipelineError};
use url::Url;

const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_BATCH_SIZE: usize = 1000;
/// 每行绑定 9 个参数，PostgreSQL 单条语句最多 65535 个
pub const MAX_BATCH_SIZE: usize = 65535 / 9;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    /// 日志用，不含密码
    pub display_target: String,
    pub pool_size: u32,
    pub batch_size: usize,
    pub expected_nulls: NullCounts,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// DATABASE_URL 优先；否则由 DB_HOST / DB_PORT / DB_NAME / DB_USER / DB_PASSWORD 拼出 postgres URL
    pub fn from_lookup<F>(get: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (database_url, display_target) = match non_empty("DATABASE_URL") {
            Some(url) => {
                let display = redact_url(&url);
                (url, display)
            }
            None => {
                let host = non_empty("DB_HOST").ok_or(PipelineError::MissingEnv("DB_HOST"))?;
                let port = match non_empty("DB_PORT") {
                    Some(raw) => raw.parse::<u16>().map_err(|_| PipelineError::InvalidConfig {
                        name: "DB_PORT",
                        value: raw.clone(),
                    })?,
                    None => DEFAULT_PG_PORT,
                };
                let name = non_empty("DB_NAME").ok_or(PipelineError::MissingEnv("DB_NAME"))?;
                let user = non_empty("DB_USER").ok_or(PipelineError::MissingEnv("DB_USER"))?;
                // 密码允许带首尾空格，不做 trim
                let password =
                    get("DB_PASSWORD").ok_or(PipelineError::MissingEnv("DB_PASSWORD"))?;

                let url = postgres_url(&host, port, &name, &user, &password)?;
                (url, format!("{}@{}:{}/{}", user, host, port, name))
            }
        };

        let pool_size = match non_empty("METRICS_POOL_SIZE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(PipelineError::InvalidConfig {
                        name: "METRICS_POOL_SIZE",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        let batch_size = match non_empty("METRICS_BATCH_SIZE") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 && n <= MAX_BATCH_SIZE => n,
                _ => {
                    return Err(PipelineError::InvalidConfig {
                        name: "METRICS_BATCH_SIZE",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_BATCH_SIZE,
        };

        Ok(Self {
            database_url,
            display_target,
            pool_size,
            batch_size,
            expected_nulls: NullCounts::expected_warmup(),
        })
    }
}

/// 用户名、密码中的保留字符由 `Url` 负责百分号编码
fn postgres_url(
    host: &str,
    port: u16,
    name: &str,
    user: &str,
    password: &str,
) -> Result<String, PipelineError> {
    let invalid = |name: &'static str, value: &str| PipelineError::InvalidConfig {
        name,
        value: value.to_string(),
    };

    let mut url = Url::parse("postgres://localhost").map_err(|_| invalid("DB_HOST", host))?;
    url.set_host(Some(host)).map_err(|_| invalid("DB_HOST", host))?;
    url.set_port(Some(port)).map_err(|_| invalid("DB_PORT", &port.to_string()))?;
    url.set_path(name);
    url.set_username(user).map_err(|_| invalid("DB_USER", user))?;
    url.set_password(Some(password))
        .map_err(|_| invalid("DB_PASSWORD", "***"))?;
    Ok(url.into())
}

/// 只遮住已有的密码；解析不了的 URL 整体隐藏
fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("***")).is_err() {
                return "<redacted>".to_string();
            }
            url.into()
        }
        Err(_) => "<redacted>".to_string(),
    }
}
