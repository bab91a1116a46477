use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::Context;

use crate::scoring::RecommendPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub log_format: LogFormat,
    pub recommend_policy: RecommendPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Ok(Config {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            max_connections: parse_env("DB_MAX_CONNECTIONS", 5)?,
            log_format: parse_env("LOG_FORMAT", LogFormat::Compact)?,
            recommend_policy: parse_env("RECOMMEND_POLICY", RecommendPolicy::ScoreOnly)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => parse_value(key, &value),
        _ => Ok(default),
    }
}

fn parse_value<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|err: T::Err| anyhow::anyhow!("{err}"))
        .with_context(|| format!("invalid value for {key}: {value}"))
}
