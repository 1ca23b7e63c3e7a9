use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub catalog_db_path: PathBuf,
    pub catalog_pool_size: usize,

    pub default_limit: usize,
    pub broad_limit: usize,
    pub strategy_row_limit: usize,
    pub max_variants: usize,
    /// Fan-out deadline; zero waits for every read.
    pub time_budget_ms: u64,
    /// Skip later strategies for a variant once an earlier one produced rows.
    pub short_circuit: bool,

    pub suggest_default_limit: usize,
    pub suggest_category_limit: usize,

    pub reference_cache_ttl_s: u64,
    pub lexicon_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_db_path: PathBuf::from("./data/catalog.db"),
            catalog_pool_size: num_cpus::get().max(1),
            default_limit: 50,
            broad_limit: 500,
            strategy_row_limit: 200,
            max_variants: 32,
            time_budget_ms: 5_000,
            short_circuit: true,
            suggest_default_limit: 10,
            suggest_category_limit: 5,
            reference_cache_ttl_s: 300,
            lexicon_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let catalog_db_path = optional_env("CATALOG_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.catalog_db_path);

        let catalog_pool_size = optional_env("CATALOG_POOL_SIZE")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(defaults.catalog_pool_size)
            .max(1);

        let default_limit = optional_env("SEARCH_DEFAULT_LIMIT")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(defaults.default_limit);

        let broad_limit = optional_env("SEARCH_BROAD_LIMIT")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(defaults.broad_limit);

        let strategy_row_limit = optional_env("SEARCH_STRATEGY_ROW_LIMIT")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(defaults.strategy_row_limit)
            .max(1);

        let max_variants = optional_env("SEARCH_MAX_VARIANTS")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(defaults.max_variants)
            .max(1);

        let time_budget_ms = optional_env("SEARCH_TIME_BUDGET_MS")
            .as_deref()
            .map(parse_u64)
            .transpose()?
            .unwrap_or(defaults.time_budget_ms);

        let short_circuit = optional_env("SEARCH_SHORT_CIRCUIT")
            .as_deref()
            .map(parse_bool)
            .transpose()?
            .unwrap_or(defaults.short_circuit);

        let suggest_default_limit = optional_env("SUGGEST_DEFAULT_LIMIT")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(defaults.suggest_default_limit);

        let suggest_category_limit = optional_env("SUGGEST_CATEGORY_LIMIT")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(defaults.suggest_category_limit)
            .max(1);

        let reference_cache_ttl_s = optional_env("REFERENCE_CACHE_TTL_S")
            .as_deref()
            .map(parse_u64)
            .transpose()?
            .unwrap_or(defaults.reference_cache_ttl_s);

        let lexicon_path = optional_env("LEXICON_PATH").map(PathBuf::from);

        let config = Self {
            catalog_db_path,
            catalog_pool_size,
            default_limit,
            broad_limit,
            strategy_row_limit,
            max_variants,
            time_budget_ms,
            short_circuit,
            suggest_default_limit,
            suggest_category_limit,
            reference_cache_ttl_s,
            lexicon_path,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(anyhow!("SEARCH_DEFAULT_LIMIT must be greater than 0"));
        }
        if self.broad_limit < self.default_limit {
            return Err(anyhow!(
                "SEARCH_BROAD_LIMIT ({}) must be >= SEARCH_DEFAULT_LIMIT ({})",
                self.broad_limit,
                self.default_limit
            ));
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Option<Duration> {
        (self.time_budget_ms > 0).then(|| Duration::from_millis(self.time_budget_ms))
    }

    pub fn reference_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.reference_cache_ttl_s)
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

fn parse_usize(value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|err| anyhow!("Invalid integer '{value}': {err}"))
}

fn parse_u64(value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|err| anyhow!("Invalid integer '{value}': {err}"))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => Err(anyhow!("Invalid boolean '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: &[&str] = &[
        "CATALOG_DB_PATH",
        "CATALOG_POOL_SIZE",
        "SEARCH_DEFAULT_LIMIT",
        "SEARCH_BROAD_LIMIT",
        "SEARCH_STRATEGY_ROW_LIMIT",
        "SEARCH_MAX_VARIANTS",
        "SEARCH_TIME_BUDGET_MS",
        "SEARCH_SHORT_CIRCUIT",
        "SUGGEST_DEFAULT_LIMIT",
        "SUGGEST_CATEGORY_LIMIT",
        "REFERENCE_CACHE_TTL_S",
        "LEXICON_PATH",
    ];

    fn clear_env() {
        for k in KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let _g = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.catalog_db_path, PathBuf::from("./data/catalog.db"));
        assert_eq!(cfg.default_limit, 50);
        assert_eq!(cfg.broad_limit, 500);
        assert!(cfg.short_circuit);
        assert_eq!(cfg.time_budget(), Some(Duration::from_millis(5_000)));
        assert_eq!(cfg.reference_cache_ttl(), Duration::from_secs(300));
        assert!(cfg.lexicon_path.is_none());
    }

    #[test]
    fn broad_limit_must_not_undercut_default_limit() {
        let _g = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        std::env::set_var("SEARCH_DEFAULT_LIMIT", "100");
        std::env::set_var("SEARCH_BROAD_LIMIT", "20");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    fn zero_budget_disables_deadline() {
        let _g = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        std::env::set_var("SEARCH_TIME_BUDGET_MS", "0");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.time_budget(), None);
        clear_env();
    }

    #[test]
    fn bool_and_integer_parsing() {
        let _g = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        std::env::set_var("SEARCH_SHORT_CIRCUIT", "no");
        std::env::set_var("CATALOG_POOL_SIZE", " 3 ");
        let cfg = Config::from_env().unwrap();
        assert!(!cfg.short_circuit);
        assert_eq!(cfg.catalog_pool_size, 3);

        std::env::set_var("SEARCH_SHORT_CIRCUIT", "maybe");
        assert!(Config::from_env().is_err());
        std::env::set_var("SEARCH_SHORT_CIRCUIT", "true");
        std::env::set_var("SEARCH_MAX_VARIANTS", "lots");
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
