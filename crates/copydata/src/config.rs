use std::{env, time::Duration};

use copydata_core::retry::RetryPolicy;

use crate::engine::{PhaseOrder, ReplicationOptions};

/// One side of a replication: which stage's tables, reached through which account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// Table name prefix, e.g. `prod` for `prod-users`.
    pub stage: String,
    /// Named AWS profile; `None` uses the default credential chain.
    pub profile: Option<String>,
    pub region: String,
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
}

impl EnvironmentConfig {
    /// Returns a display string for the environment.
    pub fn target_display(&self) -> String {
        let profile = self.profile.as_deref().unwrap_or("default");
        match &self.endpoint_url {
            Some(url) => format!("stage '{}' on local DynamoDB ({})", self.stage, url),
            None => format!(
                "stage '{}' on AWS DynamoDB (region: {}, profile: {})",
                self.stage, self.region, profile
            ),
        }
    }

    /// Whether both configurations may address the same tables.
    ///
    /// A missing profile falls back to the default credential chain, which can
    /// resolve to any account, so only two explicit and different profiles
    /// tell otherwise identical environments apart.
    pub fn is_same_as(&self, other: &Self) -> bool {
        let distinct_profiles = match (&self.profile, &other.profile) {
            (Some(ours), Some(theirs)) => ours != theirs,
            _ => false,
        };
        self.stage == other.stage
            && self.region == other.region
            && self.endpoint_url == other.endpoint_url
            && !distinct_profiles
    }
}

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Tables replicated at the same time (default: 4)
    pub concurrency: usize,
    /// Items per scan page; `None` lets the store decide
    pub page_size: Option<usize>,
    /// Attempts per store call, first one included (default: 5)
    pub max_attempts: u32,
    /// Backoff after the first failed attempt in milliseconds (default: 100)
    pub initial_delay_ms: u64,
    /// Backoff ceiling in milliseconds (default: 5,000)
    pub max_delay_ms: u64,
    /// Timeout of a single store call in milliseconds (default: 30,000)
    pub op_timeout_ms: u64,
    pub phase_order: PhaseOrder,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COPY_DATA_CONCURRENCY` - Tables replicated at the same time (default: 4)
    /// - `COPY_DATA_PAGE_SIZE` - Items per scan page (default: unset)
    /// - `COPY_DATA_MAX_ATTEMPTS` - Attempts per store call (default: 5)
    /// - `COPY_DATA_INITIAL_DELAY_MS` - First backoff delay (default: 100)
    /// - `COPY_DATA_MAX_DELAY_MS` - Backoff ceiling (default: 5,000)
    /// - `COPY_DATA_OP_TIMEOUT_MS` - Per-call timeout (default: 30,000)
    /// - `COPY_DATA_PHASE_ORDER` - `clear-first` or `read-first` (default: clear-first)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            concurrency: parse::<usize>(&lookup, "COPY_DATA_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(4),
            page_size: parse::<usize>(&lookup, "COPY_DATA_PAGE_SIZE").filter(|n| *n > 0),
            max_attempts: parse::<u32>(&lookup, "COPY_DATA_MAX_ATTEMPTS")
                .filter(|n| *n > 0)
                .unwrap_or(5),
            initial_delay_ms: parse(&lookup, "COPY_DATA_INITIAL_DELAY_MS").unwrap_or(100),
            max_delay_ms: parse(&lookup, "COPY_DATA_MAX_DELAY_MS").unwrap_or(5_000),
            op_timeout_ms: parse::<u64>(&lookup, "COPY_DATA_OP_TIMEOUT_MS")
                .filter(|n| *n > 0)
                .unwrap_or(30_000),
            phase_order: parse(&lookup, "COPY_DATA_PHASE_ORDER").unwrap_or_default(),
        }
    }

    /// Retry policy for individual store calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            op_timeout: Duration::from_millis(self.op_timeout_ms),
            ..RetryPolicy::default()
        }
    }

    pub fn replication_options(&self) -> ReplicationOptions {
        ReplicationOptions {
            concurrency: self.concurrency,
            order: self.phase_order,
            retry: self.retry_policy(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    fn environment(stage: &str) -> EnvironmentConfig {
        EnvironmentConfig {
            stage: stage.to_string(),
            profile: Some("expenses".to_string()),
            region: "eu-west-2".to_string(),
            endpoint_url: None,
        }
    }

    #[test]
    fn test_default_values() {
        let config = config(&[]);

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.page_size, None);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_delay_ms, 100);
        assert_eq!(config.max_delay_ms, 5_000);
        assert_eq!(config.op_timeout_ms, 30_000);
        assert_eq!(config.phase_order, PhaseOrder::ClearFirst);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("COPY_DATA_CONCURRENCY", "1"),
            ("COPY_DATA_PAGE_SIZE", "25"),
            ("COPY_DATA_MAX_ATTEMPTS", "2"),
            ("COPY_DATA_OP_TIMEOUT_MS", "1500"),
            ("COPY_DATA_PHASE_ORDER", "Read-First"),
        ]);

        assert_eq!(config.concurrency, 1);
        assert_eq!(config.page_size, Some(25));
        assert_eq!(config.phase_order, PhaseOrder::ReadFirst);

        let options = config.replication_options();
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.order, PhaseOrder::ReadFirst);
        assert_eq!(options.retry.max_attempts, 2);
        assert_eq!(options.retry.op_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = config(&[
            ("COPY_DATA_CONCURRENCY", "0"),
            ("COPY_DATA_PAGE_SIZE", "lots"),
            ("COPY_DATA_PHASE_ORDER", "sideways"),
        ]);

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.page_size, None);
        assert_eq!(config.phase_order, PhaseOrder::ClearFirst);
    }

    #[test]
    fn test_same_environment_detection() {
        let prod = environment("prod");
        let mut other_profile = environment("prod");
        other_profile.profile = Some("expenses-dev".to_string());

        assert!(prod.is_same_as(&environment("prod")));
        assert!(!prod.is_same_as(&environment("dev")));
        assert!(!prod.is_same_as(&other_profile));
    }

    #[test]
    fn test_missing_profile_counts_as_same_environment() {
        let explicit = environment("prod");
        let mut implicit = environment("prod");
        implicit.profile = None;
        let mut default_profile = environment("prod");
        default_profile.profile = Some("default".to_string());

        assert!(implicit.is_same_as(&explicit));
        assert!(explicit.is_same_as(&implicit));
        assert!(implicit.is_same_as(&implicit.clone()));
        assert!(implicit.is_same_as(&default_profile));
    }

    #[test]
    fn test_other_endpoint_or_region_is_another_environment() {
        let prod = environment("prod");
        let mut local = environment("prod");
        local.endpoint_url = Some("http://localhost:8000".to_string());
        let mut ireland = environment("prod");
        ireland.region = "eu-west-1".to_string();

        assert!(!prod.is_same_as(&local));
        assert!(!prod.is_same_as(&ireland));
    }

    #[test]
    fn test_target_display() {
        let mut local = environment("dev");
        local.endpoint_url = Some("http://localhost:8000".to_string());

        assert_eq!(
            environment("prod").target_display(),
            "stage 'prod' on AWS DynamoDB (region: eu-west-2, profile: expenses)"
        );
        assert_eq!(
            local.target_display(),
            "stage 'dev' on local DynamoDB (http://localhost:8000)"
        );
    }
}
