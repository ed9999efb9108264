//! Factory configuration and environment detection

use std::env;
use std::str::FromStr;

use crate::context::DEFAULT_MAX_RELATION_DEPTH;
use crate::error::{FactoryError, FactoryResult};
use crate::fake_data::SeededRandom;

/// Environment types for seeding control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Staging,
    Production,
    Custom(String),
}

impl Environment {
    /// Built-in environments with their canonical name and accepted aliases
    const NAMED: [(Environment, &'static str, &'static str); 4] = [
        (Environment::Development, "development", "dev"),
        (Environment::Testing, "testing", "test"),
        (Environment::Staging, "staging", "stage"),
        (Environment::Production, "production", "prod"),
    ];

    pub fn as_str(&self) -> &str {
        if let Environment::Custom(name) = self {
            return name;
        }
        Self::NAMED
            .iter()
            .find(|(env, _, _)| env == self)
            .map_or("", |(_, name, _)| *name)
    }

    /// Seeding runs unattended everywhere except production and custom
    /// environments, which need [`crate::SeederManager::run_production_force`]
    pub fn is_safe_for_seeding(&self) -> bool {
        matches!(
            self,
            Environment::Development | Environment::Testing | Environment::Staging
        )
    }

    /// Read `ELIF_ENV`, `ENV` or `ENVIRONMENT`, defaulting to development
    pub fn current() -> Self {
        env::var("ELIF_ENV")
            .or_else(|_| env::var("ENV"))
            .or_else(|_| env::var("ENVIRONMENT"))
            .map(|value| value.parse().unwrap_or(Environment::Development))
            .unwrap_or(Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let named = Self::NAMED
            .iter()
            .find(|(_, canonical, alias)| name == *canonical || name == *alias)
            .map(|(env, _, _)| env.clone());
        Ok(named.unwrap_or(Environment::Custom(name)))
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for factory behavior
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryConfig {
    /// Seed for deterministic fake data generation
    pub seed: Option<u64>,
    /// Maximum chain of records built for one call (the record itself plus
    /// nested related records)
    pub max_relation_depth: usize,
    /// Environment seeders run in
    pub environment: Environment,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_relation_depth: DEFAULT_MAX_RELATION_DEPTH,
            environment: Environment::Development,
        }
    }
}

impl FactoryConfig {
    /// Create configuration for testing: fixed seed, testing environment
    pub fn testing() -> Self {
        Self {
            seed: Some(42),
            max_relation_depth: DEFAULT_MAX_RELATION_DEPTH,
            environment: Environment::Testing,
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `ELIF_FACTORY_SEED`: unsigned integer seed
    /// - `ELIF_FACTORY_MAX_DEPTH`: positive relation depth limit
    /// - `ELIF_ENV` / `ENV` / `ENVIRONMENT`: seeding environment
    pub fn from_env() -> FactoryResult<Self> {
        let mut config = Self {
            environment: Environment::current(),
            ..Self::default()
        };

        if let Ok(raw) = env::var("ELIF_FACTORY_SEED") {
            config.seed = Some(parse_var("ELIF_FACTORY_SEED", &raw, "an unsigned integer")?);
        }

        if let Ok(raw) = env::var("ELIF_FACTORY_MAX_DEPTH") {
            config.max_relation_depth =
                parse_var("ELIF_FACTORY_MAX_DEPTH", &raw, "a positive integer")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> FactoryResult<()> {
        if self.max_relation_depth == 0 {
            return Err(FactoryError::Configuration {
                field: "max_relation_depth".to_string(),
                value: "0".to_string(),
                expected: "a positive integer".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Random source honouring the configured seed
    pub fn random_source(&self) -> SeededRandom {
        match self.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        }
    }
}

fn parse_var<T: FromStr>(field: &str, raw: &str, expected: &str) -> FactoryResult<T> {
    raw.trim().parse().map_err(|_| FactoryError::Configuration {
        field: field.to_string(),
        value: raw.to_string(),
        expected: expected.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "ELIF_FACTORY_SEED",
            "ELIF_FACTORY_MAX_DEPTH",
            "ELIF_ENV",
            "ENV",
            "ENVIRONMENT",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("development".parse(), Ok(Environment::Development));
        assert_eq!("dev".parse(), Ok(Environment::Development));
        assert_eq!("testing".parse(), Ok(Environment::Testing));
        assert_eq!("test".parse(), Ok(Environment::Testing));
        assert_eq!("PROD".parse(), Ok(Environment::Production));
        assert_eq!(" Stage ".parse(), Ok(Environment::Staging));
        assert_eq!(
            "custom".parse(),
            Ok(Environment::Custom("custom".to_string()))
        );

        assert_eq!(Environment::Staging.as_str(), "staging");
        assert_eq!(Environment::Custom("qa".to_string()).to_string(), "qa");
    }

    #[test]
    fn test_environment_safety() {
        assert!(Environment::Development.is_safe_for_seeding());
        assert!(Environment::Testing.is_safe_for_seeding());
        assert!(Environment::Staging.is_safe_for_seeding());
        assert!(!Environment::Production.is_safe_for_seeding());
        assert!(!Environment::Custom("custom".to_string()).is_safe_for_seeding());
    }

    #[test]
    fn test_factory_config_defaults() {
        let config = FactoryConfig::default();

        assert!(config.seed.is_none());
        assert_eq!(config.max_relation_depth, DEFAULT_MAX_RELATION_DEPTH);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("ELIF_FACTORY_SEED", "1234");
        env::set_var("ELIF_FACTORY_MAX_DEPTH", "3");
        env::set_var("ELIF_ENV", "test");

        let config = FactoryConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.max_relation_depth, 3);
        assert_eq!(config.environment, Environment::Testing);
        assert_eq!(config.random_source().seed(), Some(1234));
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_values() {
        clear_env();
        env::set_var("ELIF_FACTORY_SEED", "not-a-number");
        let err = FactoryConfig::from_env().unwrap_err();
        assert!(matches!(err, FactoryError::Configuration { ref field, .. } if field == "ELIF_FACTORY_SEED"));

        clear_env();
        env::set_var("ELIF_FACTORY_MAX_DEPTH", "0");
        let err = FactoryConfig::from_env().unwrap_err();
        clear_env();
        assert!(matches!(err, FactoryError::Configuration { ref field, .. } if field == "max_relation_depth"));
    }

    #[test]
    #[serial]
    fn test_current_environment_defaults_to_development() {
        clear_env();
        assert_eq!(Environment::current(), Environment::Development);

        env::set_var("ENVIRONMENT", "staging");
        assert_eq!(Environment::current(), Environment::Staging);
        clear_env();
    }
}
