//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::DocsConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DocsConfig, ConfigError> {
    let config: DocsConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DocsConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::SortStrategy;

    const SAMPLE: &str = r#"
[routing]
public_domain = "docs.test"
public_domain_uses_https = true

[content]
backend = "127.0.0.1:3000"

[[tenants]]
slug = "pip"
version_sorting = "python-packaging"
translations = ["pip-ja"]

[[tenants.subprojects]]
alias = "api"
tenant = "pip-api"

[[tenants.versions]]
slug = "latest"

[[tenants.versions]]
slug = "21.0"
kind = "tag"

[[tenants]]
slug = "pip-ja"
default_locale = "ja"
main_locale_tenant = "pip"

[[tenants]]
slug = "pip-api"
url_pattern = "/{version}/{language}/{filename}"

[[domains]]
hostname = "pip.example.com"
tenant = "pip"
canonical = true
https = true
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.routing.public_domain, "docs.test");
        assert_eq!(config.routing.slug_header, "x-docs-slug");
        assert_eq!(config.tenants.len(), 3);
        assert_eq!(config.tenants[0].version_sorting, SortStrategy::PythonPackaging);
        assert_eq!(config.tenants[0].versions.len(), 2);
        assert!(config.domains[0].canonical);

        let store = config.build_store();
        assert_eq!(store.tenant_count(), 3);
        assert_eq!(store.domain_count(), 1);
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config("[[tenants]]\nslug = \"a\"\nurl_pattern = \"docs\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("must start with `/`"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("[[tenants]"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            load_config(Path::new("/nonexistent/docs-router.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
