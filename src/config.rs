//! Configuration management for the METS resolver

use std::env;
use std::time::Duration;

use crate::mets::IndexMode;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for one resolution request, including remote fetches
    pub request_timeout_secs: u64,
}

/// Settings passed into every resolver instance
///
/// Replaces process-wide defaults: the role-term vocabulary and the default
/// file group travel with the resolver instead of living in statics.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// File group used when a request does not name one; empty means
    /// "first available file"
    pub default_file_group: String,
    /// MODS role terms that qualify a name as the work's creator
    pub creator_role_terms: Vec<String>,
    /// Timeout for fetching an externally referenced document
    pub fetch_timeout: Duration,
    /// Maximum length of an external pointer chain
    pub max_pointer_depth: usize,
    /// Whether ids are indexed eagerly when a document is loaded
    pub index_mode: IndexMode,
    /// Whether `file:` URLs may be loaded
    pub allow_file_urls: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            default_file_group: "DEFAULT".to_string(),
            creator_role_terms: vec!["aut".to_string(), "cre".to_string()],
            fetch_timeout: Duration::from_secs(30),
            max_pointer_depth: 8,
            index_mode: IndexMode::Eager,
            allow_file_urls: false,
        }
    }
}

impl ResolverConfig {
    pub fn from_env() -> Self {
        let defaults = ResolverConfig::default();
        ResolverConfig {
            default_file_group: env::var("METS_DEFAULT_FILE_GROUP")
                .unwrap_or(defaults.default_file_group),
            creator_role_terms: env::var("METS_CREATOR_ROLES")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.creator_role_terms),
            fetch_timeout: env::var("METS_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            max_pointer_depth: env::var("METS_MAX_POINTER_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_pointer_depth),
            index_mode: match env::var("METS_CACHE_IDS").as_deref() {
                Ok("false") | Ok("0") | Ok("no") => IndexMode::OnDemand,
                _ => IndexMode::Eager,
            },
            allow_file_urls: matches!(
                env::var("METS_ALLOW_FILE_URLS").as_deref(),
                Ok("true") | Ok("1") | Ok("yes")
            ),
        }
    }

    /// Whether a MODS role term marks a creator
    pub fn is_creator_role(&self, term: &str) -> bool {
        self.creator_role_terms
            .iter()
            .any(|t| t.eq_ignore_ascii_case(term.trim()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                request_timeout_secs: 60,
            },
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60),
            },
            resolver: ResolverConfig::from_env(),
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.resolver.default_file_group, "DEFAULT");
        assert_eq!(config.resolver.index_mode, IndexMode::Eager);
        assert!(!config.resolver.allow_file_urls);
    }

    #[test]
    fn test_creator_roles() {
        let config = ResolverConfig::default();
        assert!(config.is_creator_role("aut"));
        assert!(config.is_creator_role(" CRE "));
        assert!(!config.is_creator_role("edt"));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("aut, cre,,edt "), vec!["aut", "cre", "edt"]);
        assert!(parse_list("").is_empty());
    }
}
