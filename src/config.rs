use std::{env, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use crate::web::policy::AccessPolicy;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

// Deployment fallback; override with DASHBOARD_PASSWORDS in production.
const DEFAULT_PASSWORDS: [&str; 2] = ["fridolin2026", "lutz2026"];

/// Runtime configuration, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub public_dir: PathBuf,
    pub data_dir: PathBuf,
    pub processing_dir: PathBuf,
    pub passwords: Vec<String>,
    pub session_ttl_hours: i64,
    pub access_policy: AccessPolicy,
    pub trust_forwarded_proto: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(value) => value.parse().context("PORT must be a port number")?,
            Err(_) => DEFAULT_PORT,
        };

        let public_dir = dir_from_env("PUBLIC_DIR", "public");
        let data_dir = dir_from_env("DATA_DIR", "data");
        let processing_dir = dir_from_env("PROCESSING_DIR", "processing");

        let passwords = match env::var("DASHBOARD_PASSWORDS") {
            Ok(value) => {
                let list = split_password_list(&value);
                if list.is_empty() {
                    return Err(anyhow!("DASHBOARD_PASSWORDS is set but contains no entries"));
                }
                list
            }
            Err(_) => {
                warn!("DASHBOARD_PASSWORDS not set, falling back to built-in defaults. Update it promptly.");
                DEFAULT_PASSWORDS.iter().map(|entry| entry.to_string()).collect()
            }
        };

        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(value) => value
                .parse()
                .context("SESSION_TTL_HOURS must be a whole number of hours")?,
            Err(_) => DEFAULT_SESSION_TTL_HOURS,
        };

        let access_policy = match env::var("ACCESS_POLICY") {
            Ok(value) => AccessPolicy::parse(value.trim())
                .ok_or_else(|| anyhow!("ACCESS_POLICY must be 'enforced' or 'disabled'"))?,
            Err(_) => AccessPolicy::Disabled,
        };

        let trust_forwarded_proto = env::var("TRUST_FORWARDED_PROTO")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        Ok(Self {
            port,
            public_dir,
            data_dir,
            processing_dir,
            passwords,
            session_ttl_hours,
            access_policy,
            trust_forwarded_proto,
        })
    }
}

fn dir_from_env(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".").join(default))
}

fn split_password_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_list_trims_and_drops_empty_entries() {
        let list = split_password_list(" alpha , ,beta,");
        assert_eq!(list, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn flag_accepts_common_truthy_spellings() {
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("TRUE"));
        assert!(!parse_flag(""));
    }
}
