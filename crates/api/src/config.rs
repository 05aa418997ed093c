//! Process configuration, read from the environment once at startup.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

use innkeep_infra::audit::elasticsearch::DEFAULT_AUDIT_INDEX;
use innkeep_rooms::TransitionPolicy;

/// Which services this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Rooms,
    Sales,
    /// Both services in one process; the sales side calls rooms in-process.
    All,
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rooms" => Ok(Role::Rooms),
            "sales" => Ok(Role::Sales),
            "all" => Ok(Role::All),
            other => bail!("unknown role '{other}' (expected rooms, sales or all)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub role: Role,
    pub rooms_addr: SocketAddr,
    pub sales_addr: SocketAddr,
    /// Base URL of the rooms service, used by the sales side when not in-process.
    pub rooms_url: String,
    pub room_call_timeout: Duration,
    /// Unset: audit entries go to the log.
    pub audit_url: Option<String>,
    pub audit_index: String,
    pub audit_timeout: Duration,
    /// Unset: in-memory stores.
    pub database_url: Option<String>,
    pub transition_policy: TransitionPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let role = match get("INNKEEP_ROLE") {
            Some(raw) => raw.parse()?,
            None => Role::All,
        };

        let strict = match get("INNKEEP_STRICT_TRANSITIONS") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .with_context(|| format!("INNKEEP_STRICT_TRANSITIONS must be true or false, got '{raw}'"))?,
            None => false,
        };

        Ok(Self {
            role,
            rooms_addr: parse_or(get("INNKEEP_ROOMS_ADDR"), "INNKEEP_ROOMS_ADDR", "0.0.0.0:5001")?,
            sales_addr: parse_or(get("INNKEEP_SALES_ADDR"), "INNKEEP_SALES_ADDR", "0.0.0.0:5000")?,
            rooms_url: get("INNKEEP_ROOMS_URL").unwrap_or_else(|| "http://localhost:5001".to_string()),
            room_call_timeout: millis_or(get("INNKEEP_ROOM_CALL_TIMEOUT_MS"), "INNKEEP_ROOM_CALL_TIMEOUT_MS", 5_000)?,
            audit_url: get("INNKEEP_AUDIT_URL"),
            audit_index: get("INNKEEP_AUDIT_INDEX").unwrap_or_else(|| DEFAULT_AUDIT_INDEX.to_string()),
            audit_timeout: millis_or(get("INNKEEP_AUDIT_TIMEOUT_MS"), "INNKEEP_AUDIT_TIMEOUT_MS", 1_000)?,
            database_url: get("DATABASE_URL"),
            transition_policy: if strict {
                TransitionPolicy::Strict
            } else {
                TransitionPolicy::Permissive
            },
        })
    }

    pub fn serves_rooms(&self) -> bool {
        matches!(self.role, Role::Rooms | Role::All)
    }

    pub fn serves_sales(&self) -> bool {
        matches!(self.role, Role::Sales | Role::All)
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = raw.unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{key} is invalid: '{raw}'"))
}

fn millis_or(raw: Option<String>, key: &str, default: u64) -> anyhow::Result<Duration> {
    let millis: u64 = parse_or(raw, key, &default.to_string())?;
    if millis == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.role, Role::All);
        assert_eq!(cfg.rooms_addr, "0.0.0.0:5001".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.sales_addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.rooms_url, "http://localhost:5001");
        assert_eq!(cfg.room_call_timeout, Duration::from_secs(5));
        assert_eq!(cfg.audit_url, None);
        assert_eq!(cfg.audit_index, "cuartos-logs");
        assert_eq!(cfg.audit_timeout, Duration::from_secs(1));
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.transition_policy, TransitionPolicy::Permissive);
        assert!(cfg.serves_rooms() && cfg.serves_sales());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("INNKEEP_ROLE", "sales"),
            ("INNKEEP_ROOMS_URL", "http://rooms:5001"),
            ("INNKEEP_ROOM_CALL_TIMEOUT_MS", "250"),
            ("INNKEEP_STRICT_TRANSITIONS", "true"),
            ("DATABASE_URL", "postgres://localhost/innkeep"),
        ])
        .unwrap();
        assert_eq!(cfg.role, Role::Sales);
        assert!(!cfg.serves_rooms());
        assert_eq!(cfg.rooms_url, "http://rooms:5001");
        assert_eq!(cfg.room_call_timeout, Duration::from_millis(250));
        assert_eq!(cfg.transition_policy, TransitionPolicy::Strict);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/innkeep"));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = config(&[("INNKEEP_AUDIT_URL", ""), ("INNKEEP_ROLE", " ")]).unwrap();
        assert_eq!(cfg.audit_url, None);
        assert_eq!(cfg.role, Role::All);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(config(&[("INNKEEP_ROLE", "billing")]).is_err());
        assert!(config(&[("INNKEEP_ROOMS_ADDR", "nowhere")]).is_err());
        assert!(config(&[("INNKEEP_ROOM_CALL_TIMEOUT_MS", "soon")]).is_err());
        assert!(config(&[("INNKEEP_AUDIT_TIMEOUT_MS", "0")]).is_err());
        assert!(config(&[("INNKEEP_STRICT_TRANSITIONS", "maybe")]).is_err());
    }
}
