// Run configuration: where Enterprise Manager lives, who we log in as,
// which template/zone to provision into and the database parameters to
// send. Defaults are the demonstration values; each field can be
// overridden from the environment.

use crate::error::{DemoError, Result};
use crate::models::DatabaseParams;
use crate::poll::PollSettings;
use std::time::Duration;

/// Login for the EM user that owns the DBaaS requests.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// EM console URL, e.g. `https://em.example.com:7799/em`.
    pub em_url: String,
    pub credentials: Credentials,
    /// Exact name of the service template to provision from.
    pub template_name: String,
    /// Exact name of the zone (among the template's zones) to provision into.
    pub zone_name: String,
    pub request_name: String,
    pub request_description: String,
    pub database: DatabaseParams,
    /// Status value that ends the wait for the provisioning request.
    pub terminal_status: String,
    pub poll: PollSettings,
    pub request_timeout: Duration,
    /// Pause for Enter between steps.
    pub interactive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            em_url: "https://abc.example.com:7799/em".into(),
            credentials: Credentials {
                username: "dbaas_user".into(),
                password: "secret".into(),
            },
            template_name: "Bronze Service - Single Instance Database".into(),
            zone_name: "Demo Zone".into(),
            request_name: "api test for db".into(),
            request_description: "api test for db".into(),
            database: DatabaseParams {
                username: "oracle".into(),
                password: "password".into(),
                database_sid: "apidemo".into(),
                service_name: "svc_apidemo".into(),
            },
            terminal_status: "RUNNING".into(),
            poll: PollSettings::default(),
            request_timeout: Duration::from_secs(15),
            interactive: true,
        }
    }
}

impl Config {
    /// Build a configuration from `DBAAS_*` environment variables, falling
    /// back to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        let set = |key: &str, field: &mut String| {
            if let Some(v) = lookup(key) {
                *field = v;
            }
        };
        set("DBAAS_EM_URL", &mut cfg.em_url);
        set("DBAAS_EM_USERNAME", &mut cfg.credentials.username);
        set("DBAAS_EM_PASSWORD", &mut cfg.credentials.password);
        set("DBAAS_TEMPLATE_NAME", &mut cfg.template_name);
        set("DBAAS_ZONE_NAME", &mut cfg.zone_name);
        set("DBAAS_REQUEST_NAME", &mut cfg.request_name);
        set("DBAAS_REQUEST_DESCRIPTION", &mut cfg.request_description);
        set("DBAAS_DB_USERNAME", &mut cfg.database.username);
        set("DBAAS_DB_PASSWORD", &mut cfg.database.password);
        set("DBAAS_DB_SID", &mut cfg.database.database_sid);
        set("DBAAS_DB_SERVICE_NAME", &mut cfg.database.service_name);
        set("DBAAS_TERMINAL_STATUS", &mut cfg.terminal_status);

        if let Some(secs) = seconds(&lookup, "DBAAS_POLL_INTERVAL_SECS")? {
            if secs.is_zero() {
                return Err(DemoError::InvalidSetting {
                    key: "DBAAS_POLL_INTERVAL_SECS",
                    value: "0".into(),
                });
            }
            cfg.poll.interval = secs;
        }
        if let Some(secs) = seconds(&lookup, "DBAAS_POLL_TIMEOUT_SECS")? {
            cfg.poll.max_wait = secs;
        }
        if let Some(secs) = seconds(&lookup, "DBAAS_REQUEST_TIMEOUT_SECS")? {
            cfg.request_timeout = secs;
        }
        if let Some(v) = lookup("DBAAS_INTERACTIVE") {
            cfg.interactive = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(DemoError::InvalidSetting {
                        key: "DBAAS_INTERACTIVE",
                        value: v,
                    })
                }
            };
        }
        Ok(cfg)
    }
}

fn seconds<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(|s| Some(Duration::from_secs(s)))
            .map_err(|_| DemoError::InvalidSetting { key, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = Config::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.template_name, "Bronze Service - Single Instance Database");
        assert_eq!(cfg.zone_name, "Demo Zone");
        assert_eq!(cfg.terminal_status, "RUNNING");
        assert_eq!(cfg.poll.interval, Duration::from_secs(60));
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
        assert!(cfg.interactive);
    }

    #[test]
    fn environment_overrides() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("DBAAS_EM_URL", "https://em.internal:7802/em"),
            ("DBAAS_ZONE_NAME", "West"),
            ("DBAAS_DB_SID", "orcl"),
            ("DBAAS_POLL_INTERVAL_SECS", "5"),
            ("DBAAS_INTERACTIVE", "no"),
        ]))
        .unwrap();
        assert_eq!(cfg.em_url, "https://em.internal:7802/em");
        assert_eq!(cfg.zone_name, "West");
        assert_eq!(cfg.database.database_sid, "orcl");
        assert_eq!(cfg.poll.interval, Duration::from_secs(5));
        assert!(!cfg.interactive);
    }

    #[test]
    fn bad_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("DBAAS_POLL_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            DemoError::InvalidSetting { key: "DBAAS_POLL_TIMEOUT_SECS", .. }
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("DBAAS_POLL_INTERVAL_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            DemoError::InvalidSetting { key: "DBAAS_POLL_INTERVAL_SECS", .. }
        ));
    }

    #[test]
    fn bad_interactive_flag_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("DBAAS_INTERACTIVE", "maybe")])).unwrap_err();
        match err {
            DemoError::InvalidSetting { key, value } => {
                assert_eq!(key, "DBAAS_INTERACTIVE");
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn password_not_in_debug_output() {
        let cfg = Config::default();
        let out = format!("{:?}", cfg.credentials);
        assert!(out.contains("dbaas_user"));
        assert!(!out.contains("secret"));
    }
}
