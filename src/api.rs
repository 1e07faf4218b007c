// API client module: a small blocking HTTP client that talks to the
// Enterprise Manager cloud REST API. Every call is one synchronous request
// with Basic authentication; the JSON body and the time the call took are
// handed back to the caller.

use crate::config::Config;
use crate::error::{DemoError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

/// HTTP verbs the walkthrough uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Delete,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Delete => "DELETE",
        }
    }
}

/// Vendor media types for the DB related resources. Used for both
/// `Accept` and, on POST, `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Cloud,
    DbFamily,
    ServiceTemplate,
    DbPlatformTemplate,
    SchemaPlatformTemplate,
    PluggableDbPlatformTemplate,
    DbZone,
    DbPlatformInstance,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Cloud => "application/oracle.com.cloud.common.Cloud+json",
            MediaType::DbFamily => "application/oracle.com.cloud.common.ServiceFamilyType+json",
            MediaType::ServiceTemplate => "application/oracle.com.cloud.common.ServiceTemplate+json",
            MediaType::DbPlatformTemplate => {
                "application/oracle.com.cloud.common.DbPlatformTemplate+json"
            }
            MediaType::SchemaPlatformTemplate => {
                "application/oracle.com.cloud.common.SchemaPlatformTemplate+json"
            }
            MediaType::PluggableDbPlatformTemplate => {
                "application/oracle.com.cloud.common.PluggableDbPlatformTemplate+json"
            }
            MediaType::DbZone => "application/oracle.com.cloud.common.DbZone+json",
            MediaType::DbPlatformInstance => {
                "application/oracle.com.cloud.common.DbPlatformInstance+json"
            }
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource paths, relative to the EM host.
pub mod paths {
    pub const CLOUD: &str = "/em/cloud";
    pub const DB_FAMILY: &str = "/em/cloud/service_family_type/dbaas";

    /// The DB family filtered down to its service templates.
    pub fn db_family_templates() -> String {
        format!("{}?service_templates", DB_FAMILY)
    }

    pub fn db_zone(id: &str) -> String {
        format!("/em/cloud/dbaas/zone/{}", id)
    }

    pub fn db_platform_template(id: &str) -> String {
        format!("/em/cloud/dbaas/dbplatformtemplate/{}", id)
    }

    pub fn schema_platform_template(id: &str) -> String {
        format!("/em/cloud/dbaas/schemaplatformtemplate/{}", id)
    }

    pub fn db_instance_by_request(id: &str) -> String {
        format!("/em/cloud/dbaas/dbplatforminstance/byrequest/{}", id)
    }
}

/// Decoded body of a response plus the wall-clock seconds the call took.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub body: Value,
    pub elapsed_secs: u64,
}

/// The one operation the walkthrough needs from the network. Implemented
/// by [`EmConnection`]; tests plug in scripted responses.
pub trait Transport {
    fn http_method(
        &self,
        uri: &str,
        accept: Option<MediaType>,
        method: HttpVerb,
        content_type: Option<MediaType>,
        payload: Option<&Value>,
    ) -> Result<ApiResponse>;

    /// Shorthand for a GET with an optional `Accept`.
    fn get(&self, uri: &str, accept: Option<MediaType>) -> Result<ApiResponse> {
        self.http_method(uri, accept, HttpVerb::Get, None, None)
    }
}

/// Blocking connection to one EM instance. The Authorization header is
/// encoded once here and reused for every request.
pub struct EmConnection {
    client: Client,
    base_url: String,
    auth: HeaderValue,
}

impl EmConnection {
    /// Build a connection from the run configuration. Server certificates
    /// are not validated.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(DemoError::Client)?;
        let auth = basic_auth(&config.credentials.username, &config.credentials.password)?;
        Ok(EmConnection {
            client,
            base_url: normalize_base_url(&config.em_url),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, accept: Option<MediaType>, content_type: Option<MediaType>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth.clone());
        if let Some(m) = accept {
            headers.insert(ACCEPT, HeaderValue::from_static(m.as_str()));
        }
        if let Some(m) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(m.as_str()));
        }
        headers
    }
}

impl Transport for EmConnection {
    fn http_method(
        &self,
        uri: &str,
        accept: Option<MediaType>,
        method: HttpVerb,
        content_type: Option<MediaType>,
        payload: Option<&Value>,
    ) -> Result<ApiResponse> {
        // Content-Type only travels with a POST body.
        let content_type = match method {
            HttpVerb::Post => content_type,
            _ => None,
        };
        debug!(
            method = method.as_str(),
            uri,
            accept = accept.map(MediaType::as_str),
            content_type = content_type.map(MediaType::as_str),
            "sending request"
        );

        let url = format!("{}{}", self.base_url, uri);
        let mut req = match method {
            HttpVerb::Get => self.client.get(&url),
            HttpVerb::Post => self.client.post(&url),
            HttpVerb::Delete => self.client.delete(&url),
        }
        .headers(self.headers(accept, content_type));
        if let Some(body) = payload {
            // `json` leaves an already-set Content-Type alone.
            req = req.json(body);
        }

        let transport = |source: reqwest::Error| DemoError::Transport {
            method: method.as_str(),
            uri: uri.to_string(),
            source,
        };
        let start = Instant::now();
        let res = req.send().map_err(transport)?;
        let status = res.status();
        let text = res.text().map_err(transport)?;
        let elapsed_secs = start.elapsed().as_secs();

        if !status.is_success() {
            warn!(%status, uri, "server answered with an error status");
        }
        let body = serde_json::from_str(&text).map_err(|source| DemoError::InvalidJson {
            uri: uri.to_string(),
            source,
        })?;
        Ok(ApiResponse { body, elapsed_secs })
    }
}

/// `Basic <base64(username:password)>`, flagged sensitive so it never
/// shows up in debug output.
pub fn basic_auth(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Resource paths already start with `/em`, so a console URL ending in
/// `/em` is cut back to the host part.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    url.strip_suffix("/em").unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_em_suffix() {
        assert_eq!(
            normalize_base_url("https://abc.example.com:7799/em"),
            "https://abc.example.com:7799"
        );
        assert_eq!(
            normalize_base_url("https://abc.example.com:7799/em/"),
            "https://abc.example.com:7799"
        );
        assert_eq!(
            normalize_base_url("https://abc.example.com:7799"),
            "https://abc.example.com:7799"
        );
        assert_eq!(normalize_base_url("https://system.example.com"), "https://system.example.com");
    }

    #[test]
    fn basic_auth_encodes_user_and_password() {
        let value = basic_auth("dbaas_user", "secret").unwrap();
        assert_eq!(value.to_str().unwrap(), "Basic ZGJhYXNfdXNlcjpzZWNyZXQ=");
        assert!(value.is_sensitive());
    }

    #[test]
    fn resource_paths() {
        assert_eq!(
            paths::db_family_templates(),
            "/em/cloud/service_family_type/dbaas?service_templates"
        );
        assert_eq!(paths::db_zone("F0D1"), "/em/cloud/dbaas/zone/F0D1");
        assert_eq!(
            paths::db_platform_template("AB12"),
            "/em/cloud/dbaas/dbplatformtemplate/AB12"
        );
        assert_eq!(
            paths::schema_platform_template("CD34"),
            "/em/cloud/dbaas/schemaplatformtemplate/CD34"
        );
        assert_eq!(
            paths::db_instance_by_request("101"),
            "/em/cloud/dbaas/dbplatforminstance/byrequest/101"
        );
    }

    #[test]
    fn media_type_strings() {
        assert_eq!(
            MediaType::DbZone.to_string(),
            "application/oracle.com.cloud.common.DbZone+json"
        );
        assert_eq!(
            MediaType::DbFamily.as_str(),
            "application/oracle.com.cloud.common.ServiceFamilyType+json"
        );
        assert_eq!(
            MediaType::PluggableDbPlatformTemplate.as_str(),
            "application/oracle.com.cloud.common.PluggableDbPlatformTemplate+json"
        );
    }
}
