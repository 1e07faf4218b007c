// Typed views over the JSON documents returned by the Enterprise Manager
// cloud API, plus the provisioning payload we send. Only the fields the
// walkthrough reads are modelled; everything else in a document is
// ignored by serde.

use crate::error::{DemoError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named collections in EM documents wrap their items in `elements`.
#[derive(Deserialize, Debug, Clone)]
pub struct Collection<T> {
    pub elements: Vec<T>,
}

impl<T> Collection<T> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A `{name, uri}` entry, as used for templates and zones.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub name: String,
    pub uri: String,
}

/// `GET /em/cloud`. Entries span every service family and are only
/// counted, so they stay untyped.
#[derive(Deserialize, Debug)]
pub struct CloudResource {
    pub service_family_types: Collection<Value>,
    pub service_requests: Collection<Value>,
    pub zones: Collection<Value>,
    pub service_templates: Collection<Value>,
}

/// `GET /em/cloud/service_family_type/dbaas`
#[derive(Deserialize, Debug)]
pub struct FamilyResource {
    pub service_requests: Collection<Value>,
    pub zones: Collection<ResourceRef>,
    pub service_templates: Collection<ResourceRef>,
}

/// The family resource fetched with the `?service_templates` filter.
#[derive(Deserialize, Debug)]
pub struct FamilyTemplates {
    pub service_templates: Collection<ResourceRef>,
}

/// A DB zone; its instances are kept as raw JSON since they are only
/// counted and printed.
#[derive(Deserialize, Debug)]
pub struct ZoneResource {
    pub service_instances: Collection<Value>,
}

#[derive(Deserialize, Debug)]
pub struct ServiceTemplate {
    #[serde(default)]
    pub name: Option<String>,
    pub zones: Collection<ResourceRef>,
}

/// Response to the provisioning POST. A missing `uri` means the server
/// refused the request.
#[derive(Deserialize, Debug)]
pub struct SubmittedRequest {
    #[serde(default)]
    pub uri: Option<String>,
}

/// A DB instance looked up by its request.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InstanceStatus {
    pub status: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Database parameters nested under `params` in the provisioning payload.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DatabaseParams {
    pub username: String,
    pub password: String,
    pub database_sid: String,
    pub service_name: String,
}

/// Body of the POST against a service template.
#[derive(Serialize, Debug, Clone)]
pub struct ProvisionRequest {
    pub zone: String,
    pub name: String,
    pub description: String,
    pub params: DatabaseParams,
}

/// Decode `value` into `T`, naming `resource` in the error.
pub fn decode<T: DeserializeOwned>(resource: &'static str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|source| DemoError::Decode { resource, source })
}

/// First entry whose name matches exactly (case-sensitive).
pub fn find_by_name<'a>(refs: &'a [ResourceRef], name: &str) -> Option<&'a ResourceRef> {
    refs.iter().find(|r| r.name == name)
}
