// The walkthrough itself: discover what the cloud offers, pick a DB service
// template and zone, submit a provisioning request and wait for the new
// database. Steps run strictly in order; after each one the caller's
// `StepBoundary` is reached (the binary pauses for Enter there).

use crate::api::{paths, HttpVerb, MediaType, Transport};
use crate::config::Config;
use crate::error::{DemoError, Result};
use crate::models::{
    decode, find_by_name, CloudResource, FamilyResource, FamilyTemplates, ProvisionRequest,
    ResourceRef, ServiceTemplate, SubmittedRequest, ZoneResource,
};
use crate::poll::{wait_for_status, Finished, Sleeper};
use crate::ui::{banner, log_result, separator};
use serde_json::Value;
use tracing::info;

/// Points at which the procedure hands control back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CloudResources,
    DbFamily,
    DbFamilyTemplates,
    ServiceInstances,
    DescribeTemplate,
    SubmitRequest,
}

/// Called once each step is done. An error aborts the run.
pub trait StepBoundary {
    fn reached(&mut self, step: Step) -> Result<()>;
}

impl<F> StepBoundary for F
where
    F: FnMut(Step) -> Result<()>,
{
    fn reached(&mut self, step: Step) -> Result<()> {
        self(step)
    }
}

/// How a run ended. Not finding the template or zone is a normal end,
/// not an error.
#[derive(Debug)]
pub enum Outcome {
    Completed(Finished),
    TemplateNotFound(String),
    ZoneNotFound(String),
    /// The POST response carried no request `uri`.
    RequestRejected,
}

/// Counts reported for the cloud root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceCounts {
    pub family_types: usize,
    pub requests: usize,
    pub zones: usize,
    pub templates: usize,
}

impl ResourceCounts {
    pub fn of_cloud(cloud: &CloudResource) -> Self {
        ResourceCounts {
            family_types: cloud.service_family_types.len(),
            requests: cloud.service_requests.len(),
            zones: cloud.zones.len(),
            templates: cloud.service_templates.len(),
        }
    }
}

/// Counts reported for one service family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FamilyCounts {
    pub requests: usize,
    pub zones: usize,
    pub templates: usize,
}

impl FamilyCounts {
    pub fn of_family(family: &FamilyResource) -> Self {
        FamilyCounts {
            requests: family.service_requests.len(),
            zones: family.zones.len(),
            templates: family.service_templates.len(),
        }
    }
}

/// All service instances across `zones`, in zone order, with the summed
/// request time.
#[derive(Debug, Clone, Default)]
pub struct ZoneInstances {
    pub instances: Vec<Value>,
    pub elapsed_secs: u64,
}

pub struct Procedure<'a, T: ?Sized> {
    api: &'a T,
    config: &'a Config,
}

impl<'a, T: Transport + ?Sized> Procedure<'a, T> {
    pub fn new(api: &'a T, config: &'a Config) -> Self {
        Procedure { api, config }
    }

    /// Run every step in order.
    pub fn run<B, S>(&self, boundary: &mut B, sleeper: &mut S) -> Result<Outcome>
    where
        B: StepBoundary + ?Sized,
        S: Sleeper + ?Sized,
    {
        banner("List all resources in Cloud");
        self.cloud_resources()?;
        separator();
        boundary.reached(Step::CloudResources)?;

        banner("List all resources associated with DBaaS");
        let family = self.db_family()?;
        separator();
        boundary.reached(Step::DbFamily)?;

        banner("List all service templates within the DBaaS Family");
        self.db_family_templates()?;
        separator();
        boundary.reached(Step::DbFamilyTemplates)?;

        banner("List all DB service instances in DBaaS");
        self.service_instances(&family.zones.elements)?;
        separator();
        boundary.reached(Step::ServiceInstances)?;

        banner("Select and describe a DB service template");
        let template_ref =
            match find_by_name(&family.service_templates.elements, &self.config.template_name) {
                Some(t) => t,
                None => {
                    info!("Service template '{}' not found!", self.config.template_name);
                    return Ok(Outcome::TemplateNotFound(self.config.template_name.clone()));
                }
            };
        let template = self.describe_template(template_ref)?;
        separator();
        boundary.reached(Step::DescribeTemplate)?;

        banner("Submit a DB service template on the desired zone");
        let zone = match find_by_name(&template.zones.elements, &self.config.zone_name) {
            Some(z) => z,
            None => {
                info!("Zone '{}' not found!", self.config.zone_name);
                return Ok(Outcome::ZoneNotFound(self.config.zone_name.clone()));
            }
        };
        let submitted = self.submit_request(&template_ref.uri, &zone.uri)?;
        separator();
        boundary.reached(Step::SubmitRequest)?;

        banner("Track progress of a DB request");
        let request_uri = match submitted.uri {
            Some(uri) => uri,
            None => {
                info!("Failed to submit request!");
                return Ok(Outcome::RequestRejected);
            }
        };
        let finished = wait_for_status(
            self.api,
            &request_uri,
            &self.config.terminal_status,
            self.config.poll,
            sleeper,
        )?;
        separator();
        info!("DB creation complete!");
        Ok(Outcome::Completed(finished))
    }

    /// Step 1: everything the cloud exposes, across all service families.
    pub fn cloud_resources(&self) -> Result<CloudResource> {
        info!("Attempting GET on Cloud ...");
        let res = self.api.get(paths::CLOUD, Some(MediaType::Cloud))?;
        log_result(
            &format!("GET on Cloud succeeded. Time taken: {} sec", res.elapsed_secs),
            &res.body,
        );
        let cloud: CloudResource = decode("cloud", &res.body)?;
        let c = ResourceCounts::of_cloud(&cloud);
        info!(
            "Found {} service family types, {} service request(s), {} zone(s), and {} service template(s)",
            c.family_types, c.requests, c.zones, c.templates
        );
        Ok(cloud)
    }

    /// Step 2: the DBaaS service family.
    pub fn db_family(&self) -> Result<FamilyResource> {
        info!("Attempting GET on DB Service Family ...");
        let res = self.api.get(paths::DB_FAMILY, Some(MediaType::DbFamily))?;
        log_result(
            &format!("GET on DB Service Family succeeded. Time taken: {} sec", res.elapsed_secs),
            &res.body,
        );
        let family: FamilyResource = decode("service family", &res.body)?;
        let c = FamilyCounts::of_family(&family);
        info!(
            "Found {} service request(s), {} zone(s), and {} service template(s)",
            c.requests, c.zones, c.templates
        );
        Ok(family)
    }

    /// Step 3: the DBaaS family filtered to its service templates.
    pub fn db_family_templates(&self) -> Result<FamilyTemplates> {
        info!("Attempting GET on DB Service Family ...");
        let res = self
            .api
            .get(&paths::db_family_templates(), Some(MediaType::DbFamily))?;
        log_result(
            &format!("GET on DB Service Family succeeded. Time taken: {} sec", res.elapsed_secs),
            &res.body,
        );
        let templates: FamilyTemplates = decode("service family templates", &res.body)?;
        info!("Found {} service template(s)", templates.service_templates.len());
        Ok(templates)
    }

    /// Step 4: walk the zones one by one and gather their instances.
    pub fn service_instances(&self, zones: &[ResourceRef]) -> Result<ZoneInstances> {
        info!("Attempting to list all service instances ...");
        let mut all = ZoneInstances::default();
        for zone in zones {
            let res = self.api.get(&zone.uri, Some(MediaType::DbZone))?;
            let zone_doc: ZoneResource = decode("DB zone", &res.body)?;
            all.instances.extend(zone_doc.service_instances.elements);
            all.elapsed_secs += res.elapsed_secs;
        }
        log_result(
            &format!("GET on DB Zones succeeded. Time taken: {} sec", all.elapsed_secs),
            &Value::Array(all.instances.clone()),
        );
        info!("Found {} service instance(s)", all.instances.len());
        Ok(all)
    }

    /// Step 5: fetch the chosen template.
    pub fn describe_template(&self, template: &ResourceRef) -> Result<ServiceTemplate> {
        info!("Attempting GET on DB service template '{}' ...", template.name);
        let res = self
            .api
            .get(&template.uri, Some(MediaType::ServiceTemplate))?;
        log_result(
            &format!("GET on service template succeeded. Time taken: {} sec", res.elapsed_secs),
            &res.body,
        );
        decode("service template", &res.body)
    }

    /// Step 6: POST a provisioning request against the template.
    pub fn submit_request(&self, template_uri: &str, zone_uri: &str) -> Result<SubmittedRequest> {
        let body = provision_request(self.config, zone_uri);
        let payload = serde_json::to_value(&body).map_err(|source| DemoError::Decode {
            resource: "provisioning request",
            source,
        })?;
        let res = self.api.http_method(
            template_uri,
            Some(MediaType::DbPlatformInstance),
            HttpVerb::Post,
            Some(MediaType::DbPlatformInstance),
            Some(&payload),
        )?;
        log_result(
            &format!("POST on service template succeeded. Time taken: {} sec", res.elapsed_secs),
            &res.body,
        );
        decode("submitted request", &res.body)
    }
}

/// Payload for provisioning a database in `zone_uri`.
pub fn provision_request(config: &Config, zone_uri: &str) -> ProvisionRequest {
    ProvisionRequest {
        zone: zone_uri.to_string(),
        name: config.request_name.clone(),
        description: config.request_description.clone(),
        params: config.database.clone(),
    }
}
