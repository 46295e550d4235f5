//! Canonical resolved configuration
//!
//! Produced once per invocation, fully defaulted and validated, then handed
//! read-only to whatever provisions the resources.

use crate::config::coerce::seconds;
use crate::config::legacy::{DeploymentConfiguration, HealthCheck, PolicyStatement, Volume};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ResolvedConfig {
    pub metadata: ResolvedMetadata,
    pub infrastructure: ResolvedInfrastructure,
    pub cluster: ResolvedCluster,
    pub task_definition: ResolvedTaskDefinition,
    pub service: ResolvedService,
    pub load_balancer: ResolvedLoadBalancer,
    pub auto_scaling: ResolvedAutoScaling,
    pub iam: ResolvedIam,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_discovery: Option<ResolvedServiceDiscovery>,
    pub addons: ResolvedAddons,
}

impl ResolvedConfig {
    /// The primary (first) container
    #[must_use]
    #[inline]
    pub fn primary_container(&self) -> Option<&ResolvedContainer> {
        self.task_definition.containers.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMetadata {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedInfrastructure {
    pub vpc: ResolvedVpc,
    /// Ingress CIDR for the load balancer security group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_cidr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVpc {
    pub id: String,
    pub subnets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCluster {
    pub name: String,
    pub container_insights: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTaskDefinition {
    #[serde(rename = "type")]
    pub launch_type: String,
    pub cpu: u32,
    pub memory: u32,
    /// Primary container first, sidecars after
    pub containers: Vec<ResolvedContainer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContainer {
    pub name: String,
    pub image: String,
    pub essential: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    pub port_mappings: Vec<ResolvedPortMapping>,
    pub environment: Vec<EnvironmentVariable>,
    pub secrets: Vec<ContainerSecret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPortMapping {
    pub container_port: u16,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSecret {
    pub name: String,
    pub value_from: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedService {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub desired_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentConfiguration>,
    pub enable_execute_command: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLoadBalancer {
    #[serde(rename = "type")]
    pub lb_type: String,
    pub protocol: String,
    pub port: u16,
    /// `false` for an internal load balancer
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<String>,
    pub target_group: ResolvedTargetGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTargetGroup {
    pub health_check_path: String,
    #[serde(with = "seconds", skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,
    #[serde(with = "seconds", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy_threshold_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy_http_codes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAutoScaling {
    pub enabled: bool,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub target_cpu_utilization: u32,
    pub target_memory_utilization: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIam {
    pub task_role_permissions: BTreeMap<String, PolicyStatement>,
    pub task_execution_role_permissions: BTreeMap<String, PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedServiceDiscovery {
    pub namespace: String,
    pub namespace_type: String,
    pub service_name: String,
    pub dns_type: String,
    pub dns_ttl: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedAddons {
    pub logging: ResolvedLogging,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLogging {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
}
