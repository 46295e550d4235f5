//! Structured (Helm-style) configuration layout
//!
//! Values grouped by functional domain. Every branch is optional so partial
//! documents deserialize cleanly; unknown keys are ignored.

use crate::config::coerce::lenient;
use serde::{Deserialize, Serialize};

/// Nested configuration grouped by domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure: Option<Infrastructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Cluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_definition: Option<TaskDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scaling: Option<AutoScaling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam: Option<Iam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_discovery: Option<ServiceDiscovery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Addons>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Infrastructure {
    #[serde(default)]
    pub vpc: Option<Vpc>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpc {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    /// List or comma-separated string
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub subnets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default)]
    pub rules: Vec<SecurityGroupRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    #[serde(default, deserialize_with = "lenient::text")]
    pub cidr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub container_insights: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub launch_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub cpu: Option<u32>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub memory: Option<u32>,
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub essential: Option<bool>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub cpu: Option<u32>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub memory: Option<u32>,
    #[serde(default)]
    pub port_mappings: Vec<PortMapping>,
    #[serde(default)]
    pub environment: Vec<NameValue>,
    #[serde(default)]
    pub secrets: Vec<SecretRef>,
    #[serde(default)]
    pub health_check: Option<ContainerHealthCheck>,
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub container_port: Option<u16>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub protocol: Option<String>,
}

/// `{ name, value }` pair as written in container environment arrays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub value_from: Option<String>,
}

/// Health check with durations in whole seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerHealthCheck {
    #[serde(default, deserialize_with = "lenient::string_list_or_empty")]
    pub command: Vec<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub interval: Option<u64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub timeout: Option<u64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub retries: Option<u32>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub start_period: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default)]
    pub host: Option<HostVolume>,
    #[serde(default)]
    pub efs_volume_configuration: Option<EfsVolume>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostVolume {
    #[serde(default, deserialize_with = "lenient::text")]
    pub source_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfsVolume {
    #[serde(default, deserialize_with = "lenient::text")]
    pub file_system_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub root_directory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub service_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub desired_count: Option<u32>,
    #[serde(default)]
    pub deployment: Option<Deployment>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enable_execute_command: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub minimum_healthy_percent: Option<u32>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub maximum_percent: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub lb_type: Option<String>,
    /// `internal` or `internet-facing`
    #[serde(default, deserialize_with = "lenient::text")]
    pub scheme: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub port: Option<u16>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub certificate_arn: Option<String>,
    #[serde(default)]
    pub target_group: Option<TargetGroup>,
}

/// Target group settings; durations in whole seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroup {
    #[serde(default, deserialize_with = "lenient::text")]
    pub health_check_path: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub interval: Option<u64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub timeout: Option<u64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub healthy_threshold_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub unhealthy_threshold_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub healthy_http_codes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScaling {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub min_capacity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub metrics: Vec<ScalingMetric>,
}

/// Target-tracking metric, e.g. `{ type: CPUUtilization, target: 60 }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingMetric {
    #[serde(default, rename = "type")]
    pub metric_type: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Iam {
    #[serde(default)]
    pub task_role: Option<Role>,
    #[serde(default)]
    pub task_execution_role: Option<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub policies: Vec<Policy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDiscovery {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub namespace: Option<Namespace>,
    #[serde(default)]
    pub service: Option<DiscoveryService>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub namespace_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryService {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dns_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addons {
    #[serde(default)]
    pub logging: Option<Logging>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logging {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub retention_days: Option<u32>,
}
