//! Configuration resolution
//!
//! Every leaf is resolved with the same precedence:
//! explicit override > values-file value > built-in default.
//! Required fields have no default and are checked together once everything
//! else is in place.

use crate::config::coerce::{describe, to_bool, to_integer, to_string_list, to_text};
use crate::config::legacy::{
    AdditionalContainer, DeploymentConfiguration, HealthCheck, LegacyConfig,
    LoadBalancerHealthCheck, PolicyStatement, ServiceDiscovery, Volume,
};
use crate::config::overrides::Overrides;
use crate::config::resolved::{
    ContainerSecret, EnvironmentVariable, ResolvedAddons, ResolvedAutoScaling, ResolvedCluster,
    ResolvedConfig, ResolvedContainer, ResolvedIam, ResolvedInfrastructure, ResolvedLoadBalancer,
    ResolvedLogging, ResolvedMetadata, ResolvedPortMapping, ResolvedService,
    ResolvedServiceDiscovery, ResolvedTargetGroup, ResolvedTaskDefinition, ResolvedVpc,
};
use crate::config::validation::RequiredFields;
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Built-in defaults for optional fields
pub mod defaults {
    pub const VERSION: &str = "1.0.0";
    pub const CONTAINER_INSIGHTS: bool = true;
    pub const LAUNCH_TYPE: &str = "FARGATE";
    pub const CPU: u32 = 256;
    pub const MEMORY: u32 = 512;
    pub const CONTAINER_NAME: &str = "app";
    pub const PORT_PROTOCOL: &str = "tcp";
    pub const SERVICE_TYPE: &str = "LOAD_BALANCED";
    pub const DESIRED_COUNT: u32 = 1;
    pub const ENABLE_EXECUTE_COMMAND: bool = false;
    pub const LOAD_BALANCER_TYPE: &str = "APPLICATION";
    pub const LB_PROTOCOL: &str = "HTTP";
    pub const PUBLIC_LOAD_BALANCER: bool = true;
    pub const HEALTH_CHECK_PATH: &str = "/";
    pub const AUTO_SCALING_ENABLED: bool = false;
    pub const MIN_CAPACITY: u32 = 1;
    pub const MAX_CAPACITY: u32 = 10;
    pub const TARGET_CPU_UTILIZATION: u32 = 70;
    pub const TARGET_MEMORY_UTILIZATION: u32 = 70;
    pub const NAMESPACE_TYPE: &str = "PRIVATE_DNS";
    pub const DNS_TYPE: &str = "A";
    pub const DNS_TTL: u32 = 60;
}

/// Everything one resolution pass reads, passed explicitly
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveInput {
    /// Values file contents, already projected to the flat layout
    pub values: LegacyConfig,
    pub overrides: Overrides,
    /// Deployment identifier, the fallback for `metadata.name`
    pub deployment_name: String,
}

/// Resolve, default and validate a configuration
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` naming every required field that no
/// source provided
#[inline]
pub fn resolve(input: &ResolveInput) -> Result<ResolvedConfig, ConfigError> {
    let layers = Layers(&input.overrides);
    let file = &input.values;

    let name = layers
        .text("name", file.name.as_ref())
        .unwrap_or_else(|| input.deployment_name.clone());
    let metadata = ResolvedMetadata {
        version: layers
            .text("version", file.version.as_ref())
            .unwrap_or_else(|| defaults::VERSION.to_owned()),
        name,
    };

    let required = RequiredFields {
        vpc_id: layers.text("vpcId", file.vpc_id.as_ref()),
        cluster_name: layers.text("clusterName", file.cluster_name.as_ref()),
        image: layers.text("image", file.image.as_ref()),
        container_port: layers.integer("containerPort", file.container_port),
        lb_port: layers.integer("lbPort", file.lb_port),
    };

    let subnets = layers.list("subnetIds", file.subnet_ids.as_ref()).unwrap_or_default();
    let allowed_cidr = layers.text("allowedCidr", file.allowed_cidr.as_ref());
    let container_insights = layers
        .flag("containerInsights", file.container_insights)
        .unwrap_or(defaults::CONTAINER_INSIGHTS);

    let launch_type = layers
        .text("launchType", file.launch_type.as_ref())
        .map_or_else(|| defaults::LAUNCH_TYPE.to_owned(), |t| t.to_ascii_uppercase());
    let cpu = layers.integer("cpu", file.cpu).unwrap_or(defaults::CPU);
    let memory = layers.integer("memory", file.memory).unwrap_or(defaults::MEMORY);
    let container_name = layers
        .text("containerName", file.container_name.as_ref())
        .unwrap_or_else(|| defaults::CONTAINER_NAME.to_owned());
    let environment = merged_map(
        layers.string_map("environment", file.environment.as_ref()),
        input.overrides.environment(),
    );
    let secrets = merged_map(
        layers.string_map("secrets", file.secrets.as_ref()),
        input.overrides.secrets(),
    );
    let health_check: Option<HealthCheck> = layers.object("healthCheck", file.health_check.as_ref());
    let volumes: Vec<Volume> = layers.object("volumes", file.volumes.as_ref()).unwrap_or_default();
    let sidecars: Vec<AdditionalContainer> = layers
        .object("additionalContainers", file.additional_containers.as_ref())
        .unwrap_or_default();

    let service_type = layers
        .text("serviceType", file.service_type.as_ref())
        .map_or_else(|| defaults::SERVICE_TYPE.to_owned(), |t| t.to_ascii_uppercase());
    let desired_count = layers
        .integer("desiredCount", file.desired_count)
        .unwrap_or(defaults::DESIRED_COUNT);
    let deployment: Option<DeploymentConfiguration> =
        layers.object("deploymentConfiguration", file.deployment_configuration.as_ref());
    let enable_execute_command = layers
        .flag("enableExecuteCommand", file.enable_execute_command)
        .unwrap_or(defaults::ENABLE_EXECUTE_COMMAND);
    let service_name = layers
        .text("serviceName", file.service_name.as_ref())
        .unwrap_or_else(|| metadata.name.clone());

    let lb_type = layers
        .text("loadBalancerType", file.load_balancer_type.as_ref())
        .map_or_else(|| defaults::LOAD_BALANCER_TYPE.to_owned(), |t| t.to_ascii_uppercase());
    let lb_protocol = layers
        .text("lbProtocol", file.lb_protocol.as_ref())
        .map_or_else(|| defaults::LB_PROTOCOL.to_owned(), |p| p.to_ascii_uppercase());
    let public = layers
        .flag("publicLoadBalancer", file.public_load_balancer)
        .unwrap_or(defaults::PUBLIC_LOAD_BALANCER);
    let certificate_arn = layers.text("certificateArn", file.certificate_arn.as_ref());
    // Both override forms of the path beat both file forms
    let lb_health_override: Option<LoadBalancerHealthCheck> =
        layers.overridden_object("loadBalancerHealthCheck");
    let health_check_path = layers
        .overridden_text("healthCheckPath")
        .or_else(|| lb_health_override.as_ref().and_then(|h| h.path.clone()))
        .or_else(|| file.health_check_path.clone())
        .or_else(|| {
            file.load_balancer_health_check
                .as_ref()
                .and_then(|h| h.path.clone())
        })
        .unwrap_or_else(|| defaults::HEALTH_CHECK_PATH.to_owned());
    let lb_health = lb_health_override
        .or_else(|| file.load_balancer_health_check.clone())
        .unwrap_or_default();

    let auto_scaling = ResolvedAutoScaling {
        enabled: layers
            .flag("enableAutoScaling", file.enable_auto_scaling)
            .unwrap_or(defaults::AUTO_SCALING_ENABLED),
        min_capacity: layers
            .integer("minCapacity", file.min_capacity)
            .unwrap_or(defaults::MIN_CAPACITY),
        max_capacity: layers
            .integer("maxCapacity", file.max_capacity)
            .unwrap_or(defaults::MAX_CAPACITY),
        target_cpu_utilization: layers
            .integer("targetCpuUtilization", file.target_cpu_utilization)
            .unwrap_or(defaults::TARGET_CPU_UTILIZATION),
        target_memory_utilization: layers
            .integer("targetMemoryUtilization", file.target_memory_utilization)
            .unwrap_or(defaults::TARGET_MEMORY_UTILIZATION),
    };
    if auto_scaling.min_capacity > auto_scaling.max_capacity {
        warn!(
            "minCapacity {} exceeds maxCapacity {}",
            auto_scaling.min_capacity, auto_scaling.max_capacity
        );
    }

    let iam = ResolvedIam {
        task_role_permissions: layers
            .object::<BTreeMap<String, PolicyStatement>>(
                "taskRolePermissions",
                file.task_role_permissions.as_ref(),
            )
            .unwrap_or_default(),
        task_execution_role_permissions: layers
            .object::<BTreeMap<String, PolicyStatement>>(
                "taskExecutionRolePermissions",
                file.task_execution_role_permissions.as_ref(),
            )
            .unwrap_or_default(),
    };

    let service_discovery = layers
        .object::<ServiceDiscovery>("serviceDiscovery", file.service_discovery.as_ref())
        .and_then(|discovery| resolve_service_discovery(discovery, &service_name));

    let log_retention_days = layers.integer("logRetentionDays", file.log_retention_days);

    debug!("Stage DEFAULTS_APPLIED");
    let required = required.validate()?;

    let primary = ResolvedContainer {
        name: container_name,
        image: required.image,
        essential: true,
        cpu: None,
        memory: None,
        port_mappings: vec![ResolvedPortMapping {
            container_port: required.container_port,
            protocol: defaults::PORT_PROTOCOL.to_owned(),
        }],
        environment: environment
            .into_iter()
            .map(|(name, value)| EnvironmentVariable { name, value })
            .collect(),
        secrets: secrets
            .into_iter()
            .map(|(name, value_from)| ContainerSecret { name, value_from })
            .collect(),
        health_check,
        command: None,
    };
    let containers = std::iter::once(primary)
        .chain(sidecars.into_iter().filter_map(resolve_sidecar))
        .collect();

    Ok(ResolvedConfig {
        metadata,
        infrastructure: ResolvedInfrastructure {
            vpc: ResolvedVpc {
                id: required.vpc_id,
                subnets,
            },
            allowed_cidr,
        },
        cluster: ResolvedCluster {
            name: required.cluster_name,
            container_insights,
        },
        task_definition: ResolvedTaskDefinition {
            launch_type,
            cpu,
            memory,
            containers,
            volumes,
        },
        service: ResolvedService {
            name: service_name,
            service_type,
            desired_count,
            deployment,
            enable_execute_command,
        },
        load_balancer: ResolvedLoadBalancer {
            lb_type,
            protocol: lb_protocol,
            port: required.lb_port,
            public,
            certificate_arn,
            target_group: ResolvedTargetGroup {
                health_check_path,
                interval: lb_health.interval,
                timeout: lb_health.timeout,
                healthy_threshold_count: lb_health.healthy_threshold_count,
                unhealthy_threshold_count: lb_health.unhealthy_threshold_count,
                healthy_http_codes: lb_health.healthy_http_codes,
            },
        },
        auto_scaling,
        iam,
        service_discovery,
        addons: ResolvedAddons {
            logging: ResolvedLogging {
                retention_days: log_retention_days,
            },
        },
    })
}

/// Layered lookup: legacy override first, then the file value
struct Layers<'cfg>(&'cfg Overrides);

impl Layers<'_> {
    fn text(&self, key: &str, file: Option<&String>) -> Option<String> {
        self.overridden_text(key).or_else(|| file.cloned())
    }

    fn overridden_text(&self, key: &str) -> Option<String> {
        self.0.legacy(key).and_then(to_text)
    }

    fn integer<T: TryFrom<i64>>(&self, key: &str, file: Option<T>) -> Option<T> {
        let overridden = self.0.legacy(key).and_then(|raw| {
            let parsed = to_integer::<T>(raw);
            if parsed.is_none() {
                warn!(
                    "Ignoring invalid numeric override {key}={}; falling back to values file or default",
                    describe(raw)
                );
            }
            parsed
        });
        overridden.or(file)
    }

    fn flag(&self, key: &str, file: Option<bool>) -> Option<bool> {
        self.0
            .legacy(key)
            .map(|raw| {
                to_bool(raw).unwrap_or_else(|| {
                    warn!("Invalid boolean override {key}={}; treating as false", describe(raw));
                    false
                })
            })
            .or(file)
    }

    fn list(&self, key: &str, file: Option<&Vec<String>>) -> Option<Vec<String>> {
        self.0
            .legacy(key)
            .map(to_string_list)
            .or_else(|| file.cloned())
    }

    fn string_map(
        &self,
        key: &str,
        file: Option<&BTreeMap<String, String>>,
    ) -> Option<BTreeMap<String, String>> {
        let overridden: Option<BTreeMap<String, String>> = self
            .0
            .legacy(key)
            .and_then(|raw| parse_object::<BTreeMap<String, Value>>(key, raw))
            .map(|map| {
                map.into_iter()
                    .filter_map(|(name, raw)| to_text(&raw).map(|text| (name, text)))
                    .collect()
            });
        overridden.or_else(|| file.cloned())
    }

    /// Whole-object override, given as JSON text or an already parsed value
    fn object<T: DeserializeOwned + Clone>(&self, key: &str, file: Option<&T>) -> Option<T> {
        self.overridden_object(key).or_else(|| file.cloned())
    }

    fn overridden_object<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0.legacy(key).and_then(|raw| parse_object::<T>(key, raw))
    }
}

fn parse_object<T: DeserializeOwned>(key: &str, raw: &Value) -> Option<T> {
    let parsed = match *raw {
        Value::String(ref text) => serde_json::from_str::<T>(text),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            serde_json::from_value::<T>(raw.clone())
        }
    };
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring invalid override {key}={}: {e}", describe(raw));
            None
        }
    }
}

/// Base map with ambient `env:`/`secret:` entries layered on top
fn merged_map(
    base: Option<BTreeMap<String, String>>,
    ambient: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = base.unwrap_or_default();
    merged.extend(ambient.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Sidecars without a name or image cannot be deployed and are skipped
fn resolve_sidecar(sidecar: AdditionalContainer) -> Option<ResolvedContainer> {
    let (Some(name), Some(image)) = (sidecar.name, sidecar.image) else {
        warn!("Skipping additional container without a name or image");
        return None;
    };
    Some(ResolvedContainer {
        name,
        image,
        essential: sidecar.essential.unwrap_or(true),
        cpu: sidecar.cpu,
        memory: sidecar.memory,
        port_mappings: sidecar
            .container_port
            .map(|container_port| ResolvedPortMapping {
                container_port,
                protocol: defaults::PORT_PROTOCOL.to_owned(),
            })
            .into_iter()
            .collect(),
        environment: sidecar
            .environment
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| EnvironmentVariable { name, value })
            .collect(),
        secrets: Vec::new(),
        health_check: None,
        command: sidecar.command,
    })
}

/// Registration is on when explicitly enabled or when a namespace is named
fn resolve_service_discovery(
    discovery: ServiceDiscovery,
    service_name: &str,
) -> Option<ResolvedServiceDiscovery> {
    let enabled = discovery.enabled.unwrap_or(discovery.namespace.is_some());
    if !enabled {
        return None;
    }
    let Some(namespace) = discovery.namespace else {
        warn!("Service discovery enabled without a namespace; skipping registration");
        return None;
    };
    Some(ResolvedServiceDiscovery {
        namespace,
        namespace_type: discovery
            .namespace_type
            .unwrap_or_else(|| defaults::NAMESPACE_TYPE.to_owned()),
        service_name: discovery
            .service_name
            .unwrap_or_else(|| service_name.to_owned()),
        dns_type: discovery
            .dns_type
            .unwrap_or_else(|| defaults::DNS_TYPE.to_owned()),
        dns_ttl: discovery.dns_ttl.unwrap_or(defaults::DNS_TTL),
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::config::shape::ValuesDocument;
    use serde_json::json;

    fn input(values: Value, context: &[(&str, Value)]) -> ResolveInput {
        let Value::Object(raw) = values else {
            panic!("fixture must be an object");
        };
        let overrides = Overrides::from_context(
            context
                .iter()
                .map(|(key, value)| ((*key).to_owned(), value.clone())),
        );
        let mut values = ValuesDocument::classify(raw).unwrap().into_legacy();
        overrides.apply_structured(&mut values).unwrap();
        ResolveInput {
            values,
            overrides,
            deployment_name: "web".to_owned(),
        }
    }

    fn required() -> Value {
        json!({
            "vpcId": "vpc-1",
            "clusterName": "c1",
            "image": "nginx:alpine",
            "containerPort": 80,
            "lbPort": 80
        })
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let config = resolve(&input(required(), &[])).unwrap();

        assert_eq!(config.metadata.name, "web");
        assert_eq!(config.metadata.version, "1.0.0");
        assert!(config.infrastructure.vpc.subnets.is_empty());
        assert!(config.cluster.container_insights);
        assert_eq!(config.task_definition.launch_type, "FARGATE");
        assert_eq!(config.task_definition.cpu, 256);
        assert_eq!(config.task_definition.memory, 512);
        assert_eq!(config.service.service_type, "LOAD_BALANCED");
        assert_eq!(config.service.desired_count, 1);
        assert_eq!(config.service.name, "web");
        assert_eq!(config.load_balancer.lb_type, "APPLICATION");
        assert_eq!(config.load_balancer.protocol, "HTTP");
        assert!(config.load_balancer.public);
        assert_eq!(config.load_balancer.target_group.health_check_path, "/");
        assert!(!config.auto_scaling.enabled);
        assert_eq!(config.auto_scaling.min_capacity, 1);
        assert_eq!(config.auto_scaling.max_capacity, 10);
        assert_eq!(config.auto_scaling.target_cpu_utilization, 70);
        assert_eq!(config.auto_scaling.target_memory_utilization, 70);
        assert!(config.service_discovery.is_none());

        let primary = config.primary_container().unwrap();
        assert_eq!(primary.name, "app");
        assert!(primary.essential);
        assert_eq!(primary.port_mappings[0].protocol, "tcp");
    }

    #[test]
    fn override_beats_file_value() {
        let mut values = required();
        values["cpu"] = json!(1024);
        values["clusterName"] = json!("from-file");

        let config = resolve(&input(
            values,
            &[("cpu", json!("2048")), ("clusterName", json!("from-override"))],
        ))
        .unwrap();

        assert_eq!(config.task_definition.cpu, 2048);
        assert_eq!(config.cluster.name, "from-override");
    }

    #[test]
    fn string_and_number_overrides_agree() {
        let as_string = resolve(&input(required(), &[("cpu", json!("512"))])).unwrap();
        let as_number = resolve(&input(required(), &[("cpu", json!(512))])).unwrap();
        assert_eq!(as_string.task_definition.cpu, 512);
        assert_eq!(as_string, as_number);
    }

    #[test]
    fn invalid_numeric_override_falls_back_to_default() {
        let config = resolve(&input(required(), &[("cpu", json!("notanumber"))])).unwrap();
        assert_eq!(config.task_definition.cpu, 256);
    }

    #[test]
    fn invalid_numeric_override_falls_back_to_file() {
        let mut values = required();
        values["memory"] = json!(2048);
        let config = resolve(&input(values, &[("memory", json!("lots"))])).unwrap();
        assert_eq!(config.task_definition.memory, 2048);
    }

    #[test]
    fn boolean_overrides() {
        let config = resolve(&input(
            required(),
            &[
                ("containerInsights", json!("FALSE")),
                ("enableAutoScaling", json!("True")),
                ("publicLoadBalancer", json!("nope")),
            ],
        ))
        .unwrap();
        assert!(!config.cluster.container_insights);
        assert!(config.auto_scaling.enabled);
        assert!(!config.load_balancer.public);
    }

    #[test]
    fn subnets_accept_comma_string_or_list() {
        let from_string =
            resolve(&input(required(), &[("subnetIds", json!("subnet-a,subnet-b"))])).unwrap();
        assert_eq!(from_string.infrastructure.vpc.subnets, vec!["subnet-a", "subnet-b"]);

        let from_list =
            resolve(&input(required(), &[("subnetIds", json!(["subnet-a", "subnet-b"]))])).unwrap();
        assert_eq!(from_list.infrastructure.vpc.subnets, vec!["subnet-a", "subnet-b"]);

        let structured = resolve(&input(
            json!({
                "cluster": { "name": "c1" },
                "taskDefinition": {
                    "containers": [{ "image": "nginx:alpine", "portMappings": [{ "containerPort": 80 }] }]
                },
                "loadBalancer": { "port": 80 }
            }),
            &[(
                "infrastructure",
                json!(r#"{"vpc": {"id": "vpc-9", "subnets": "subnet-a,subnet-b"}}"#),
            )],
        ))
        .unwrap();
        assert_eq!(structured.infrastructure.vpc.id, "vpc-9");
        assert_eq!(structured.infrastructure.vpc.subnets, vec!["subnet-a", "subnet-b"]);
    }

    #[test]
    fn missing_vpc_is_reported_alone() {
        let mut values = required();
        values.as_object_mut().unwrap().remove("vpcId");

        let err = resolve(&input(values, &[])).unwrap_err();
        assert_eq!(err.missing_paths(), vec!["infrastructure.vpc.id"]);
        assert!(err.to_string().contains("--context vpcId=<value>"));
    }

    #[test]
    fn missing_cluster_and_lb_port_are_aggregated() {
        let mut values = required();
        let map = values.as_object_mut().unwrap();
        map.remove("clusterName");
        map.remove("lbPort");

        let err = resolve(&input(values, &[])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cluster.name"));
        assert!(message.contains("loadBalancer.port"));
        assert_eq!(err.missing_paths().len(), 2);
    }

    #[test]
    fn required_field_from_override_only() {
        let mut values = required();
        values.as_object_mut().unwrap().remove("image");
        let config = resolve(&input(values, &[("image", json!("httpd:2"))])).unwrap();
        assert_eq!(config.primary_container().unwrap().image, "httpd:2");
    }

    #[test]
    fn structured_and_legacy_resolve_identically() {
        let structured = json!({
            "infrastructure": {
                "vpc": { "id": "vpc-1", "subnets": ["subnet-a"] },
                "securityGroups": [{ "name": "lb", "rules": [{ "cidr": "10.0.0.0/8" }] }]
            },
            "cluster": { "name": "c1" },
            "taskDefinition": {
                "cpu": 512,
                "containers": [{
                    "name": "web",
                    "image": "nginx:alpine",
                    "portMappings": [{ "containerPort": 80 }],
                    "environment": [{ "name": "MODE", "value": "prod" }]
                }]
            },
            "loadBalancer": { "port": 80, "scheme": "internal" }
        });
        let legacy = json!({
            "vpcId": "vpc-1",
            "subnetIds": "subnet-a",
            "allowedCidr": "10.0.0.0/8",
            "clusterName": "c1",
            "cpu": "512",
            "containerName": "web",
            "image": "nginx:alpine",
            "containerPort": 80,
            "environment": { "MODE": "prod" },
            "lbPort": 80,
            "publicLoadBalancer": false
        });

        let from_structured = resolve(&input(structured, &[])).unwrap();
        let from_legacy = resolve(&input(legacy, &[])).unwrap();
        assert_eq!(from_structured, from_legacy);
    }

    #[test]
    fn ambient_environment_wins_per_name() {
        let mut values = required();
        values["environment"] = json!({ "MODE": "dev", "REGION": "eu-west-1" });
        values["secrets"] = json!({ "DB": "arn:old" });

        let config = resolve(&input(
            values,
            &[
                ("env:MODE", json!("prod")),
                ("env:ALPHA", json!("1")),
                ("secret:DB", json!("arn:new")),
            ],
        ))
        .unwrap();

        let primary = config.primary_container().unwrap();
        let env: Vec<(&str, &str)> = primary
            .environment
            .iter()
            .map(|var| (var.name.as_str(), var.value.as_str()))
            .collect();
        assert_eq!(env, vec![("ALPHA", "1"), ("MODE", "prod"), ("REGION", "eu-west-1")]);
        assert_eq!(primary.secrets[0].value_from, "arn:new");
    }

    #[test]
    fn object_override_accepts_json_text() {
        let config = resolve(&input(
            required(),
            &[(
                "deploymentConfiguration",
                json!(r#"{"minimumHealthyPercent": 50, "maximumPercent": 200}"#),
            )],
        ))
        .unwrap();
        let deployment = config.service.deployment.unwrap();
        assert_eq!(deployment.minimum_healthy_percent, Some(50));
        assert_eq!(deployment.maximum_percent, Some(200));
    }

    #[test]
    fn enumerations_are_upper_cased() {
        let config = resolve(&input(
            required(),
            &[("launchType", json!("ec2")), ("lbProtocol", json!("https"))],
        ))
        .unwrap();
        assert_eq!(config.task_definition.launch_type, "EC2");
        assert_eq!(config.load_balancer.protocol, "HTTPS");
    }

    #[test]
    fn sidecars_follow_primary() {
        let mut values = required();
        values["additionalContainers"] = json!([
            { "name": "proxy", "image": "envoy:1", "containerPort": 9901, "essential": false }
        ]);
        let config = resolve(&input(values, &[])).unwrap();

        let containers = &config.task_definition.containers;
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1].name, "proxy");
        assert!(!containers[1].essential);
        assert_eq!(containers[1].port_mappings[0].container_port, 9901);
    }

    #[test]
    fn incomplete_sidecars_are_skipped() {
        let mut values = required();
        values["additionalContainers"] = json!([
            { "name": "proxy" },
            { "image": "busybox" },
            { "name": "agent", "image": "datadog/agent:7" }
        ]);
        let config = resolve(&input(values, &[])).unwrap();

        let names: Vec<&str> = config
            .task_definition
            .containers
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["app", "agent"]);
    }

    #[test]
    fn health_check_path_override_beats_file_path() {
        let mut values = required();
        values["healthCheckPath"] = json!("/file");

        let nested = resolve(&input(
            values.clone(),
            &[("loadBalancerHealthCheck", json!({ "path": "/override" }))],
        ))
        .unwrap();
        assert_eq!(nested.load_balancer.target_group.health_check_path, "/override");

        let flat = resolve(&input(
            values.clone(),
            &[
                ("healthCheckPath", json!("/flat")),
                ("loadBalancerHealthCheck", json!({ "path": "/override" })),
            ],
        ))
        .unwrap();
        assert_eq!(flat.load_balancer.target_group.health_check_path, "/flat");

        values["loadBalancerHealthCheck"] = json!({ "path": "/nested-file", "interval": 15 });
        let from_file = resolve(&input(values, &[])).unwrap();
        assert_eq!(from_file.load_balancer.target_group.health_check_path, "/file");
        assert_eq!(
            from_file.load_balancer.target_group.interval,
            Some(core::time::Duration::from_secs(15))
        );
    }

    #[test]
    fn service_discovery_enabled_by_namespace() {
        let mut values = required();
        values["serviceDiscovery"] = json!({ "namespace": "internal.local" });
        let config = resolve(&input(values, &[])).unwrap();

        let discovery = config.service_discovery.unwrap();
        assert_eq!(discovery.namespace, "internal.local");
        assert_eq!(discovery.service_name, "web");
        assert_eq!(discovery.dns_type, "A");
        assert_eq!(discovery.dns_ttl, 60);
    }

    #[test]
    fn resolved_config_passes_validation() {
        let config = resolve(&input(required(), &[])).unwrap();
        assert!(crate::config::validation::validate_resolved(&config).is_ok());
    }
}
