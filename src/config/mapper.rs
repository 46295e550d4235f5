//! Projection of structured configuration onto the flat legacy layout
//!
//! Every projection is null-safe: a missing branch produces a missing target
//! field, never an error.

use crate::config::legacy::{
    AdditionalContainer, DeploymentConfiguration, HealthCheck, LegacyConfig,
    LoadBalancerHealthCheck, PolicyStatement, ServiceDiscovery, Volume,
};
use crate::config::shape;
use crate::config::structured::{
    self, Container, ContainerHealthCheck, NameValue, Policy, ScalingMetric, SecretRef,
    StructuredConfig, TargetGroup,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Metric type matched for CPU target tracking
pub const CPU_METRIC: &str = "CPUUtilization";
/// Metric type matched for memory target tracking
pub const MEMORY_METRIC: &str = "MemoryUtilization";

/// Check whether a raw configuration uses the structured layout
#[must_use]
#[inline]
pub fn is_structured_config(config: &Value) -> bool {
    shape::is_structured_config(config)
}

/// Project a structured configuration onto the legacy flat fields
#[must_use]
#[inline]
pub fn structured_to_legacy(config: &StructuredConfig) -> LegacyConfig {
    let metadata = config.metadata.as_ref();
    let infrastructure = config.infrastructure.as_ref();
    let vpc = infrastructure.and_then(|infra| infra.vpc.as_ref());
    let cluster = config.cluster.as_ref();
    let task = config.task_definition.as_ref();
    let primary = task.and_then(|t| t.containers.first());
    let service = config.service.as_ref();
    let load_balancer = config.load_balancer.as_ref();
    let auto_scaling = config.auto_scaling.as_ref();
    let iam = config.iam.as_ref();

    LegacyConfig {
        name: metadata.and_then(|m| m.name.clone()),
        version: metadata.and_then(|m| m.version.clone()),

        vpc_id: vpc.and_then(|v| v.id.clone()),
        subnet_ids: vpc.and_then(|v| v.subnets.clone()),
        allowed_cidr: infrastructure
            .and_then(|infra| infra.security_groups.first())
            .and_then(|group| group.rules.first())
            .and_then(|rule| rule.cidr.clone()),

        cluster_name: cluster.and_then(|c| c.name.clone()),
        container_insights: cluster.and_then(|c| c.container_insights),

        launch_type: task.and_then(|t| t.launch_type.clone()),
        cpu: task.and_then(|t| t.cpu),
        memory: task.and_then(|t| t.memory),
        container_name: primary.and_then(|c| c.name.clone()),
        image: primary.and_then(|c| c.image.clone()),
        container_port: primary
            .and_then(|c| c.port_mappings.first())
            .and_then(|mapping| mapping.container_port),
        environment: primary
            .filter(|c| !c.environment.is_empty())
            .map(|c| environment_to_map(&c.environment)),
        secrets: primary
            .filter(|c| !c.secrets.is_empty())
            .map(|c| secrets_to_map(&c.secrets)),
        health_check: primary
            .and_then(|c| c.health_check.as_ref())
            .map(map_health_check),
        volumes: task
            .filter(|t| !t.volumes.is_empty())
            .map(|t| t.volumes.iter().filter_map(map_volume).collect()),
        additional_containers: task
            .filter(|t| t.containers.len() > 1)
            .map(|t| t.containers.iter().skip(1).filter_map(map_sidecar).collect()),

        service_name: service.and_then(|s| s.name.clone()),
        service_type: service.and_then(|s| s.service_type.clone()),
        desired_count: service.and_then(|s| s.desired_count),
        deployment_configuration: service.and_then(|s| s.deployment).map(|d| {
            DeploymentConfiguration {
                minimum_healthy_percent: d.minimum_healthy_percent,
                maximum_percent: d.maximum_percent,
            }
        }),
        enable_execute_command: service.and_then(|s| s.enable_execute_command),

        load_balancer_type: load_balancer.and_then(|lb| lb.lb_type.clone()),
        lb_protocol: load_balancer.and_then(|lb| lb.protocol.clone()),
        lb_port: load_balancer.and_then(|lb| lb.port),
        public_load_balancer: load_balancer
            .map(|lb| lb.scheme.as_deref() != Some("internal")),
        certificate_arn: load_balancer.and_then(|lb| lb.certificate_arn.clone()),
        health_check_path: load_balancer
            .and_then(|lb| lb.target_group.as_ref())
            .and_then(|tg| tg.health_check_path.clone()),
        load_balancer_health_check: load_balancer
            .and_then(|lb| lb.target_group.as_ref())
            .map(map_target_group),

        enable_auto_scaling: auto_scaling.and_then(|a| a.enabled),
        min_capacity: auto_scaling.and_then(|a| a.min_capacity),
        max_capacity: auto_scaling.and_then(|a| a.max_capacity),
        target_cpu_utilization: auto_scaling.and_then(|a| metric_target(&a.metrics, CPU_METRIC)),
        target_memory_utilization: auto_scaling
            .and_then(|a| metric_target(&a.metrics, MEMORY_METRIC)),

        task_role_permissions: iam
            .and_then(|i| i.task_role.as_ref())
            .map(|role| policies_to_map(&role.policies)),
        task_execution_role_permissions: iam
            .and_then(|i| i.task_execution_role.as_ref())
            .map(|role| policies_to_map(&role.policies)),

        service_discovery: config.service_discovery.as_ref().map(map_service_discovery),

        log_retention_days: config
            .addons
            .as_ref()
            .and_then(|a| a.logging.as_ref())
            .and_then(|l| l.retention_days),
    }
}

/// Replace the flat fields owned by one structured domain with those of `source`
///
/// Fields of other domains are left untouched, so a partial projection can be
/// layered over a complete one. Unknown domains are ignored.
#[inline]
pub fn replace_domain(target: &mut LegacyConfig, domain: &str, source: LegacyConfig) {
    match domain {
        "metadata" => {
            target.name = source.name;
            target.version = source.version;
        }
        "infrastructure" => {
            target.vpc_id = source.vpc_id;
            target.subnet_ids = source.subnet_ids;
            target.allowed_cidr = source.allowed_cidr;
        }
        "cluster" => {
            target.cluster_name = source.cluster_name;
            target.container_insights = source.container_insights;
        }
        "taskDefinition" => {
            target.launch_type = source.launch_type;
            target.cpu = source.cpu;
            target.memory = source.memory;
            target.container_name = source.container_name;
            target.image = source.image;
            target.container_port = source.container_port;
            target.environment = source.environment;
            target.secrets = source.secrets;
            target.health_check = source.health_check;
            target.volumes = source.volumes;
            target.additional_containers = source.additional_containers;
        }
        "service" => {
            target.service_name = source.service_name;
            target.service_type = source.service_type;
            target.desired_count = source.desired_count;
            target.deployment_configuration = source.deployment_configuration;
            target.enable_execute_command = source.enable_execute_command;
        }
        "loadBalancer" => {
            target.load_balancer_type = source.load_balancer_type;
            target.lb_protocol = source.lb_protocol;
            target.lb_port = source.lb_port;
            target.public_load_balancer = source.public_load_balancer;
            target.certificate_arn = source.certificate_arn;
            target.health_check_path = source.health_check_path;
            target.load_balancer_health_check = source.load_balancer_health_check;
        }
        "autoScaling" => {
            target.enable_auto_scaling = source.enable_auto_scaling;
            target.min_capacity = source.min_capacity;
            target.max_capacity = source.max_capacity;
            target.target_cpu_utilization = source.target_cpu_utilization;
            target.target_memory_utilization = source.target_memory_utilization;
        }
        "iam" => {
            target.task_role_permissions = source.task_role_permissions;
            target.task_execution_role_permissions = source.task_execution_role_permissions;
        }
        "serviceDiscovery" => target.service_discovery = source.service_discovery,
        "addons" => target.log_retention_days = source.log_retention_days,
        _ => debug!("No flat fields belong to '{domain}'"),
    }
}

/// `[{ name, value }]` to a name-keyed map; entries missing either half are dropped
fn environment_to_map(pairs: &[NameValue]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .filter_map(|pair| Some((pair.name.clone()?, pair.value.clone()?)))
        .collect()
}

fn secrets_to_map(secrets: &[SecretRef]) -> BTreeMap<String, String> {
    secrets
        .iter()
        .filter_map(|secret| Some((secret.name.clone()?, secret.value_from.clone()?)))
        .collect()
}

fn map_health_check(check: &ContainerHealthCheck) -> HealthCheck {
    HealthCheck {
        command: check.command.clone(),
        interval: check.interval.map(Duration::from_secs),
        timeout: check.timeout.map(Duration::from_secs),
        retries: check.retries,
        start_period: check.start_period.map(Duration::from_secs),
    }
}

fn map_target_group(group: &TargetGroup) -> LoadBalancerHealthCheck {
    LoadBalancerHealthCheck {
        path: group.health_check_path.clone(),
        interval: group.interval.map(Duration::from_secs),
        timeout: group.timeout.map(Duration::from_secs),
        healthy_threshold_count: group.healthy_threshold_count,
        unhealthy_threshold_count: group.unhealthy_threshold_count,
        healthy_http_codes: group.healthy_http_codes.clone(),
    }
}

/// Volumes are referenced by name, so nameless ones are dropped
fn map_volume(volume: &structured::Volume) -> Option<Volume> {
    let efs = volume.efs_volume_configuration.as_ref();
    Some(Volume {
        name: volume.name.clone()?,
        host_path: volume.host.as_ref().and_then(|h| h.source_path.clone()),
        efs_file_system_id: efs.and_then(|e| e.file_system_id.clone()),
        root_directory: efs.and_then(|e| e.root_directory.clone()),
    })
}

/// Sidecars need both a name and an image to be deployable
fn map_sidecar(container: &Container) -> Option<AdditionalContainer> {
    Some(AdditionalContainer {
        name: Some(container.name.clone()?),
        image: Some(container.image.clone()?),
        essential: container.essential,
        cpu: container.cpu,
        memory: container.memory,
        container_port: container
            .port_mappings
            .first()
            .and_then(|mapping| mapping.container_port),
        environment: (!container.environment.is_empty())
            .then(|| environment_to_map(&container.environment)),
        command: container.command.clone(),
    })
}

fn metric_target(metrics: &[ScalingMetric], metric_type: &str) -> Option<u32> {
    metrics
        .iter()
        .find(|metric| metric.metric_type == metric_type)
        .and_then(|metric| metric.target)
}

fn policies_to_map(policies: &[Policy]) -> BTreeMap<String, PolicyStatement> {
    policies
        .iter()
        .filter_map(|policy| {
            Some((
                policy.name.clone()?,
                PolicyStatement {
                    actions: policy.actions.clone(),
                    resources: policy.resources.clone(),
                },
            ))
        })
        .collect()
}

fn map_service_discovery(discovery: &structured::ServiceDiscovery) -> ServiceDiscovery {
    let namespace = discovery.namespace.as_ref();
    let service = discovery.service.as_ref();
    ServiceDiscovery {
        enabled: discovery.enabled,
        namespace: namespace.and_then(|n| n.name.clone()),
        namespace_type: namespace.and_then(|n| n.namespace_type.clone()),
        service_name: service.and_then(|s| s.name.clone()),
        dns_type: service.and_then(|s| s.dns_type.clone()),
        dns_ttl: service.and_then(|s| s.ttl),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: Value) -> StructuredConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_required_fields() {
        let config = structured(json!({
            "infrastructure": { "vpc": { "id": "vpc-1" } },
            "cluster": { "name": "c1" },
            "taskDefinition": {
                "containers": [{
                    "image": "nginx:alpine",
                    "portMappings": [{ "containerPort": 80 }]
                }]
            },
            "loadBalancer": { "port": 80 }
        }));

        let legacy = structured_to_legacy(&config);
        assert_eq!(legacy.vpc_id.as_deref(), Some("vpc-1"));
        assert_eq!(legacy.cluster_name.as_deref(), Some("c1"));
        assert_eq!(legacy.image.as_deref(), Some("nginx:alpine"));
        assert_eq!(legacy.container_port, Some(80));
        assert_eq!(legacy.lb_port, Some(80));
    }

    #[test]
    fn empty_config_maps_to_empty_legacy() {
        let legacy = structured_to_legacy(&StructuredConfig::default());
        assert_eq!(legacy, LegacyConfig::default());
    }

    #[test]
    fn scheme_controls_public_flag() {
        let internal = structured(json!({ "loadBalancer": { "scheme": "internal" } }));
        assert_eq!(structured_to_legacy(&internal).public_load_balancer, Some(false));

        let facing = structured(json!({ "loadBalancer": { "scheme": "internet-facing" } }));
        assert_eq!(structured_to_legacy(&facing).public_load_balancer, Some(true));

        let unset = structured(json!({ "loadBalancer": { "port": 443 } }));
        assert_eq!(structured_to_legacy(&unset).public_load_balancer, Some(true));
    }

    #[test]
    fn scaling_targets_come_from_metrics() {
        let config = structured(json!({
            "autoScaling": {
                "enabled": true,
                "minCapacity": 2,
                "maxCapacity": 6,
                "metrics": [
                    { "type": "MemoryUtilization", "target": 80 },
                    { "type": "CPUUtilization", "target": 55 }
                ]
            }
        }));

        let legacy = structured_to_legacy(&config);
        assert_eq!(legacy.enable_auto_scaling, Some(true));
        assert_eq!(legacy.min_capacity, Some(2));
        assert_eq!(legacy.max_capacity, Some(6));
        assert_eq!(legacy.target_cpu_utilization, Some(55));
        assert_eq!(legacy.target_memory_utilization, Some(80));
    }

    #[test]
    fn containers_split_into_primary_and_sidecars() {
        let config = structured(json!({
            "taskDefinition": {
                "containers": [
                    {
                        "name": "web",
                        "image": "app:1",
                        "environment": [
                            { "name": "MODE", "value": "prod" },
                            { "name": "PORT", "value": 8080 }
                        ],
                        "secrets": [{ "name": "DB_PASSWORD", "valueFrom": "arn:aws:secretsmanager:db" }],
                        "healthCheck": { "command": ["CMD", "true"], "interval": 15, "retries": 3 }
                    },
                    {
                        "name": "proxy",
                        "image": "envoy:1",
                        "portMappings": [{ "containerPort": 9901 }],
                        "environment": [{ "name": "LEVEL", "value": "info" }]
                    },
                    { "name": "no-image" }
                ]
            }
        }));

        let legacy = structured_to_legacy(&config);
        assert_eq!(legacy.container_name.as_deref(), Some("web"));
        let env = legacy.environment.unwrap();
        assert_eq!(env.get("MODE").map(String::as_str), Some("prod"));
        assert_eq!(env.get("PORT").map(String::as_str), Some("8080"));
        assert_eq!(
            legacy.secrets.unwrap().get("DB_PASSWORD").map(String::as_str),
            Some("arn:aws:secretsmanager:db")
        );

        let check = legacy.health_check.unwrap();
        assert_eq!(check.interval, Some(Duration::from_secs(15)));
        assert_eq!(check.retries, Some(3));

        let sidecars = legacy.additional_containers.unwrap();
        assert_eq!(sidecars.len(), 1);
        assert_eq!(sidecars[0].name.as_deref(), Some("proxy"));
        assert_eq!(sidecars[0].container_port, Some(9901));
        assert_eq!(
            sidecars[0].environment.as_ref().unwrap().get("LEVEL").map(String::as_str),
            Some("info")
        );
    }

    #[test]
    fn nameless_entries_are_dropped() {
        let config = structured(json!({
            "taskDefinition": {
                "containers": [{
                    "name": "web",
                    "image": "app:1",
                    "environment": [{ "value": "orphan" }, { "name": "MODE", "value": "prod" }],
                    "secrets": [{ "valueFrom": "arn:aws:secretsmanager:orphan" }]
                }],
                "volumes": [{ "host": { "sourcePath": "/data" } }, { "name": "cache" }]
            },
            "iam": {
                "taskRole": { "policies": [{ "actions": ["s3:GetObject"] }] }
            }
        }));

        let legacy = structured_to_legacy(&config);
        let env = legacy.environment.unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("MODE").map(String::as_str), Some("prod"));
        assert!(legacy.secrets.unwrap_or_default().is_empty());
        let volumes = legacy.volumes.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].name, "cache");
        assert!(legacy.task_role_permissions.unwrap_or_default().is_empty());
    }

    #[test]
    fn replacing_a_domain_keeps_the_others() {
        let mut target = LegacyConfig {
            name: Some("legacy".to_owned()),
            vpc_id: Some("vpc-1".to_owned()),
            lb_port: Some(80),
            health_check_path: Some("/old".to_owned()),
            ..LegacyConfig::default()
        };
        let source = structured_to_legacy(&structured(json!({
            "loadBalancer": { "port": 443 }
        })));

        replace_domain(&mut target, "loadBalancer", source);

        assert_eq!(target.lb_port, Some(443));
        assert_eq!(target.health_check_path, None);
        assert_eq!(target.vpc_id.as_deref(), Some("vpc-1"));
        assert_eq!(target.name.as_deref(), Some("legacy"));

        let metadata = structured_to_legacy(&structured(json!({
            "metadata": { "name": "shop", "version": "9.9.9" }
        })));
        replace_domain(&mut target, "metadata", metadata);
        assert_eq!(target.name.as_deref(), Some("shop"));
        assert_eq!(target.version.as_deref(), Some("9.9.9"));
        assert_eq!(target.lb_port, Some(443));
    }

    #[test]
    fn target_group_converts_seconds() {
        let config = structured(json!({
            "loadBalancer": {
                "targetGroup": {
                    "healthCheckPath": "/health",
                    "interval": 30,
                    "timeout": 5,
                    "healthyHttpCodes": "200-299"
                }
            }
        }));

        let legacy = structured_to_legacy(&config);
        assert_eq!(legacy.health_check_path.as_deref(), Some("/health"));
        let check = legacy.load_balancer_health_check.unwrap();
        assert_eq!(check.interval, Some(Duration::from_secs(30)));
        assert_eq!(check.timeout, Some(Duration::from_secs(5)));
        assert_eq!(check.healthy_http_codes.as_deref(), Some("200-299"));
    }

    #[test]
    fn iam_policies_become_named_map() {
        let config = structured(json!({
            "iam": {
                "taskRole": {
                    "policies": [{
                        "name": "s3-read",
                        "actions": ["s3:GetObject"],
                        "resources": ["arn:aws:s3:::bucket/*"]
                    }]
                }
            }
        }));

        let legacy = structured_to_legacy(&config);
        let permissions = legacy.task_role_permissions.unwrap();
        assert_eq!(permissions["s3-read"].actions, vec!["s3:GetObject".to_owned()]);
        assert!(legacy.task_execution_role_permissions.is_none());
    }

    #[test]
    fn service_discovery_is_flattened() {
        let config = structured(json!({
            "serviceDiscovery": {
                "enabled": true,
                "namespace": { "name": "internal.local", "type": "PRIVATE_DNS" },
                "service": { "name": "api", "dnsType": "SRV", "ttl": 30 }
            },
            "addons": { "logging": { "retentionDays": 14 } },
            "infrastructure": {
                "securityGroups": [{ "rules": [{ "cidr": "10.0.0.0/16" }] }]
            }
        }));

        let legacy = structured_to_legacy(&config);
        let discovery = legacy.service_discovery.unwrap();
        assert_eq!(discovery.namespace.as_deref(), Some("internal.local"));
        assert_eq!(discovery.namespace_type.as_deref(), Some("PRIVATE_DNS"));
        assert_eq!(discovery.service_name.as_deref(), Some("api"));
        assert_eq!(discovery.dns_type.as_deref(), Some("SRV"));
        assert_eq!(discovery.dns_ttl, Some(30));
        assert_eq!(legacy.log_retention_days, Some(14));
        assert_eq!(legacy.allowed_cidr.as_deref(), Some("10.0.0.0/16"));
    }
}
