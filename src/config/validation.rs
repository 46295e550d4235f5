//! Required-field validation
//!
//! Every required field is checked and all misses are reported together in a
//! single error, each with a hint on how to supply it.

use crate::config::resolved::ResolvedConfig;
use crate::error::{ConfigError, MissingField};

pub const VPC_ID: MissingField = MissingField::new("infrastructure.vpc.id", "vpcId");
pub const CLUSTER_NAME: MissingField = MissingField::new("cluster.name", "clusterName");
pub const IMAGE: MissingField = MissingField::new("taskDefinition.containers[0].image", "image");
pub const CONTAINER_PORT: MissingField = MissingField::new(
    "taskDefinition.containers[0].portMappings[0].containerPort",
    "containerPort",
);
pub const LB_PORT: MissingField = MissingField::new("loadBalancer.port", "lbPort");

/// The mandatory fields, in reporting order
pub const REQUIRED_FIELDS: [MissingField; 5] = [VPC_ID, CLUSTER_NAME, IMAGE, CONTAINER_PORT, LB_PORT];

/// Candidate values for the required fields, as resolved from all sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields {
    pub vpc_id: Option<String>,
    pub cluster_name: Option<String>,
    pub image: Option<String>,
    pub container_port: Option<u16>,
    pub lb_port: Option<u16>,
}

/// Required fields known to be present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub vpc_id: String,
    pub cluster_name: String,
    pub image: String,
    pub container_port: u16,
    pub lb_port: u16,
}

impl RequiredFields {
    /// Names of every field that is absent, empty or zero
    #[must_use]
    #[inline]
    pub fn missing(&self) -> Vec<MissingField> {
        let present = [
            is_present(self.vpc_id.as_deref()),
            is_present(self.cluster_name.as_deref()),
            is_present(self.image.as_deref()),
            self.container_port.is_some_and(|port| port != 0),
            self.lb_port.is_some_and(|port| port != 0),
        ];

        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|&(_, ok)| !ok)
            .map(|(field, _)| field.clone())
            .collect()
    }

    /// Check all required fields at once
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` listing every missing field
    #[inline]
    pub fn validate(self) -> Result<ValidatedFields, ConfigError> {
        let missing = self.missing();
        match self {
            Self {
                vpc_id: Some(vpc_id),
                cluster_name: Some(cluster_name),
                image: Some(image),
                container_port: Some(container_port),
                lb_port: Some(lb_port),
            } if missing.is_empty() => Ok(ValidatedFields {
                vpc_id,
                cluster_name,
                image,
                container_port,
                lb_port,
            }),
            _ => Err(ConfigError::missing_required(missing)),
        }
    }
}

impl From<&ResolvedConfig> for RequiredFields {
    #[inline]
    fn from(config: &ResolvedConfig) -> Self {
        let primary = config.primary_container();
        Self {
            vpc_id: Some(config.infrastructure.vpc.id.clone()),
            cluster_name: Some(config.cluster.name.clone()),
            image: primary.map(|c| c.image.clone()),
            container_port: primary
                .and_then(|c| c.port_mappings.first())
                .map(|mapping| mapping.container_port),
            lb_port: Some(config.load_balancer.port),
        }
    }
}

/// Validate an already resolved configuration
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` listing every missing field
#[inline]
pub fn validate_resolved(config: &ResolvedConfig) -> Result<(), ConfigError> {
    let missing = RequiredFields::from(config).missing();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::missing_required(missing))
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;

    fn complete() -> RequiredFields {
        RequiredFields {
            vpc_id: Some("vpc-1".to_owned()),
            cluster_name: Some("c1".to_owned()),
            image: Some("nginx:alpine".to_owned()),
            container_port: Some(80),
            lb_port: Some(80),
        }
    }

    #[test]
    fn complete_fields_validate() {
        let validated = complete().validate().unwrap();
        assert_eq!(validated.vpc_id, "vpc-1");
        assert_eq!(validated.lb_port, 80);
    }

    #[test]
    fn single_missing_field_is_named_alone() {
        let fields = RequiredFields {
            vpc_id: None,
            ..complete()
        };
        let err = fields.validate().unwrap_err();
        assert_eq!(err.missing_paths(), vec!["infrastructure.vpc.id"]);

        let message = err.to_string();
        assert!(message.contains("infrastructure.vpc.id"));
        assert!(!message.contains("cluster.name"));
        assert!(!message.contains("loadBalancer.port"));
        assert!(!message.contains("image"));
    }

    #[test]
    fn all_missing_fields_are_aggregated() {
        let fields = RequiredFields {
            cluster_name: None,
            lb_port: None,
            ..complete()
        };
        let err = fields.validate().unwrap_err();
        assert_eq!(err.missing_paths(), vec!["cluster.name", "loadBalancer.port"]);
    }

    #[test]
    fn blank_and_zero_count_as_missing() {
        let fields = RequiredFields {
            image: Some("   ".to_owned()),
            container_port: Some(0),
            ..complete()
        };
        assert_eq!(
            fields.missing(),
            vec![IMAGE, CONTAINER_PORT]
        );
    }

    #[test]
    fn empty_input_reports_everything() {
        let err = RequiredFields::default().validate().unwrap_err();
        assert_eq!(err.missing_paths().len(), REQUIRED_FIELDS.len());
        assert_eq!(err.exit_code(), 3);
    }
}
