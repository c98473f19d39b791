use crate::constants::{ENGINE, RESTORE_TYPE_COPY_ON_WRITE};
use crate::error::{self, Result};
use async_trait::async_trait;
use aws_sdk_neptune::model::{DbCluster, DbClusterMember, DbInstance, VpcSecurityGroupMembership};
use snafu::{OptionExt, ResultExt};
use std::fmt;

/// Status words the control plane reports for clusters and instances. Only
/// the words the workflow acts on get their own variants; anything else is
/// carried through verbatim so error messages can show what the service
/// actually said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    Available,
    Creating,
    Other(String),
}

impl From<&str> for ResourceStatus {
    fn from(status: &str) -> Self {
        match status {
            "available" => ResourceStatus::Available,
            "creating" => ResourceStatus::Creating,
            other => ResourceStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceStatus::Available => write!(f, "available"),
            ResourceStatus::Creating => write!(f, "creating"),
            ResourceStatus::Other(status) => write!(f, "{}", status),
        }
    }
}

/// A cluster as reported by the control plane.
#[derive(Debug, Clone)]
pub struct ClusterRecord {
    pub id: String,
    pub status: ResourceStatus,
    pub members: Vec<ClusterMember>,
}

#[derive(Debug, Clone)]
pub struct ClusterMember {
    pub instance_id: String,
    pub is_writer: bool,
}

/// An instance as reported by the control plane, reduced to the fields the
/// workflow reads.
#[derive(Debug, Clone)]
pub struct InstanceRecord {
    pub id: String,
    pub status: ResourceStatus,
    pub subnet_group: Option<String>,
    pub vpc_security_groups: Vec<VpcSecurityGroup>,
    pub db_security_groups: Vec<String>,
}

/// A VPC security-group association and its membership status.
#[derive(Debug, Clone)]
pub struct VpcSecurityGroup {
    pub id: String,
    pub status: String,
}

impl From<&DbCluster> for ClusterRecord {
    fn from(cluster: &DbCluster) -> Self {
        Self {
            id: cluster
                .db_cluster_identifier()
                .unwrap_or_default()
                .to_string(),
            status: ResourceStatus::from(cluster.status().unwrap_or_default()),
            members: cluster
                .db_cluster_members()
                .unwrap_or_default()
                .iter()
                .map(ClusterMember::from)
                .collect(),
        }
    }
}

impl From<&DbClusterMember> for ClusterMember {
    fn from(member: &DbClusterMember) -> Self {
        Self {
            instance_id: member
                .db_instance_identifier()
                .unwrap_or_default()
                .to_string(),
            is_writer: member.is_cluster_writer(),
        }
    }
}

impl From<&DbInstance> for InstanceRecord {
    fn from(instance: &DbInstance) -> Self {
        Self {
            id: instance
                .db_instance_identifier()
                .unwrap_or_default()
                .to_string(),
            status: ResourceStatus::from(instance.db_instance_status().unwrap_or_default()),
            subnet_group: instance
                .db_subnet_group()
                .and_then(|subnet_group| subnet_group.db_subnet_group_name())
                .map(|name| name.to_string()),
            vpc_security_groups: instance
                .vpc_security_groups()
                .unwrap_or_default()
                .iter()
                .map(VpcSecurityGroup::from)
                .collect(),
            db_security_groups: instance
                .db_security_groups()
                .unwrap_or_default()
                .iter()
                .filter_map(|membership| membership.db_security_group_name())
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl From<&VpcSecurityGroupMembership> for VpcSecurityGroup {
    fn from(membership: &VpcSecurityGroupMembership) -> Self {
        Self {
            id: membership
                .vpc_security_group_id()
                .unwrap_or_default()
                .to_string(),
            status: membership.status().unwrap_or_default().to_string(),
        }
    }
}

/// The control-plane operations the cloning workflow issues. The live
/// implementation wraps [`aws_sdk_neptune::Client`]; tests substitute their
/// own implementation to script the remote side.
#[async_trait]
pub trait ControlPlane {
    /// Describe a cluster by identifier.
    async fn describe_cluster(&self, cluster_id: &str) -> Result<ClusterRecord>;

    /// Describe an instance by identifier.
    async fn describe_instance(&self, instance_id: &str) -> Result<InstanceRecord>;

    /// Request a copy-on-write restore of `source_cluster_id` at the latest
    /// restorable time, named `clone_cluster_id` and attached to the given
    /// network configuration.
    async fn restore_cluster_to_point_in_time(
        &self,
        source_cluster_id: &str,
        clone_cluster_id: &str,
        subnet_group: &str,
        vpc_security_group_ids: &[String],
    ) -> Result<ClusterRecord>;

    /// Create a database instance attached to `cluster_id`.
    async fn create_instance(
        &self,
        cluster_id: &str,
        instance_id: &str,
        instance_class: &str,
        db_security_groups: &[String],
    ) -> Result<InstanceRecord>;

    /// Delete a cluster without taking a final snapshot.
    async fn delete_cluster(&self, cluster_id: &str) -> Result<()>;
}

#[async_trait]
impl ControlPlane for aws_sdk_neptune::Client {
    async fn describe_cluster(&self, cluster_id: &str) -> Result<ClusterRecord> {
        let clusters = self
            .describe_db_clusters()
            .db_cluster_identifier(cluster_id)
            .send()
            .await
            .map_err(aws_sdk_neptune::Error::from)
            .context(error::DescribeClusterSnafu { cluster_id })?
            .db_clusters
            .unwrap_or_default();

        clusters
            .first()
            .map(ClusterRecord::from)
            .context(error::ClusterMissingSnafu { cluster_id })
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<InstanceRecord> {
        let instances = self
            .describe_db_instances()
            .db_instance_identifier(instance_id)
            .send()
            .await
            .map_err(aws_sdk_neptune::Error::from)
            .context(error::DescribeInstanceSnafu { instance_id })?
            .db_instances
            .unwrap_or_default();

        instances
            .first()
            .map(InstanceRecord::from)
            .context(error::InstanceMissingSnafu { instance_id })
    }

    async fn restore_cluster_to_point_in_time(
        &self,
        source_cluster_id: &str,
        clone_cluster_id: &str,
        subnet_group: &str,
        vpc_security_group_ids: &[String],
    ) -> Result<ClusterRecord> {
        let cluster = self
            .restore_db_cluster_to_point_in_time()
            .source_db_cluster_identifier(source_cluster_id)
            .db_cluster_identifier(clone_cluster_id)
            .restore_type(RESTORE_TYPE_COPY_ON_WRITE)
            .use_latest_restorable_time(true)
            .db_subnet_group_name(subnet_group)
            .set_vpc_security_group_ids(Some(vpc_security_group_ids.to_vec()))
            .send()
            .await
            .map_err(aws_sdk_neptune::Error::from)
            .context(error::RestoreClusterSnafu {
                source_cluster_id,
                clone_cluster_id,
            })?
            .db_cluster
            .context(error::ClusterMissingSnafu {
                cluster_id: clone_cluster_id,
            })?;

        Ok(ClusterRecord::from(&cluster))
    }

    async fn create_instance(
        &self,
        cluster_id: &str,
        instance_id: &str,
        instance_class: &str,
        db_security_groups: &[String],
    ) -> Result<InstanceRecord> {
        let instance = self
            .create_db_instance()
            .db_cluster_identifier(cluster_id)
            .engine(ENGINE)
            .db_instance_identifier(instance_id)
            .db_instance_class(instance_class)
            .set_db_security_groups(Some(db_security_groups.to_vec()))
            .send()
            .await
            .map_err(aws_sdk_neptune::Error::from)
            .context(error::CreateInstanceSnafu { instance_id })?
            .db_instance
            .context(error::InstanceMissingSnafu { instance_id })?;

        Ok(InstanceRecord::from(&instance))
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        self.delete_db_cluster()
            .db_cluster_identifier(cluster_id)
            .skip_final_snapshot(true)
            .send()
            .await
            .map_err(aws_sdk_neptune::Error::from)
            .context(error::DeleteClusterSnafu { cluster_id })?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use aws_sdk_neptune::model::{DbSecurityGroupMembership, DbSubnetGroup};

    #[test]
    fn status_words_parse() {
        assert_eq!(ResourceStatus::from("available"), ResourceStatus::Available);
        assert_eq!(ResourceStatus::from("creating"), ResourceStatus::Creating);
        assert_eq!(
            ResourceStatus::from("deleting"),
            ResourceStatus::Other("deleting".to_string())
        );
        assert_eq!(ResourceStatus::from("deleting").to_string(), "deleting");
    }

    #[test]
    fn cluster_record_from_sdk_model() {
        let cluster = DbCluster::builder()
            .db_cluster_identifier("abc")
            .status("available")
            .db_cluster_members(
                DbClusterMember::builder()
                    .db_instance_identifier("abc-reader")
                    .is_cluster_writer(false)
                    .build(),
            )
            .db_cluster_members(
                DbClusterMember::builder()
                    .db_instance_identifier("abc-writer")
                    .is_cluster_writer(true)
                    .build(),
            )
            .build();

        let record = ClusterRecord::from(&cluster);
        assert_eq!(record.id, "abc");
        assert_eq!(record.status, ResourceStatus::Available);
        assert_eq!(record.members.len(), 2);
        assert!(!record.members[0].is_writer);
        assert!(record.members[1].is_writer);
        assert_eq!(record.members[1].instance_id, "abc-writer");
    }

    #[test]
    fn instance_record_from_sdk_model() {
        let instance = DbInstance::builder()
            .db_instance_identifier("abc-writer")
            .db_instance_status("available")
            .db_subnet_group(DbSubnetGroup::builder().db_subnet_group_name("sn1").build())
            .vpc_security_groups(
                VpcSecurityGroupMembership::builder()
                    .vpc_security_group_id("sg-1")
                    .status("active")
                    .build(),
            )
            .db_security_groups(
                DbSecurityGroupMembership::builder()
                    .db_security_group_name("classic-1")
                    .build(),
            )
            .build();

        let record = InstanceRecord::from(&instance);
        assert_eq!(record.id, "abc-writer");
        assert_eq!(record.status, ResourceStatus::Available);
        assert_eq!(record.subnet_group.as_deref(), Some("sn1"));
        assert_eq!(record.vpc_security_groups[0].id, "sg-1");
        assert_eq!(record.vpc_security_groups[0].status, "active");
        assert_eq!(record.db_security_groups, vec!["classic-1".to_string()]);
    }
}
