use crate::client::{ClusterRecord, ControlPlane, InstanceRecord, ResourceStatus};
use crate::constants::{DEFAULT_INSTANCE_CLASS, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_DELAY_SECS};
use crate::error::{self, Result};
use crate::waiter::wait_until_available;
use log::info;
use snafu::{ensure, OptionExt};
use std::time::Duration;

/// Identifier of the clone cluster derived from its source cluster.
pub fn clone_cluster_id(cluster_id: &str) -> String {
    format!("{}-clone", cluster_id)
}

/// Identifier of the writer instance created on a clone cluster.
pub fn clone_instance_id(cluster_id: &str) -> String {
    format!("{}-instance", cluster_id)
}

/// Knobs for a cloning run.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    pub instance_class: String,
    pub poll_delay: Duration,
    pub max_attempts: u32,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            instance_class: DEFAULT_INSTANCE_CLASS.to_string(),
            poll_delay: Duration::from_secs(DEFAULT_POLL_DELAY_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Network configuration lifted from the source cluster's writer instance
/// and applied to the clone.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub subnet_group: String,
    pub vpc_security_group_ids: Vec<String>,
    pub db_security_groups: Vec<String>,
}

/// Runs the cloning workflow against a [`ControlPlane`].
pub struct ClusterCloner<'a, C> {
    client: &'a C,
    options: CloneOptions,
}

impl<'a, C> ClusterCloner<'a, C>
where
    C: ControlPlane,
{
    pub fn new(client: &'a C, options: CloneOptions) -> Self {
        Self { client, options }
    }

    /// Find the writer instance of `cluster_id`. The source must be
    /// `available` before a clone of it can be taken.
    pub async fn resolve_writer(&self, cluster_id: &str) -> Result<String> {
        let cluster = self.client.describe_cluster(cluster_id).await?;
        ensure!(
            cluster.status == ResourceStatus::Available,
            error::UnexpectedClusterStatusSnafu {
                cluster_id,
                status: cluster.status.to_string(),
            }
        );
        writer_of(&cluster)
    }

    /// Read the subnet group and security groups off the writer instance.
    /// Only `active` VPC associations carry over to the clone; classic DB
    /// security groups pass through unfiltered.
    pub async fn resolve_instance_network(&self, instance_id: &str) -> Result<NetworkConfig> {
        let instance = self.client.describe_instance(instance_id).await?;
        ensure!(
            instance.status == ResourceStatus::Available,
            error::UnexpectedInstanceStatusSnafu {
                instance_id,
                status: instance.status.to_string(),
            }
        );
        network_of(&instance)
    }

    /// Request a copy-on-write clone of `cluster_id` at the latest restorable
    /// time. The control plane reports a fresh clone as `creating`; anything
    /// else means the restore contract changed underneath us.
    pub async fn clone_cluster(&self, cluster_id: &str, network: &NetworkConfig) -> Result<String> {
        let clone_id = clone_cluster_id(cluster_id);
        let cluster = self
            .client
            .restore_cluster_to_point_in_time(
                cluster_id,
                &clone_id,
                &network.subnet_group,
                &network.vpc_security_group_ids,
            )
            .await?;
        ensure!(
            cluster.status == ResourceStatus::Creating,
            error::UnexpectedClusterStatusSnafu {
                cluster_id: clone_id,
                status: cluster.status.to_string(),
            }
        );
        Ok(cluster.id)
    }

    /// Create the writer instance for the clone cluster, named after it.
    pub async fn create_clone_instance(
        &self,
        cluster_id: &str,
        network: &NetworkConfig,
    ) -> Result<String> {
        let instance_id = clone_instance_id(cluster_id);
        let instance = self
            .client
            .create_instance(
                cluster_id,
                &instance_id,
                &self.options.instance_class,
                &network.db_security_groups,
            )
            .await?;
        ensure!(
            instance.status == ResourceStatus::Creating,
            error::UnexpectedInstanceStatusSnafu {
                instance_id,
                status: instance.status.to_string(),
            }
        );
        Ok(instance.id)
    }

    pub async fn wait_cluster_available(&self, cluster_id: &str) -> Result<()> {
        wait_until_available(
            "cluster",
            cluster_id,
            self.options.poll_delay,
            self.options.max_attempts,
            || async move { Ok(self.client.describe_cluster(cluster_id).await?.status) },
        )
        .await
    }

    pub async fn wait_instance_available(&self, instance_id: &str) -> Result<()> {
        wait_until_available(
            "instance",
            instance_id,
            self.options.poll_delay,
            self.options.max_attempts,
            || async move { Ok(self.client.describe_instance(instance_id).await?.status) },
        )
        .await
    }

    /// Delete the clone cluster, skipping the final snapshot. Deletion is not
    /// waited on.
    pub async fn teardown(&self, cluster_id: &str) -> Result<()> {
        self.client.delete_cluster(cluster_id).await
    }

    /// Run the whole workflow against `cluster_id`: resolve the writer and
    /// its network, clone the cluster, bring up a writer instance on the
    /// clone, then delete the clone. A failure at any step aborts the run and
    /// leaves whatever was already created behind.
    pub async fn run(&self, cluster_id: &str) -> Result<()> {
        let writer_id = self.resolve_writer(cluster_id).await?;
        info!("Found writer instance '{}'", writer_id);

        let network = self.resolve_instance_network(&writer_id).await?;
        info!("Found network configuration {:?}", network);

        let clone_id = self.clone_cluster(cluster_id, &network).await?;
        info!("Creating cluster '{}'", clone_id);
        self.wait_cluster_available(&clone_id).await?;
        info!("Created cluster '{}'", clone_id);

        let instance_id = self.create_clone_instance(&clone_id, &network).await?;
        info!("Creating instance '{}'", instance_id);
        self.wait_instance_available(&instance_id).await?;
        info!("Created instance '{}'", instance_id);

        info!("Deleting clone cluster '{}'", clone_id);
        self.teardown(&clone_id).await?;

        Ok(())
    }
}

fn writer_of(cluster: &ClusterRecord) -> Result<String> {
    cluster
        .members
        .iter()
        .find(|member| member.is_writer)
        .map(|member| member.instance_id.clone())
        .context(error::WriterMissingSnafu {
            cluster_id: &cluster.id,
        })
}

fn network_of(instance: &InstanceRecord) -> Result<NetworkConfig> {
    let subnet_group = instance
        .subnet_group
        .clone()
        .context(error::SubnetGroupMissingSnafu {
            instance_id: &instance.id,
        })?;

    let vpc_security_group_ids = instance
        .vpc_security_groups
        .iter()
        .filter(|security_group| security_group.status == "active")
        .map(|security_group| security_group.id.clone())
        .collect();

    Ok(NetworkConfig {
        subnet_group,
        vpc_security_group_ids,
        db_security_groups: instance.db_security_groups.clone(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::{ClusterMember, VpcSecurityGroup};
    use crate::error::Error;

    fn member(instance_id: &str, is_writer: bool) -> ClusterMember {
        ClusterMember {
            instance_id: instance_id.to_string(),
            is_writer,
        }
    }

    #[test]
    fn derived_identifiers() {
        assert_eq!(clone_cluster_id("abc"), "abc-clone");
        assert_eq!(clone_instance_id("abc-clone"), "abc-clone-instance");
    }

    #[test]
    fn writer_found_regardless_of_position() {
        let cluster = ClusterRecord {
            id: "abc".to_string(),
            status: ResourceStatus::Available,
            members: vec![
                member("abc-reader-1", false),
                member("abc-reader-2", false),
                member("abc-writer", true),
            ],
        };
        assert_eq!(writer_of(&cluster).unwrap(), "abc-writer");

        let cluster = ClusterRecord {
            members: vec![member("abc-writer", true), member("abc-reader-1", false)],
            ..cluster
        };
        assert_eq!(writer_of(&cluster).unwrap(), "abc-writer");
    }

    #[test]
    fn missing_writer_is_an_error() {
        let cluster = ClusterRecord {
            id: "abc".to_string(),
            status: ResourceStatus::Available,
            members: vec![member("abc-reader-1", false)],
        };
        match writer_of(&cluster) {
            Err(Error::WriterMissing { cluster_id }) => assert_eq!(cluster_id, "abc"),
            other => panic!("expected WriterMissing, got {:?}", other),
        }
    }

    #[test]
    fn network_keeps_only_active_vpc_security_groups() {
        let instance = InstanceRecord {
            id: "abc-writer".to_string(),
            status: ResourceStatus::Available,
            subnet_group: Some("sn1".to_string()),
            vpc_security_groups: vec![
                VpcSecurityGroup {
                    id: "sg-1".to_string(),
                    status: "active".to_string(),
                },
                VpcSecurityGroup {
                    id: "sg-2".to_string(),
                    status: "inactive".to_string(),
                },
            ],
            db_security_groups: vec!["classic-1".to_string()],
        };

        let network = network_of(&instance).unwrap();
        assert_eq!(network.subnet_group, "sn1");
        assert_eq!(network.vpc_security_group_ids, vec!["sg-1".to_string()]);
        // Classic groups are passed through unfiltered.
        assert_eq!(network.db_security_groups, vec!["classic-1".to_string()]);
    }

    #[test]
    fn missing_subnet_group_is_an_error() {
        let instance = InstanceRecord {
            id: "abc-writer".to_string(),
            status: ResourceStatus::Available,
            subnet_group: None,
            vpc_security_groups: Vec::new(),
            db_security_groups: Vec::new(),
        };
        assert!(matches!(
            network_of(&instance),
            Err(Error::SubnetGroupMissing { .. })
        ));
    }
}
