use snafu::Snafu;

/// The crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate-wide error type.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("No cluster named '{}' in the describe response", cluster_id))]
    ClusterMissing { cluster_id: String },

    #[snafu(display("Unable to create instance '{}': {}", instance_id, source))]
    CreateInstance {
        instance_id: String,
        source: aws_sdk_neptune::Error,
    },

    #[snafu(display("Unable to delete cluster '{}': {}", cluster_id, source))]
    DeleteCluster {
        cluster_id: String,
        source: aws_sdk_neptune::Error,
    },

    #[snafu(display("Unable to describe cluster '{}': {}", cluster_id, source))]
    DescribeCluster {
        cluster_id: String,
        source: aws_sdk_neptune::Error,
    },

    #[snafu(display("Unable to describe instance '{}': {}", instance_id, source))]
    DescribeInstance {
        instance_id: String,
        source: aws_sdk_neptune::Error,
    },

    #[snafu(display("No instance named '{}' in the describe response", instance_id))]
    InstanceMissing { instance_id: String },

    #[snafu(display(
        "Unable to restore cluster '{}' as '{}': {}",
        source_cluster_id,
        clone_cluster_id,
        source
    ))]
    RestoreCluster {
        source_cluster_id: String,
        clone_cluster_id: String,
        source: aws_sdk_neptune::Error,
    },

    #[snafu(display("Instance '{}' has no subnet group", instance_id))]
    SubnetGroupMissing { instance_id: String },

    #[snafu(display("Unexpected status '{}' for cluster '{}'", status, cluster_id))]
    UnexpectedClusterStatus { cluster_id: String, status: String },

    #[snafu(display("Unexpected status '{}' for instance '{}'", status, instance_id))]
    UnexpectedInstanceStatus { instance_id: String, status: String },

    #[snafu(display(
        "Timed-out waiting for {} '{}' to become available after {} polls",
        kind,
        id,
        attempts
    ))]
    WaiterTimeout {
        kind: String,
        id: String,
        attempts: u32,
    },

    #[snafu(display("No writer instance in cluster '{}'", cluster_id))]
    WriterMissing { cluster_id: String },
}
