pub const DEFAULT_REGION: &str = "us-west-2";

/// Seconds between availability polls.
pub const DEFAULT_POLL_DELAY_SECS: u64 = 10;

/// Number of availability polls before a resource is declared stuck.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Instance class for the writer instance created on the clone.
pub const DEFAULT_INSTANCE_CLASS: &str = "db.r5.4xlarge";

pub const ENGINE: &str = "neptune";

/// Restore type for a storage-level clone that shares pages with its source.
pub const RESTORE_TYPE_COPY_ON_WRITE: &str = "copy-on-write";
