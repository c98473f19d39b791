use crate::client::ResourceStatus;
use crate::error::{self, Result};
use log::trace;
use std::future::Future;
use std::time::Duration;

/// Poll a resource's status every `delay` until it reports `available`, up to
/// `max_attempts` polls. Fixed interval, no backoff; exhausting the budget is
/// a timeout error naming the resource. Errors from `poll` itself propagate
/// immediately.
pub async fn wait_until_available<F, Fut>(
    kind: &str,
    id: &str,
    delay: Duration,
    max_attempts: u32,
    mut poll: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ResourceStatus>>,
{
    for attempt in 1..=max_attempts {
        let status = poll().await?;
        if status == ResourceStatus::Available {
            return Ok(());
        }
        trace!(
            "{} '{}' is '{}' (poll {} of {}), sleeping and trying again",
            kind,
            id,
            status,
            attempt,
            max_attempts
        );
        tokio::time::sleep(delay).await;
    }

    error::WaiterTimeoutSnafu {
        kind,
        id,
        attempts: max_attempts,
    }
    .fail()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[tokio::test]
    async fn returns_once_available() {
        let statuses = Mutex::new(vec![
            ResourceStatus::Creating,
            ResourceStatus::Creating,
            ResourceStatus::Available,
            ResourceStatus::Creating,
        ]);
        let statuses = &statuses;

        wait_until_available("cluster", "c1", Duration::from_millis(0), 10, || async move {
            Ok(statuses.lock().unwrap().remove(0))
        })
        .await
        .unwrap();

        // The poll after `available` must never have been issued.
        assert_eq!(statuses.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn times_out_after_max_attempts() {
        let polls = AtomicU32::new(0);
        let polls = &polls;

        let result =
            wait_until_available("instance", "i1", Duration::from_millis(0), 3, || async move {
                polls.fetch_add(1, Ordering::SeqCst);
                Ok(ResourceStatus::Creating)
            })
            .await;

        assert_eq!(polls.load(Ordering::SeqCst), 3);
        match result {
            Err(Error::WaiterTimeout { kind, id, attempts }) => {
                assert_eq!(kind, "instance");
                assert_eq!(id, "i1");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn poll_errors_propagate() {
        let result = wait_until_available(
            "cluster",
            "c1",
            Duration::from_millis(0),
            3,
            || async move {
                error::ClusterMissingSnafu { cluster_id: "c1" }.fail()
            },
        )
        .await;

        assert!(matches!(result, Err(Error::ClusterMissing { .. })));
    }
}
