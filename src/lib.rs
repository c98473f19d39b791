/*!

`neptune-cloner` clones a Neptune cluster through its control-plane API. It
resolves the source cluster's writer instance and that instance's network
configuration, requests a copy-on-write point-in-time clone of the cluster,
brings up a writer instance on the clone, waits for both to become available,
then deletes the clone cluster.

This `lib.rs` exposes the workflow pieces so that they can be exercised
against a mocked control plane; the `neptune-cloner` binary wires them to the
real one.

!*/

pub mod aws;
pub mod client;
pub mod cloner;
pub mod constants;
pub mod error;
pub mod waiter;
