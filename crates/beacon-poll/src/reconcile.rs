//! Decide whether a freshly parsed status is worth persisting.

use beacon_core::StatusRecord;

/// Outcome of comparing a fetched status with the stored history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing comparable stored yet, or the state changed.
    Record,
    /// Same observed state as the stored baseline.
    Unchanged,
}

/// Compare `fetched` with a project's stored history.
///
/// `latest` is the most recently stored status and `latest_online` the most
/// recently stored online one. An online result is compared with
/// `latest_online`, so an offline row stored while a server was unreachable
/// never hides the recovery. An offline result is compared with `latest`;
/// since offline matches anything, it is stored only for a project with no
/// history at all.
pub fn reconcile(
    latest: Option<&StatusRecord>,
    latest_online: Option<&StatusRecord>,
    fetched: &StatusRecord,
) -> Reconciliation {
    let baseline = if fetched.online {
        latest_online
    } else {
        latest
    };
    match baseline {
        Some(baseline) if baseline.matches(fetched) => Reconciliation::Unchanged,
        _ => Reconciliation::Record,
    }
}
