//! Most-recent online status query.
//!
//! The query is an explicit value (filter `online == true`, order
//! `published_at` descending, cap `limit` across every source combined) so the
//! in-memory project model and storage ledgers apply the same rule.

use std::cmp::Reverse;

use crate::domain::project::Project;
use crate::domain::status::StatusRecord;

/// Selects the `limit` most recent online statuses.
///
/// Records without a published time sort after every dated record. Ties keep
/// their input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnlineStatusQuery {
    pub limit: usize,
}

impl OnlineStatusQuery {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Apply the query to anything that exposes a [`StatusRecord`].
    pub fn select<'a, T, I>(&self, items: I) -> Vec<&'a T>
    where
        T: AsRef<StatusRecord> + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        if self.limit == 0 {
            return Vec::new();
        }
        let mut selected: Vec<&'a T> = items
            .into_iter()
            .filter(|item| item.as_ref().online)
            .collect();
        // Stable sort: equal keys keep input order.
        selected.sort_by_key(|item| {
            let published_at = item.as_ref().published_at;
            (published_at.is_none(), Reverse(published_at))
        });
        selected.truncate(self.limit);
        selected
    }
}

/// The `limit` most recent online statuses across all `projects`.
pub fn online<'a>(projects: &[&'a Project], limit: usize) -> Vec<&'a StatusRecord> {
    OnlineStatusQuery::new(limit)
        .select(projects.iter().copied().flat_map(|p| p.statuses.iter()))
}
