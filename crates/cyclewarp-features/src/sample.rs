//! Per-user cycle sampling with an injected random source.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, instrument};

use crate::extract::CycleFeatures;
use crate::key::UserId;

/// Result of [`sample_cycles_per_user`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCycles {
    /// Selected records, grouped by user in first-appearance order.
    pub records: Vec<CycleFeatures>,
    /// Users dropped for having too few cycles.
    pub dropped_users: Vec<UserId>,
}

/// Choose exactly `n` distinct records per user, uniformly at random.
///
/// Users with fewer than `n` records are dropped. Within a user, selected
/// records keep their input order.
#[instrument(skip(records, rng), fields(records = records.len()))]
pub fn sample_cycles_per_user<R: Rng + ?Sized>(
    records: Vec<CycleFeatures>,
    n: usize,
    rng: &mut R,
) -> SampledCycles {
    let mut order: Vec<UserId> = Vec::new();
    let mut groups: HashMap<UserId, Vec<CycleFeatures>> = HashMap::new();
    for record in records {
        let user = record.key.user.clone();
        groups
            .entry(user)
            .or_insert_with_key(|u| {
                order.push(u.clone());
                Vec::new()
            })
            .push(record);
    }

    let mut selected = Vec::new();
    let mut dropped_users = Vec::new();
    for user in order {
        let Some(mut cycles) = groups.remove(&user) else {
            continue;
        };
        if cycles.len() < n {
            debug!(user = %user, available = cycles.len(), wanted = n, "dropping user");
            dropped_users.push(user);
            continue;
        }
        let mut picks = rand::seq::index::sample(rng, cycles.len(), n).into_vec();
        picks.sort_unstable();
        let mut slots: Vec<Option<CycleFeatures>> = cycles.drain(..).map(Some).collect();
        selected.extend(picks.into_iter().filter_map(|i| slots[i].take()));
    }

    SampledCycles {
        records: selected,
        dropped_users,
    }
}
