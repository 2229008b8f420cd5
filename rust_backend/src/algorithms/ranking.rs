//! Final ordering of analyzer results.

use sha2::{Digest, Sha256};

use crate::core::asterism::Asterism;

/// Sorts by the asterism ranking order, drops repeated assignments and keeps
/// at most `max_results` entries.
pub fn rank(mut asterisms: Vec<Asterism>, max_results: Option<usize>) -> Vec<Asterism> {
    asterisms.sort_by(Asterism::ranking_cmp);
    asterisms.dedup_by(|later, earlier| later.same_assignment(earlier));
    if let Some(limit) = max_results {
        asterisms.truncate(limit);
    }
    asterisms
}

/// SHA-256 hex digest of a ranked list.
///
/// Two runs with identical inputs produce identical digests.
pub fn ranking_checksum(asterisms: &[Asterism]) -> String {
    let mut hasher = Sha256::new();
    for asterism in asterisms {
        let q = asterism.quality();
        hasher.update(format!(
            "{:?}|{}|{}|{:?}|{:?}|{:?}|{:?}|{:?}",
            asterism.position_angle().value(),
            asterism.tiptilt_group(),
            asterism.flexure_group().unwrap_or("-"),
            q.avg,
            q.rms,
            q.min,
            q.max,
            asterism.brightness_sum()
        ));
        for (probe, identity) in asterism.assignment_identities() {
            hasher.update(format!("|{}={}", probe, identity));
        }
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
