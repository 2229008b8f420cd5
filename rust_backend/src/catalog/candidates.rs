//! Per-group candidate aggregation.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};

use super::criterion::{CatalogSearchCriterion, Matcher};
use crate::core::coordinates::SkyCoordinates;
use crate::core::guide::{GuideProbeGroup, GuideStarType};
use crate::core::sky_object::{SkyObject, StarIdentity};

/// Role and group a criterion searches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    pub star_type: GuideStarType,
    pub group: GuideProbeGroup,
}

impl SearchKey {
    pub fn new(star_type: GuideStarType, group: GuideProbeGroup) -> Self {
        Self { star_type, group }
    }

    /// Number of stars the group needs in this role.
    pub fn slots(&self) -> usize {
        self.group.slots(self.star_type)
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.group.key(), self.star_type)
    }
}

/// A catalog criterion tagged with the role it searches for.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriterion {
    pub key: SearchKey,
    pub criterion: CatalogSearchCriterion,
}

impl SearchCriterion {
    pub fn new(key: SearchKey, criterion: CatalogSearchCriterion) -> Self {
        Self { key, criterion }
    }

    pub fn star_type(&self) -> GuideStarType {
        self.key.star_type
    }

    pub fn group(&self) -> &GuideProbeGroup {
        &self.key.group
    }
}

/// Candidates that matched one criterion, without duplicates, in first-seen
/// order.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    criterion: SearchCriterion,
    candidates: Vec<SkyObject>,
}

impl CandidateSet {
    pub fn new(criterion: SearchCriterion, candidates: impl IntoIterator<Item = SkyObject>) -> Self {
        let mut set = Self {
            criterion,
            candidates: Vec::new(),
        };
        set.extend(candidates);
        set
    }

    /// Appends stars not already present.
    pub fn extend(&mut self, candidates: impl IntoIterator<Item = SkyObject>) {
        let mut seen: HashSet<StarIdentity> =
            self.candidates.iter().map(SkyObject::identity).collect();
        for candidate in candidates {
            if seen.insert(candidate.identity()) {
                self.candidates.push(candidate);
            }
        }
    }

    pub fn criterion(&self) -> &SearchCriterion {
        &self.criterion
    }

    pub fn key(&self) -> &SearchKey {
        &self.criterion.key
    }

    pub fn group(&self) -> &GuideProbeGroup {
        &self.criterion.key.group
    }

    pub fn star_type(&self) -> GuideStarType {
        self.criterion.key.star_type
    }

    pub fn candidates(&self) -> &[SkyObject] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Feeds raw catalog rows through one matcher per criterion.
pub struct CandidateAggregator {
    entries: Vec<(Matcher, CandidateSet)>,
}

impl CandidateAggregator {
    pub fn new(base: &SkyCoordinates, criteria: Vec<SearchCriterion>) -> Self {
        Self::build(criteria, |c| c.matcher(base))
    }

    /// Like [`CandidateAggregator::new`], with proper motion applied at `instant`.
    pub fn at_instant(
        base: &SkyCoordinates,
        criteria: Vec<SearchCriterion>,
        instant: DateTime<Utc>,
    ) -> Self {
        Self::build(criteria, |c| c.matcher_at(base, instant))
    }

    fn build(
        criteria: Vec<SearchCriterion>,
        matcher: impl Fn(&CatalogSearchCriterion) -> Matcher,
    ) -> Self {
        let entries = criteria
            .into_iter()
            .map(|c| (matcher(&c.criterion), CandidateSet::new(c, Vec::new())))
            .collect();
        Self { entries }
    }

    pub fn add_results<'a>(&mut self, objects: impl IntoIterator<Item = &'a SkyObject>) {
        let objects: Vec<&SkyObject> = objects.into_iter().collect();
        for (matcher, set) in &mut self.entries {
            let matched = objects
                .iter()
                .filter(|o| matcher.matches(o))
                .map(|o| (*o).clone());
            set.extend(matched);
        }
    }

    /// Candidate sets in criterion order.
    pub fn finish(self) -> Vec<CandidateSet> {
        self.entries.into_iter().map(|(_, set)| set).collect()
    }
}

/// Pairs every tiptilt set with every flexure set of a different group, in
/// input order. Without any flexure set each tiptilt set stands alone.
pub fn pair_tiptilt_flexure(
    sets: &[CandidateSet],
) -> Vec<(&CandidateSet, Option<&CandidateSet>)> {
    let tiptilt = sets
        .iter()
        .filter(|s| s.star_type() == GuideStarType::Tiptilt);
    let flexure: Vec<&CandidateSet> = sets
        .iter()
        .filter(|s| s.star_type() == GuideStarType::Flexure)
        .collect();

    if flexure.is_empty() {
        return tiptilt.map(|t| (t, None)).collect();
    }

    tiptilt
        .flat_map(|t| {
            flexure
                .iter()
                .filter(move |f| f.group().key() != t.group().key())
                .map(move |f| (t, Some(*f)))
        })
        .collect()
}
