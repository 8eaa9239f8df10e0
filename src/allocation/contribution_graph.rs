//! Contribution graph reader.
//!
//! Exposes a creation's direct contributors partitioned by role, and the depth
//! of its originals tree. Creations are borrowed from whatever store implements
//! [`ContributionGraph`]; nothing here mutates them.

use std::collections::{BTreeMap, HashMap};

use crate::error::{EngineError, EngineResult};
use crate::models::{ArtistId, ContributionType, Creation, CreationId};

/// Originals trees deeper than this are treated as corrupt data.
pub const DERIVATION_DEPTH_CEILING: usize = 64;

/// Read access to creations and their contributions.
pub trait ContributionGraph {
    /// Looks up a creation by id.
    fn creation(&self, id: &CreationId) -> Option<&Creation>;
}

impl ContributionGraph for HashMap<CreationId, Creation> {
    fn creation(&self, id: &CreationId) -> Option<&Creation> {
        self.get(id)
    }
}

impl ContributionGraph for BTreeMap<CreationId, Creation> {
    fn creation(&self, id: &CreationId) -> Option<&Creation> {
        self.get(id)
    }
}

/// A creation's contributors grouped by role.
///
/// An artist holding several contribution records of the same type appears
/// once per record, and an artist may appear in more than one role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RolePartition<'a> {
    /// Artists with a composition contribution.
    pub composers: Vec<&'a ArtistId>,
    /// Artists with a text contribution.
    pub texters: Vec<&'a ArtistId>,
    /// Artists with a performance contribution.
    pub performers: Vec<&'a ArtistId>,
}

impl<'a> RolePartition<'a> {
    /// Partitions the contributions of `creation` by type.
    ///
    /// # Example
    ///
    /// ```
    /// use royalty_engine::allocation::RolePartition;
    /// use royalty_engine::models::{Contribution, Creation};
    ///
    /// let creation = Creation::new("c1", "Tide", "a1")
    ///     .with_contribution(Contribution::composition("a1"))
    ///     .with_contribution(Contribution::performance("a2"));
    ///
    /// let roles = RolePartition::of(&creation);
    /// assert_eq!(roles.composers.len(), 1);
    /// assert!(roles.texters.is_empty());
    /// assert_eq!(roles.performers.len(), 1);
    /// ```
    pub fn of(creation: &'a Creation) -> Self {
        let mut roles = Self::default();
        for contribution in &creation.contributions {
            let bucket = match contribution.contribution_type {
                ContributionType::Composition => &mut roles.composers,
                ContributionType::Text => &mut roles.texters,
                ContributionType::Performance => &mut roles.performers,
            };
            bucket.push(&contribution.artist);
        }
        roles
    }

    /// The "creator" class: composers if any, otherwise texters.
    pub fn creators(&self) -> &[&'a ArtistId] {
        if self.composers.is_empty() {
            &self.texters
        } else {
            &self.composers
        }
    }

    /// Returns true if at least one composer or texter is present.
    pub fn has_creators(&self) -> bool {
        !self.creators().is_empty()
    }

    /// Returns true if at least one performer is present.
    pub fn has_performers(&self) -> bool {
        !self.performers.is_empty()
    }

    /// Returns true if no role has any member.
    pub fn is_empty(&self) -> bool {
        self.composers.is_empty() && self.texters.is_empty() && self.performers.is_empty()
    }
}

/// Depth of the originals tree below `creation`.
///
/// A creation without originals has depth 0; a cover of an original work has
/// depth 1, a remix of that cover depth 2, and so on.
///
/// # Errors
///
/// - [`EngineError::CreationNotFound`] if an original is missing from the graph
/// - [`EngineError::DerivationCycle`] if a creation is its own ancestor
/// - [`EngineError::DerivationTooDeep`] past [`DERIVATION_DEPTH_CEILING`]
pub fn derivation_depth<G: ContributionGraph + ?Sized>(
    graph: &G,
    creation: &Creation,
) -> EngineResult<usize> {
    let mut path = Vec::new();
    walk_depth(graph, creation, &mut path)
}

fn walk_depth<G: ContributionGraph + ?Sized>(
    graph: &G,
    creation: &Creation,
    path: &mut Vec<CreationId>,
) -> EngineResult<usize> {
    if path.contains(&creation.id) {
        return Err(EngineError::DerivationCycle {
            creation: creation.id.to_string(),
        });
    }
    if path.len() >= DERIVATION_DEPTH_CEILING {
        return Err(EngineError::DerivationTooDeep {
            creation: creation.id.to_string(),
            max_depth: DERIVATION_DEPTH_CEILING,
        });
    }

    path.push(creation.id.clone());
    let mut deepest = 0;
    for link in &creation.originals {
        let original = graph
            .creation(&link.original)
            .ok_or_else(|| EngineError::CreationNotFound {
                id: link.original.to_string(),
            })?;
        deepest = deepest.max(1 + walk_depth(graph, original, path)?);
    }
    path.pop();

    Ok(deepest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contribution, DerivativeType};

    fn graph(creations: Vec<Creation>) -> HashMap<CreationId, Creation> {
        creations.into_iter().map(|c| (c.id.clone(), c)).collect()
    }

    /// CG-001: roles partitioned by contribution type
    #[test]
    fn test_partition_by_type() {
        let creation = Creation::new("c1", "Harbour", "a1")
            .with_contribution(Contribution::composition("a1"))
            .with_contribution(Contribution::text("a2"))
            .with_contribution(Contribution::performance("a3"))
            .with_contribution(Contribution::performance("a1"));

        let roles = RolePartition::of(&creation);
        assert_eq!(roles.composers, vec![&ArtistId::from("a1")]);
        assert_eq!(roles.texters, vec![&ArtistId::from("a2")]);
        assert_eq!(roles.performers.len(), 2);
    }

    /// CG-002: duplicate records are kept
    #[test]
    fn test_duplicate_contributions_counted_twice() {
        let creation = Creation::new("c1", "Harbour", "a1")
            .with_contribution(Contribution::composition("a1"))
            .with_contribution(Contribution::composition("a1"));

        let roles = RolePartition::of(&creation);
        assert_eq!(roles.composers.len(), 2);
    }

    #[test]
    fn test_creators_prefer_composers() {
        let creation = Creation::new("c1", "Harbour", "a1")
            .with_contribution(Contribution::text("a2"))
            .with_contribution(Contribution::composition("a1"));

        let roles = RolePartition::of(&creation);
        assert_eq!(roles.creators(), &[&ArtistId::from("a1")]);
    }

    #[test]
    fn test_creators_fall_back_to_texters() {
        let creation = Creation::new("c1", "Harbour", "a1")
            .with_contribution(Contribution::text("a2"))
            .with_contribution(Contribution::performance("a3"));

        let roles = RolePartition::of(&creation);
        assert_eq!(roles.creators(), &[&ArtistId::from("a2")]);
        assert!(roles.has_creators());
        assert!(roles.has_performers());
    }

    #[test]
    fn test_unclaimed_creation_has_empty_partition() {
        let creation = Creation::new("c1", "Found Sound", "a1");
        let roles = RolePartition::of(&creation);
        assert!(roles.is_empty());
        assert!(!roles.has_creators());
    }

    #[test]
    fn test_depth_of_original_is_zero() {
        let original = Creation::new("orig", "Original", "a1");
        let g = graph(vec![original.clone()]);
        assert_eq!(derivation_depth(&g, &original).unwrap(), 0);
    }

    #[test]
    fn test_depth_follows_longest_chain() {
        let original = Creation::new("orig", "Original", "a1");
        let cover = Creation::new("cover", "Cover", "a2").derived_from("orig", DerivativeType::Cover);
        let remix = Creation::new("remix", "Remix", "a3")
            .derived_from("cover", DerivativeType::Remix)
            .derived_from("orig", DerivativeType::Remix);
        let g = graph(vec![original, cover, remix.clone()]);

        assert_eq!(derivation_depth(&g, &remix).unwrap(), 2);
    }

    #[test]
    fn test_depth_detects_cycle() {
        let a = Creation::new("a", "A", "a1").derived_from("b", DerivativeType::Remix);
        let b = Creation::new("b", "B", "a2").derived_from("a", DerivativeType::Remix);
        let g = graph(vec![a.clone(), b]);

        assert!(matches!(
            derivation_depth(&g, &a),
            Err(EngineError::DerivationCycle { .. })
        ));
    }

    #[test]
    fn test_depth_reports_missing_original() {
        let cover = Creation::new("cover", "Cover", "a2").derived_from("gone", DerivativeType::Cover);
        let g = graph(vec![cover.clone()]);

        match derivation_depth(&g, &cover) {
            Err(EngineError::CreationNotFound { id }) => assert_eq!(id, "gone"),
            other => panic!("Expected CreationNotFound, got {:?}", other),
        }
    }
}
