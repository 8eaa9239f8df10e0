//! Role-based allocation of an amount across a creation's artists.
//!
//! The split rules, applied to one creation:
//!
//! 1. No contributions recorded: the whole amount goes to the creation's artist.
//! 2. Performers and creators (composers or texters) both present: the
//!    performer share (50%) funds performers, the rest funds creators.
//!    Otherwise the whole amount flows to whichever side exists.
//! 3. Creator side: composers 65% / texters 35% when both are present,
//!    otherwise 100% to the role that is.
//! 4. Every role amount is divided evenly among the role's members.
//!
//! Amounts are never rounded to currency precision here. Even splits are cut
//! at [`SHARE_SCALE`] decimal places and the cut-off residue goes to the last
//! member, so the shares of every split add up to exactly the input amount.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::contribution_graph::{ContributionGraph, RolePartition};
use crate::config::AllocationRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{ArtistId, Creation, CreationId};

/// Decimal places kept for intermediate per-member shares.
pub const SHARE_SCALE: u32 = 12;

/// Amounts per artist produced by an allocation.
///
/// Breakdowns from several allocations are accumulated with [`Breakdown::merge`]
/// or `+=`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakdown(BTreeMap<ArtistId, Decimal>);

impl Breakdown {
    /// Creates an empty breakdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the running total of `artist`.
    pub fn add(&mut self, artist: &ArtistId, amount: Decimal) {
        *self.0.entry(artist.clone()).or_insert(Decimal::ZERO) += amount;
    }

    /// The amount held for `artist`, zero if absent.
    pub fn get(&self, artist: &ArtistId) -> Decimal {
        self.0.get(artist).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum over all artists.
    pub fn total(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    /// Number of distinct artists.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no artist holds an amount.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over artists and amounts in artist order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArtistId, &Decimal)> {
        self.0.iter()
    }

    /// Adds every entry of `other` into this breakdown.
    pub fn merge(&mut self, other: &Breakdown) {
        for (artist, amount) in other.iter() {
            self.add(artist, *amount);
        }
    }
}

impl AddAssign<Breakdown> for Breakdown {
    fn add_assign(&mut self, other: Breakdown) {
        for (artist, amount) in other.0 {
            *self.0.entry(artist).or_insert(Decimal::ZERO) += amount;
        }
    }
}

impl FromIterator<(ArtistId, Decimal)> for Breakdown {
    fn from_iter<I: IntoIterator<Item = (ArtistId, Decimal)>>(iter: I) -> Self {
        let mut breakdown = Breakdown::new();
        for (artist, amount) in iter {
            breakdown.add(&artist, amount);
        }
        breakdown
    }
}

impl IntoIterator for Breakdown {
    type Item = (ArtistId, Decimal);
    type IntoIter = std::collections::btree_map::IntoIter<ArtistId, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Allocates `amount` across the artists of `creation` with the standard
/// 50 / 65 / 35 split.
///
/// # Example
///
/// ```
/// use royalty_engine::allocation::allocate;
/// use royalty_engine::models::{ArtistId, Contribution, Creation};
/// use rust_decimal::Decimal;
///
/// let creation = Creation::new("c1", "Tide", "composer")
///     .with_contribution(Contribution::composition("composer"))
///     .with_contribution(Contribution::text("texter"));
///
/// let shares = allocate(&creation, Decimal::ONE_HUNDRED);
/// assert_eq!(shares.get(&ArtistId::from("composer")), Decimal::new(65, 0));
/// assert_eq!(shares.get(&ArtistId::from("texter")), Decimal::new(35, 0));
/// ```
pub fn allocate(creation: &Creation, amount: Decimal) -> Breakdown {
    allocate_with(&AllocationRules::default(), creation, amount)
}

/// Allocates `amount` across the artists of `creation` using `rules`.
///
/// Originals links are ignored; see [`allocate_in_graph`].
pub fn allocate_with(rules: &AllocationRules, creation: &Creation, amount: Decimal) -> Breakdown {
    let mut result = Breakdown::new();
    allocate_into(rules, creation, amount, &mut result);
    result
}

/// Allocates `amount` for `creation`, passing a share on to its originals
/// when the rules' originals policy is enabled.
///
/// With the policy enabled and originals present, `originals.share` percent of
/// the amount is divided evenly over the originals (each allocated
/// recursively the same way) and the remainder goes to the creation's own
/// contributors. With the policy disabled this is [`allocate_with`].
///
/// # Errors
///
/// - [`EngineError::CreationNotFound`] if an original is missing from the graph
/// - [`EngineError::DerivationCycle`] if a creation is its own ancestor
/// - [`EngineError::DerivationTooDeep`] past `originals.max_depth`
pub fn allocate_in_graph<G: ContributionGraph + ?Sized>(
    graph: &G,
    rules: &AllocationRules,
    creation: &Creation,
    amount: Decimal,
) -> EngineResult<Breakdown> {
    let mut result = Breakdown::new();
    if !rules.originals.enabled {
        allocate_into(rules, creation, amount, &mut result);
        return Ok(result);
    }
    let mut path: Vec<CreationId> = Vec::new();
    traverse_originals(graph, rules, creation, amount, &mut path, &mut result)?;
    Ok(result)
}

fn traverse_originals<G: ContributionGraph + ?Sized>(
    graph: &G,
    rules: &AllocationRules,
    creation: &Creation,
    amount: Decimal,
    path: &mut Vec<CreationId>,
    result: &mut Breakdown,
) -> EngineResult<()> {
    if path.contains(&creation.id) {
        return Err(EngineError::DerivationCycle {
            creation: creation.id.to_string(),
        });
    }
    if path.len() > rules.originals.max_depth {
        return Err(EngineError::DerivationTooDeep {
            creation: creation.id.to_string(),
            max_depth: rules.originals.max_depth,
        });
    }

    if creation.originals.is_empty() {
        allocate_into(rules, creation, amount, result);
        return Ok(());
    }

    let originals_amount = percent_of(amount, rules.originals.share);
    allocate_into(rules, creation, amount - originals_amount, result);

    path.push(creation.id.clone());
    let shares = even_shares(originals_amount, creation.originals.len());
    for (link, share) in creation.originals.iter().zip(shares) {
        let original = graph
            .creation(&link.original)
            .ok_or_else(|| EngineError::CreationNotFound {
                id: link.original.to_string(),
            })?;
        traverse_originals(graph, rules, original, share, path, result)?;
    }
    path.pop();

    Ok(())
}

fn allocate_into(
    rules: &AllocationRules,
    creation: &Creation,
    amount: Decimal,
    result: &mut Breakdown,
) {
    let roles = RolePartition::of(creation);
    if roles.is_empty() {
        // unclaimed: fingerprint-only attribution
        result.add(&creation.artist, amount);
        return;
    }

    let (creator_amount, performer_amount) = match (roles.has_creators(), roles.has_performers())
    {
        (true, true) => {
            let performer_amount = percent_of(amount, rules.performer_share);
            (amount - performer_amount, performer_amount)
        }
        (true, false) => (amount, Decimal::ZERO),
        (false, _) => (Decimal::ZERO, amount),
    };

    match (roles.composers.is_empty(), roles.texters.is_empty()) {
        (false, false) => {
            let composer_amount = percent_of(creator_amount, rules.composer_share);
            split_evenly(composer_amount, &roles.composers, result);
            split_evenly(creator_amount - composer_amount, &roles.texters, result);
        }
        (false, true) => split_evenly(creator_amount, &roles.composers, result),
        (true, false) => split_evenly(creator_amount, &roles.texters, result),
        (true, true) => {}
    }

    if roles.has_performers() {
        split_evenly(performer_amount, &roles.performers, result);
    }
}

/// `percent` percent of `amount`, cut at [`SHARE_SCALE`].
fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    (amount * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::ToZero)
}

/// Divides `total` into `count` shares that add up to exactly `total`.
fn even_shares(total: Decimal, count: usize) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }
    let share = (total / Decimal::from(count))
        .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::ToZero);
    let mut shares = vec![share; count];
    shares[count - 1] = total - share * Decimal::from(count - 1);
    shares
}

fn split_evenly(total: Decimal, members: &[&ArtistId], result: &mut Breakdown) {
    for (artist, share) in members.iter().zip(even_shares(total, members.len())) {
        result.add(artist, share);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OriginalsPolicy;
    use crate::models::{Contribution, DerivativeType};
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn artist(id: &str) -> ArtistId {
        ArtistId::from(id)
    }

    fn creation_with(composers: &[&str], texters: &[&str], performers: &[&str]) -> Creation {
        let mut creation = Creation::new("c1", "Work", "named_artist");
        for a in composers {
            creation = creation.with_contribution(Contribution::composition(*a));
        }
        for a in texters {
            creation = creation.with_contribution(Contribution::text(*a));
        }
        for a in performers {
            creation = creation.with_contribution(Contribution::performance(*a));
        }
        creation
    }

    fn rules_with_originals(share: &str) -> AllocationRules {
        AllocationRules {
            originals: OriginalsPolicy {
                enabled: true,
                share: dec(share),
                max_depth: 4,
            },
            ..AllocationRules::default()
        }
    }

    /// AL-001: unclaimed creation goes entirely to its artist
    #[test]
    fn test_unclaimed_creation_goes_to_named_artist() {
        let creation = Creation::new("c1", "Found Sound", "named_artist");
        let shares = allocate(&creation, dec("42.17"));

        assert_eq!(shares.len(), 1);
        assert_eq!(shares.get(&artist("named_artist")), dec("42.17"));
    }

    /// AL-002: composer 65 / texter 35
    #[test]
    fn test_composer_texter_split() {
        let creation = creation_with(&["comp"], &["text"], &[]);
        let shares = allocate(&creation, dec("100"));

        assert_eq!(shares.get(&artist("comp")), dec("65"));
        assert_eq!(shares.get(&artist("text")), dec("35"));
    }

    /// AL-003: performer and composer halve the amount
    #[test]
    fn test_performer_with_composer_halves() {
        let creation = creation_with(&["comp"], &[], &["perf"]);
        let shares = allocate(&creation, dec("100"));

        assert_eq!(shares.get(&artist("comp")), dec("50"));
        assert_eq!(shares.get(&artist("perf")), dec("50"));
    }

    /// AL-004: even split among role members
    #[test]
    fn test_even_split_three_composers() {
        let creation = creation_with(&["c1", "c2", "c3"], &[], &[]);
        let shares = allocate(&creation, dec("90"));

        assert_eq!(shares.get(&artist("c1")), dec("30"));
        assert_eq!(shares.get(&artist("c2")), dec("30"));
        assert_eq!(shares.get(&artist("c3")), dec("30"));
    }

    /// AL-005: performers only keep the whole amount
    #[test]
    fn test_performers_only_take_everything() {
        let creation = creation_with(&[], &[], &["p1", "p2"]);
        let shares = allocate(&creation, dec("10"));

        assert_eq!(shares.get(&artist("p1")), dec("5"));
        assert_eq!(shares.get(&artist("p2")), dec("5"));
    }

    /// AL-006: texters only take the creator side
    #[test]
    fn test_texter_with_performer() {
        let creation = creation_with(&[], &["t1"], &["p1"]);
        let shares = allocate(&creation, dec("100"));

        assert_eq!(shares.get(&artist("t1")), dec("50"));
        assert_eq!(shares.get(&artist("p1")), dec("50"));
    }

    /// AL-007: all three roles
    #[test]
    fn test_all_three_roles() {
        let creation = creation_with(&["comp"], &["text"], &["perf"]);
        let shares = allocate(&creation, dec("100"));

        assert_eq!(shares.get(&artist("comp")), dec("32.5"));
        assert_eq!(shares.get(&artist("text")), dec("17.5"));
        assert_eq!(shares.get(&artist("perf")), dec("50"));
        assert_eq!(shares.total(), dec("100"));
    }

    /// AL-008: an artist holding several roles accumulates
    #[test]
    fn test_artist_in_multiple_roles_accumulates() {
        let creation = creation_with(&["solo"], &["solo"], &["solo"]);
        let shares = allocate(&creation, dec("80"));

        assert_eq!(shares.len(), 1);
        assert_eq!(shares.get(&artist("solo")), dec("80"));
    }

    /// AL-009: repeating thirds still add up exactly
    #[test]
    fn test_thirds_sum_exactly() {
        let creation = creation_with(&[], &[], &["p1", "p2", "p3"]);
        let shares = allocate(&creation, dec("100"));

        assert_eq!(shares.get(&artist("p1")), dec("33.333333333333"));
        assert_eq!(shares.get(&artist("p3")), dec("33.333333333334"));
        assert_eq!(shares.total(), dec("100"));
    }

    #[test]
    fn test_duplicate_record_doubles_share() {
        let creation = creation_with(&["a", "a", "b"], &[], &[]);
        let shares = allocate(&creation, dec("90"));

        assert_eq!(shares.get(&artist("a")), dec("60"));
        assert_eq!(shares.get(&artist("b")), dec("30"));
    }

    #[test]
    fn test_custom_rules_change_split() {
        let rules = AllocationRules {
            performer_share: dec("40"),
            composer_share: dec("50"),
            texter_share: dec("50"),
            ..AllocationRules::default()
        };
        let creation = creation_with(&["comp"], &["text"], &["perf"]);
        let shares = allocate_with(&rules, &creation, dec("100"));

        assert_eq!(shares.get(&artist("perf")), dec("40"));
        assert_eq!(shares.get(&artist("comp")), dec("30"));
        assert_eq!(shares.get(&artist("text")), dec("30"));
    }

    #[test]
    fn test_breakdowns_accumulate_by_artist() {
        let first = allocate(&creation_with(&["comp"], &[], &["perf"]), dec("10"));
        let second = allocate(&creation_with(&["comp"], &[], &[]), dec("10"));

        let mut total = Breakdown::new();
        total.merge(&first);
        total += second;

        assert_eq!(total.get(&artist("comp")), dec("15"));
        assert_eq!(total.get(&artist("perf")), dec("5"));
        assert_eq!(total.total(), dec("20"));
    }

    #[test]
    fn test_zero_amount_allocates_zero() {
        let shares = allocate(&creation_with(&["comp"], &[], &["perf"]), Decimal::ZERO);
        assert_eq!(shares.total(), Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_serializes_as_map() {
        let shares = allocate(&creation_with(&["comp"], &["text"], &[]), dec("100"));
        let json = serde_json::to_value(&shares).unwrap();
        assert_eq!(json["comp"], "65");
        assert_eq!(json["text"], "35");
    }

    #[test]
    fn test_graph_allocation_ignores_originals_when_disabled() {
        let original = creation_with(&["orig_comp"], &[], &[]);
        let cover = Creation::new("cover", "Cover", "coverer")
            .with_contribution(Contribution::performance("coverer"))
            .derived_from("c1", DerivativeType::Cover);
        let graph: HashMap<CreationId, Creation> =
            [(original.id.clone(), original)].into_iter().collect();

        let shares =
            allocate_in_graph(&graph, &AllocationRules::default(), &cover, dec("100")).unwrap();
        assert_eq!(shares.get(&artist("coverer")), dec("100"));
        assert_eq!(shares.get(&artist("orig_comp")), Decimal::ZERO);
    }

    #[test]
    fn test_graph_allocation_shares_with_originals() {
        let original = creation_with(&["orig_comp"], &["orig_text"], &[]);
        let cover = Creation::new("cover", "Cover", "coverer")
            .with_contribution(Contribution::performance("coverer"))
            .derived_from("c1", DerivativeType::Cover);
        let graph: HashMap<CreationId, Creation> =
            [(original.id.clone(), original)].into_iter().collect();

        let shares = allocate_in_graph(&graph, &rules_with_originals("50"), &cover, dec("100"))
            .unwrap();
        assert_eq!(shares.get(&artist("coverer")), dec("50"));
        assert_eq!(shares.get(&artist("orig_comp")), dec("32.5"));
        assert_eq!(shares.get(&artist("orig_text")), dec("17.5"));
        assert_eq!(shares.total(), dec("100"));
    }

    #[test]
    fn test_graph_allocation_detects_cycle() {
        let a = Creation::new("a", "A", "x")
            .with_contribution(Contribution::composition("x"))
            .derived_from("b", DerivativeType::Remix);
        let b = Creation::new("b", "B", "y")
            .with_contribution(Contribution::composition("y"))
            .derived_from("a", DerivativeType::Remix);
        let graph: HashMap<CreationId, Creation> =
            [(a.id.clone(), a.clone()), (b.id.clone(), b)].into_iter().collect();

        assert!(matches!(
            allocate_in_graph(&graph, &rules_with_originals("50"), &a, dec("100")),
            Err(EngineError::DerivationCycle { .. })
        ));
    }

    #[test]
    fn test_graph_allocation_missing_original() {
        let cover = Creation::new("cover", "Cover", "coverer")
            .with_contribution(Contribution::performance("coverer"))
            .derived_from("missing", DerivativeType::Cover);
        let graph: HashMap<CreationId, Creation> = HashMap::new();

        assert!(matches!(
            allocate_in_graph(&graph, &rules_with_originals("50"), &cover, dec("100")),
            Err(EngineError::CreationNotFound { .. })
        ));
    }

    proptest! {
        /// Shares always add up to the allocated amount, for any role mix.
        #[test]
        fn prop_shares_sum_to_amount(
            composers in 0usize..4,
            texters in 0usize..4,
            performers in 0usize..5,
            cents in 0i64..1_000_000_000,
        ) {
            let names = |prefix: &str, n: usize| -> Vec<String> {
                (0..n).map(|i| format!("{}{}", prefix, i)).collect()
            };
            let (c, t, p) = (names("c", composers), names("t", texters), names("p", performers));
            fn as_refs(v: &[String]) -> Vec<&str> {
                v.iter().map(String::as_str).collect()
            }
            let creation = creation_with(&as_refs(&c), &as_refs(&t), &as_refs(&p));
            let amount = Decimal::new(cents, 2);

            let shares = allocate(&creation, amount);

            prop_assert_eq!(shares.total(), amount);
            prop_assert!(shares.iter().all(|(_, v)| *v >= Decimal::ZERO));
        }
    }
}
