//! Allocation of amounts across the artists of a creation.
//!
//! [`contribution_graph`] reads a creation's contributors by role and walks its
//! originals; [`split`] applies the role percentages and produces a
//! [`Breakdown`] per artist.

pub mod contribution_graph;
pub mod split;

pub use contribution_graph::{
    ContributionGraph, DERIVATION_DEPTH_CEILING, RolePartition, derivation_depth,
};
pub use split::{Breakdown, SHARE_SCALE, allocate, allocate_in_graph, allocate_with};
