//! Creation and contribution models.
//!
//! A [`Creation`] is a musical or literary work. Its [`Contribution`]s record
//! which artist contributed what; a creation without contributions is
//! attributed entirely to its named `artist`. Creations may derive from one or
//! more originals (covers, remixes, adaptions).

use serde::{Deserialize, Serialize};

use super::{ArtistId, CreationId};

/// The kind of contribution an artist made to a creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    /// The artist composed the music.
    Composition,
    /// The artist wrote the text.
    Text,
    /// The artist performed (recorded, produced, mixed, mastered).
    Performance,
}

/// Refines a performance contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceKind {
    /// Recording of voice or instruments.
    Recording,
    /// Producing the creation.
    Producing,
    /// Mastering the creation.
    Mastering,
    /// Mixing the creation.
    Mixing,
}

/// One artist's contribution to a creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// The contributing artist.
    pub artist: ArtistId,
    /// What the artist contributed.
    #[serde(rename = "type")]
    pub contribution_type: ContributionType,
    /// For performances, what kind of performance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceKind>,
}

impl Contribution {
    /// Creates a contribution of the given type.
    pub fn new(artist: impl Into<ArtistId>, contribution_type: ContributionType) -> Self {
        Self {
            artist: artist.into(),
            contribution_type,
            performance: None,
        }
    }

    /// A composition contribution.
    pub fn composition(artist: impl Into<ArtistId>) -> Self {
        Self::new(artist, ContributionType::Composition)
    }

    /// A text contribution.
    pub fn text(artist: impl Into<ArtistId>) -> Self {
        Self::new(artist, ContributionType::Text)
    }

    /// A performance contribution.
    pub fn performance(artist: impl Into<ArtistId>) -> Self {
        Self::new(artist, ContributionType::Performance)
    }
}

/// How a derivative relates to its original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeType {
    /// An adaption of the original.
    Adaption,
    /// A cover version.
    Cover,
    /// A remix.
    Remix,
}

/// A link from a derivative creation to one of its originals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalLink {
    /// The original creation.
    pub original: CreationId,
    /// How this creation derives from the original.
    pub derivative_type: DerivativeType,
}

/// A distinct musical or literary work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creation {
    /// Unique identifier for the creation.
    pub id: CreationId,
    /// Title of the work.
    pub title: String,
    /// The directly named artist; sole beneficiary of unclaimed creations.
    pub artist: ArtistId,
    /// Recorded contributions.
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    /// Originals this creation derives from.
    #[serde(default)]
    pub originals: Vec<OriginalLink>,
}

impl Creation {
    /// Creates a creation with no contributions and no originals.
    pub fn new(
        id: impl Into<CreationId>,
        title: impl Into<String>,
        artist: impl Into<ArtistId>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            contributions: Vec::new(),
            originals: Vec::new(),
        }
    }

    /// Adds a contribution, builder style.
    pub fn with_contribution(mut self, contribution: Contribution) -> Self {
        self.contributions.push(contribution);
        self
    }

    /// Adds an originals link, builder style.
    pub fn derived_from(
        mut self,
        original: impl Into<CreationId>,
        derivative_type: DerivativeType,
    ) -> Self {
        self.originals.push(OriginalLink {
            original: original.into(),
            derivative_type,
        });
        self
    }

    /// Returns true if no contributions have been recorded.
    ///
    /// Creations identified by fingerprinting but never claimed fall into this
    /// category.
    pub fn is_unclaimed(&self) -> bool {
        self.contributions.is_empty()
    }
}
