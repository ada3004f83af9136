use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of statements every dimension carries.
pub const STATEMENTS_PER_DIMENSION: usize = 3;
/// Smallest score a dimension can reach (every statement rated 1).
pub const MIN_DIMENSION_SCORE: u8 = STATEMENTS_PER_DIMENSION as u8 * Rating::MIN;
/// Largest score a dimension can reach (every statement rated 5).
pub const MAX_DIMENSION_SCORE: u8 = STATEMENTS_PER_DIMENSION as u8 * Rating::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    #[serde(alias = "ego-state", alias = "egogram")]
    EgoState,
    #[serde(alias = "trait-role")]
    TraitRole,
    #[serde(alias = "situational-role")]
    SituationalRole,
}

impl Instrument {
    pub const fn ordered() -> [Self; 3] {
        [Self::EgoState, Self::TraitRole, Self::SituationalRole]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::EgoState => "ego_state",
            Self::TraitRole => "trait_role",
            Self::SituationalRole => "situational_role",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EgoState => "Ego-state profile",
            Self::TraitRole => "Trait-role profile (traditional)",
            Self::SituationalRole => "Situational-role profile",
        }
    }

    /// Numbered heading used for the instrument's report section.
    pub const fn section_title(self) -> &'static str {
        match self {
            Self::EgoState => "1) Ego-state profile",
            Self::TraitRole => "2) Trait-role profile (traditional)",
            Self::SituationalRole => "3) Situational-role profile",
        }
    }

    /// Ego-state results are reported as magnitudes only.
    pub const fn reports_interpretation(self) -> bool {
        !matches!(self, Self::EgoState)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ego_state" | "egogram" => Ok(Self::EgoState),
            "trait_role" => Ok(Self::TraitRole),
            "situational_role" => Ok(Self::SituationalRole),
            _ => Err(UnknownInstrument(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown instrument '{0}' (expected ego_state, trait_role or situational_role)")]
pub struct UnknownInstrument(pub String);

/// Stable identity of a statement: instrument, dimension position, statement position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementId {
    pub instrument: Instrument,
    pub dimension: usize,
    pub index: usize,
}

impl StatementId {
    pub const fn new(instrument: Instrument, dimension: usize, index: usize) -> Self {
        Self {
            instrument,
            dimension,
            index,
        }
    }
}

/// A single 1-5 answer. Out-of-range values cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: Rating = Rating(3);

    pub fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingOutOfRange(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating {0} is outside the 1-5 scale")]
pub struct RatingOutOfRange(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Moderate,
    Low,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpretation {
    StrongIdentification,
    SomeTendency,
    LowTendency,
}

impl Interpretation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongIdentification => "strong identification",
            Self::SomeTendency => "some tendency",
            Self::LowTendency => "low tendency",
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::StrongIdentification => Severity::High,
            Self::SomeTendency => Severity::Moderate,
            Self::LowTendency => Severity::Low,
        }
    }

    /// Feedback sentence shown next to a role score. Ego-state has none.
    pub fn narrative(self, instrument: Instrument, role: &str) -> Option<String> {
        let sentence = match (instrument, self) {
            (Instrument::EgoState, _) => return None,
            (Instrument::TraitRole, Self::StrongIdentification) => {
                format!("You strongly identify with the {role} role.")
            }
            (Instrument::TraitRole, Self::SomeTendency) => {
                format!("You show some characteristics of the {role} role.")
            }
            (Instrument::TraitRole, Self::LowTendency) => {
                format!("Little tendency toward the {role} role.")
            }
            (Instrument::SituationalRole, Self::StrongIdentification) => {
                format!("You often take on the {role} role in real situations.")
            }
            (Instrument::SituationalRole, Self::SomeTendency) => {
                format!("You show some tendencies toward the {role} role in your behavior.")
            }
            (Instrument::SituationalRole, Self::LowTendency) => {
                format!("Low tendency to position yourself as the {role}.")
            }
        };
        Some(sentence)
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_rejects_values_outside_scale() {
        assert_eq!(Rating::new(0), Err(RatingOutOfRange(0)));
        assert_eq!(Rating::new(6), Err(RatingOutOfRange(6)));
        assert_eq!(Rating::new(5).map(Rating::value), Ok(5));
        assert_eq!(Rating::default().value(), 3);
    }

    #[test]
    fn rating_deserializes_through_range_check() {
        let ok: Rating = serde_json::from_str("4").expect("4 is a valid rating");
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn score_bounds_follow_statement_count() {
        assert_eq!(MIN_DIMENSION_SCORE, 3);
        assert_eq!(MAX_DIMENSION_SCORE, 15);
    }

    #[test]
    fn instrument_parses_keys_and_cli_spellings() {
        assert_eq!("ego-state".parse::<Instrument>(), Ok(Instrument::EgoState));
        assert_eq!("Trait_Role".parse::<Instrument>(), Ok(Instrument::TraitRole));
        assert_eq!(
            "situational-role".parse::<Instrument>(),
            Ok(Instrument::SituationalRole)
        );
        assert!("karpman".parse::<Instrument>().is_err());
    }

    #[test]
    fn ego_state_has_no_narrative() {
        assert!(Interpretation::StrongIdentification
            .narrative(Instrument::EgoState, "Adult")
            .is_none());
        let text = Interpretation::SomeTendency
            .narrative(Instrument::TraitRole, "Rescuer")
            .expect("role narrative");
        assert!(text.contains("Rescuer"));
    }
}
