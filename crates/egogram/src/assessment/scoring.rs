use super::domain::{Instrument, Interpretation, StatementId};
use super::session::RatingSheet;
use serde::Serialize;

/// Inclusive lower bound of the "strong identification" bucket.
pub const STRONG_IDENTIFICATION_THRESHOLD: u8 = 13;
/// Inclusive lower bound of the "some tendency" bucket.
pub const SOME_TENDENCY_THRESHOLD: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "missing rating for statement {} of '{dimension}' in the {}: \"{text}\"",
    .statement.index + 1,
    .statement.instrument
)]
pub struct MissingRatingError {
    pub statement: StatementId,
    pub dimension: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionScore {
    pub key: &'static str,
    pub name: &'static str,
    pub score: u8,
}

impl DimensionScore {
    pub fn new(key: &'static str, name: &'static str, score: u8) -> Self {
        Self { key, name, score }
    }
}

/// Per-dimension totals of one instrument, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentScores {
    instrument: Instrument,
    dimensions: Vec<DimensionScore>,
}

impl InstrumentScores {
    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn dimensions(&self) -> &[DimensionScore] {
        &self.dimensions
    }

    pub fn get(&self, key: &str) -> Option<u8> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.key == key)
            .map(|dimension| dimension.score)
    }

    /// Interpretation per dimension; empty for instruments that report magnitudes only.
    pub fn interpretations(&self) -> Vec<(&'static str, Interpretation)> {
        self.dimensions
            .iter()
            .filter_map(|dimension| {
                interpret_for(self.instrument, dimension.score)
                    .map(|interpretation| (dimension.name, interpretation))
            })
            .collect()
    }
}

/// Sums each dimension's ratings in catalog order.
pub fn score(
    instrument: Instrument,
    ratings: &RatingSheet,
) -> Result<InstrumentScores, MissingRatingError> {
    let dimensions = instrument
        .dimensions()
        .iter()
        .enumerate()
        .map(|(position, template)| {
            let total = template
                .statements
                .iter()
                .enumerate()
                .try_fold(0u8, |total, (index, text)| {
                    let id = StatementId::new(instrument, position, index);
                    ratings
                        .get(&id)
                        .map(|rating| total + rating.value())
                        .ok_or_else(|| MissingRatingError {
                            statement: id,
                            dimension: template.name,
                            text: *text,
                        })
                })?;
            Ok(DimensionScore::new(template.key, template.name, total))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InstrumentScores {
        instrument,
        dimensions,
    })
}

pub fn interpret(score: u8) -> Interpretation {
    if score >= STRONG_IDENTIFICATION_THRESHOLD {
        Interpretation::StrongIdentification
    } else if score >= SOME_TENDENCY_THRESHOLD {
        Interpretation::SomeTendency
    } else {
        Interpretation::LowTendency
    }
}

/// Role instruments share one threshold policy; the ego-state profile has none.
pub fn interpret_for(instrument: Instrument, score: u8) -> Option<Interpretation> {
    instrument
        .reports_interpretation()
        .then(|| interpret(score))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentScores {
    pub ego_state: InstrumentScores,
    pub trait_role: InstrumentScores,
    pub situational_role: InstrumentScores,
}

impl AssessmentScores {
    pub fn get(&self, instrument: Instrument) -> &InstrumentScores {
        match instrument {
            Instrument::EgoState => &self.ego_state,
            Instrument::TraitRole => &self.trait_role,
            Instrument::SituationalRole => &self.situational_role,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentScores> {
        [&self.ego_state, &self.trait_role, &self.situational_role].into_iter()
    }
}

pub fn compute_all_scores(ratings: &RatingSheet) -> Result<AssessmentScores, MissingRatingError> {
    Ok(AssessmentScores {
        ego_state: score(Instrument::EgoState, ratings)?,
        trait_role: score(Instrument::TraitRole, ratings)?,
        situational_role: score(Instrument::SituationalRole, ratings)?,
    })
}
