use super::domain::{Instrument, Interpretation, Severity, MAX_DIMENSION_SCORE};
use super::scoring::{interpret_for, AssessmentScores, InstrumentScores};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DimensionResultView {
    pub key: &'static str,
    pub name: &'static str,
    pub score: u8,
    pub max_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Interpretation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstrumentSummary {
    pub instrument: Instrument,
    pub label: &'static str,
    pub dimensions: Vec<DimensionResultView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    pub ego_state: InstrumentSummary,
    pub trait_role: InstrumentSummary,
    pub situational_role: InstrumentSummary,
}

impl InstrumentScores {
    pub fn summary(&self) -> InstrumentSummary {
        let instrument = self.instrument();
        let dimensions = self
            .dimensions()
            .iter()
            .map(|dimension| {
                let interpretation = interpret_for(instrument, dimension.score);
                DimensionResultView {
                    key: dimension.key,
                    name: dimension.name,
                    score: dimension.score,
                    max_score: MAX_DIMENSION_SCORE,
                    interpretation,
                    interpretation_label: interpretation.map(Interpretation::label),
                    severity: interpretation.map(Interpretation::severity),
                    narrative: interpretation
                        .and_then(|value| value.narrative(instrument, dimension.name)),
                }
            })
            .collect();

        InstrumentSummary {
            instrument,
            label: instrument.label(),
            dimensions,
        }
    }
}

impl AssessmentScores {
    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            ego_state: self.ego_state.summary(),
            trait_role: self.trait_role.summary(),
            situational_role: self.situational_role.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{compute_all_scores, Rating, RatingSheet};

    #[test]
    fn ego_state_summary_serializes_magnitudes_only() {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let json = serde_json::to_value(scores.summary()).expect("serializes");

        let adult = &json["ego_state"]["dimensions"][2];
        assert_eq!(adult["name"], "Adult");
        assert_eq!(adult["score"], 9);
        assert!(adult.get("interpretation").is_none());

        let victim = &json["trait_role"]["dimensions"][0];
        assert_eq!(victim["interpretation"], "some_tendency");
        assert_eq!(victim["interpretation_label"], "some tendency");
        assert_eq!(victim["severity"], "moderate");
    }

    #[test]
    fn situational_narrative_differs_from_trait_narrative() {
        let sheet = RatingSheet::uniform(Rating::new(5).expect("valid rating"));
        let summary = compute_all_scores(&sheet).expect("scores").summary();

        let trait_text = summary.trait_role.dimensions[2].narrative.clone();
        let situational_text = summary.situational_role.dimensions[2].narrative.clone();
        assert_eq!(
            trait_text.as_deref(),
            Some("You strongly identify with the Persecutor role.")
        );
        assert_eq!(
            situational_text.as_deref(),
            Some("You often take on the Persecutor role in real situations.")
        );
    }
}
