mod document;
mod pdf;

pub use document::{
    assemble, Block, ImageBlock, ReportDocument, Table, TextStyle, CHART_CAPTION, REPORT_TITLE,
    TIMESTAMP_FORMAT,
};
pub use pdf::{render_pdf, DocumentBuildError};

use super::chart::{render_chart, ChartStyle, RenderError};
use super::domain::Instrument;
use super::scoring::{AssessmentScores, InstrumentScores};
use chrono::{Local, NaiveDateTime};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Chart(#[from] RenderError),
    #[error(transparent)]
    Document(#[from] DocumentBuildError),
}

/// Builds the report stamped with the current local time.
pub fn build(
    ego_state: &InstrumentScores,
    trait_role: &InstrumentScores,
    situational_role: &InstrumentScores,
    ego_state_chart: &[u8],
) -> Result<Vec<u8>, DocumentBuildError> {
    build_at(
        ego_state,
        trait_role,
        situational_role,
        ego_state_chart,
        Local::now().naive_local(),
    )
}

pub fn build_at(
    ego_state: &InstrumentScores,
    trait_role: &InstrumentScores,
    situational_role: &InstrumentScores,
    ego_state_chart: &[u8],
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, DocumentBuildError> {
    let document = assemble(
        ego_state,
        trait_role,
        situational_role,
        ego_state_chart,
        generated_at,
    );
    let bytes = render_pdf(&document)?;
    info!(bytes = bytes.len(), %generated_at, "report built");
    Ok(bytes)
}

/// Renders the ego-state chart and assembles the full report in one step.
pub fn export_report(scores: &AssessmentScores) -> Result<Vec<u8>, ReportError> {
    export_report_at(scores, Local::now().naive_local())
}

pub fn export_report_at(
    scores: &AssessmentScores,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, ReportError> {
    let chart = render_chart(
        scores.ego_state.dimensions(),
        &ChartStyle::for_instrument(Instrument::EgoState),
    )?;
    let bytes = build_at(
        &scores.ego_state,
        &scores.trait_role,
        &scores.situational_role,
        &chart,
        generated_at,
    )?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{compute_all_scores, RatingSheet};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn same_scores_and_timestamp_produce_identical_bytes() {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let first = export_report_at(&scores, at(9)).expect("first export");
        let second = export_report_at(&scores, at(9)).expect("second export");
        assert_eq!(first, second);

        let later = export_report_at(&scores, at(10)).expect("later export");
        assert_ne!(first, later);
    }

    #[test]
    fn exported_report_has_three_sections_and_one_chart() {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let bytes = export_report_at(&scores, at(9)).expect("export");
        assert!(bytes.starts_with(b"%PDF"));

        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/Subtype /Image").count(), 1);
        for heading in [
            "Ego-state profile",
            "Trait-role profile",
            "Situational-role profile",
        ] {
            assert_eq!(text.matches(heading).count(), 1, "{heading}");
        }
    }

    #[test]
    fn corrupt_chart_bytes_surface_as_document_errors() {
        let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
        let err = build_at(
            &scores.ego_state,
            &scores.trait_role,
            &scores.situational_role,
            b"\x89PNG broken",
            at(9),
        )
        .expect_err("broken chart");
        assert!(matches!(err, DocumentBuildError::Image(_)));
    }
}
