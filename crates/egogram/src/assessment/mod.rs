//! Egogram and drama-triangle self-assessment: questionnaire catalog, scoring,
//! chart rendering and PDF report export.

pub mod catalog;
pub mod chart;
pub mod domain;
pub mod report;
pub mod scoring;
pub mod session;
pub mod views;

pub use catalog::{
    catalog_view, CatalogView, DimensionCatalogView, DimensionTemplate, InstrumentCatalogView,
};
pub use chart::{render_chart, ChartStyle, RenderError};
pub use domain::{
    Instrument, Interpretation, Rating, RatingOutOfRange, Severity, StatementId,
    UnknownInstrument, MAX_DIMENSION_SCORE, MIN_DIMENSION_SCORE, STATEMENTS_PER_DIMENSION,
};
pub use report::{export_report, export_report_at, DocumentBuildError, ReportDocument, ReportError};
pub use scoring::{
    compute_all_scores, interpret, interpret_for, score, AssessmentScores, DimensionScore,
    InstrumentScores, MissingRatingError, SOME_TENDENCY_THRESHOLD,
    STRONG_IDENTIFICATION_THRESHOLD,
};
pub use session::{RatingEntry, RatingSheet, RatingSheetError};
pub use views::{AssessmentSummary, DimensionResultView, InstrumentSummary};
