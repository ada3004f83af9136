use chrono::NaiveDate;
use egogram::assessment::report::{assemble, build_at};
use egogram::assessment::{
    compute_all_scores, export_report_at, render_chart, ChartStyle, Instrument, Rating,
    RatingSheet, RenderError,
};

fn generated_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 24)
        .and_then(|date| date.and_hms_opt(16, 45, 0))
        .expect("valid timestamp")
}

#[test]
fn exported_report_is_a_single_pdf_with_one_chart() {
    let scores = compute_all_scores(&RatingSheet::uniform(
        Rating::new(4).expect("valid rating"),
    ))
    .expect("scores");
    let pdf = export_report_at(&scores, generated_at()).expect("report exports");

    assert!(pdf.starts_with(b"%PDF-"));
    let text = String::from_utf8_lossy(&pdf);
    assert_eq!(text.matches("/Subtype /Image").count(), 1);
    assert!(text.contains("generated on 24/09/2025 16:45"));
}

#[test]
fn build_is_deterministic_for_a_fixed_timestamp() {
    let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
    let chart = render_chart(
        scores.ego_state.dimensions(),
        &ChartStyle::for_instrument(Instrument::EgoState),
    )
    .expect("chart renders");

    let first = build_at(
        &scores.ego_state,
        &scores.trait_role,
        &scores.situational_role,
        &chart,
        generated_at(),
    )
    .expect("first build");
    let second = build_at(
        &scores.ego_state,
        &scores.trait_role,
        &scores.situational_role,
        &chart,
        generated_at(),
    )
    .expect("second build");
    assert_eq!(first, second);
}

#[test]
fn document_model_orders_sections_by_instrument() {
    let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
    let document = assemble(
        &scores.ego_state,
        &scores.trait_role,
        &scores.situational_role,
        b"chart",
        generated_at(),
    );
    let headings: Vec<_> = document.section_headings().collect();
    let expected: Vec<_> = Instrument::ordered()
        .into_iter()
        .map(Instrument::section_title)
        .collect();
    assert_eq!(headings, expected);
}

#[test]
fn role_charts_render_at_their_declared_size() {
    let scores = compute_all_scores(&RatingSheet::with_defaults()).expect("scores");
    for instrument in [Instrument::TraitRole, Instrument::SituationalRole] {
        let style = ChartStyle::for_instrument(instrument);
        let png = render_chart(scores.get(instrument).dimensions(), &style).expect("renders");
        let decoded = image::load_from_memory(&png).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (style.width, style.height));
    }

    let err = render_chart(&[], &ChartStyle::for_instrument(Instrument::EgoState))
        .expect_err("nothing to chart");
    assert!(matches!(err, RenderError::EmptyScores));
}
