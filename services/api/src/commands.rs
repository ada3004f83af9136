use crate::infra::parse_rating;
use clap::Args;
use egogram::assessment::{
    compute_all_scores, export_report, render_chart, AssessmentScores, ChartStyle,
    DimensionResultView, Instrument, InstrumentSummary, Rating, RatingSheet,
};
use egogram::config::AppConfig;
use egogram::error::AppError;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RatingsArgs {
    /// CSV file with `instrument,dimension,statement,rating` rows; unlisted statements stay at 3
    #[arg(long)]
    pub(crate) ratings: Option<PathBuf>,
    /// Rate every statement with the same value (1-5) before applying the CSV file
    #[arg(long, value_parser = parse_rating)]
    pub(crate) uniform: Option<Rating>,
}

#[derive(Args, Debug)]
pub(crate) struct ResultsArgs {
    #[command(flatten)]
    pub(crate) ratings: RatingsArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ChartArgs {
    /// Instrument to chart: ego-state, trait-role or situational-role
    #[arg(long)]
    pub(crate) instrument: Instrument,
    /// Destination PNG file
    #[arg(long)]
    pub(crate) output: PathBuf,
    #[command(flatten)]
    pub(crate) ratings: RatingsArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Destination PDF file (defaults to the configured report file name)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) ratings: RatingsArgs,
}

pub(crate) fn run_results(args: ResultsArgs) -> Result<(), AppError> {
    let scores = load_scores(&args.ratings)?;
    let summary = scores.summary();

    println!("Assessment results");
    for section in [
        &summary.ego_state,
        &summary.trait_role,
        &summary.situational_role,
    ] {
        render_section(section);
    }

    Ok(())
}

pub(crate) fn run_chart(args: ChartArgs) -> Result<(), AppError> {
    let scores = load_scores(&args.ratings)?;
    let png = render_chart(
        scores.get(args.instrument).dimensions(),
        &ChartStyle::for_instrument(args.instrument),
    )?;
    write_output(&args.output, &png)?;
    println!("Wrote {} chart to {}", args.instrument, args.output.display());
    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let output = match args.output {
        Some(path) => path,
        None => PathBuf::from(AppConfig::load()?.report.file_name),
    };
    let scores = load_scores(&args.ratings)?;
    let pdf = export_report(&scores)?;
    write_output(&output, &pdf)?;
    println!("Wrote report to {}", output.display());
    Ok(())
}

pub(crate) fn load_sheet(args: &RatingsArgs) -> Result<RatingSheet, AppError> {
    let mut sheet = RatingSheet::uniform(args.uniform.unwrap_or_default());
    if let Some(path) = &args.ratings {
        let applied = sheet.apply_csv_path(path)?;
        info!(path = %path.display(), applied, "ratings imported");
    }
    Ok(sheet)
}

fn load_scores(args: &RatingsArgs) -> Result<AssessmentScores, AppError> {
    let sheet = load_sheet(args)?;
    let scores = compute_all_scores(&sheet)?;
    info!(statements = sheet.len(), "ratings scored");
    Ok(scores)
}

fn render_section(section: &InstrumentSummary) {
    println!("\n{}", section.label);
    for dimension in &section.dimensions {
        println!("{}", dimension_line(dimension));
        if let Some(narrative) = &dimension.narrative {
            println!("    {narrative}");
        }
    }
}

fn dimension_line(dimension: &DimensionResultView) -> String {
    let magnitude = format!(
        "  - {}: {}/{}",
        dimension.name, dimension.score, dimension.max_score
    );
    match (dimension.interpretation_label, dimension.severity) {
        (Some(label), Some(severity)) => {
            format!("{magnitude} ({label}, {} severity)", severity.label())
        }
        (Some(label), None) => format!("{magnitude} ({label})"),
        _ => magnitude,
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "output written");
    Ok(())
}
