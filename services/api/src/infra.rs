use egogram::assessment::Rating;
use egogram::config::ReportConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) report: Arc<ReportConfig>,
}

pub(crate) fn parse_rating(raw: &str) -> Result<Rating, String> {
    let value = raw
        .trim()
        .parse::<u8>()
        .map_err(|err| format!("failed to parse '{raw}' as a rating ({err})"))?;
    Rating::new(value).map_err(|err| err.to_string())
}
