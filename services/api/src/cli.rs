use crate::commands::{run_chart, run_report, run_results, ChartArgs, ReportArgs, ResultsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use egogram::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "egogram",
    about = "Score the egogram and drama-triangle questionnaires, render charts and export reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print per-dimension scores and interpretations
    Results(ResultsArgs),
    /// Render one instrument's bar chart as PNG
    Chart(ChartArgs),
    /// Export the full PDF report
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Results(args) => run_results(args),
        Command::Chart(args) => run_chart(args),
        Command::Report(args) => run_report(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egogram::assessment::Instrument;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["egogram"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn chart_accepts_kebab_case_instruments() {
        let cli = Cli::try_parse_from([
            "egogram",
            "chart",
            "--instrument",
            "situational-role",
            "--output",
            "roles.png",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Chart(args)) => {
                assert_eq!(args.instrument, Instrument::SituationalRole)
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn uniform_rating_outside_scale_is_rejected() {
        let result = Cli::try_parse_from(["egogram", "results", "--uniform", "6"]);
        assert!(result.is_err());
    }
}
