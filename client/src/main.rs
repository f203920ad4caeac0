//! Bean Inspection - command line client
//!
//! Usage:
//!   bean-inspection-client predict-image <path>
//!   bean-inspection-client predict-symptoms <symptoms> <category> <region> <dehydration> <rain>
//!   bean-inspection-client save <uid> <predictions|predictions_with_image> <result.json>
//!   bean-inspection-client reports <uid> <YYYY-MM-DD> [--csv]

use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde_json::json;
use shared::{resolve, PredictionResult, RecordSource, SymptomReportInput, UserContext};

use bean_inspection_client::services::export_reports_csv;
use bean_inspection_client::{telemetry, AppState, ClientConfig, InspectionError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::load()?;
    telemetry::init(&config.logging)?;

    let state = AppState::from_config(config).await?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&state, &args).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(Command::Usage(message)) => bail!("{}", message),
        Err(Command::Failed(err)) => {
            let notice = err.report();
            eprintln!("{}", serde_json::to_string_pretty(&notice)?);
            std::process::exit(1);
        }
    }
}

enum Command {
    Usage(String),
    Failed(InspectionError),
}

impl From<InspectionError> for Command {
    fn from(err: InspectionError) -> Self {
        Command::Failed(err)
    }
}

impl From<anyhow::Error> for Command {
    fn from(err: anyhow::Error) -> Self {
        Command::Usage(format!("{:#}", err))
    }
}

async fn run(state: &AppState, args: &[String]) -> Result<String, Command> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["predict-image", path] => {
            let result = state.inspections.submit_image(path).await?;
            Ok(pretty(&result.0)?)
        }
        ["predict-symptoms", codes @ ..] if codes.len() == 5 => {
            let codes = codes
                .iter()
                .map(|c| c.parse::<i32>().with_context(|| format!("not an option code: {}", c)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let input = SymptomReportInput {
                symptoms: Some(codes[0]),
                category: Some(codes[1]),
                region: Some(codes[2]),
                dehydration_duration: Some(codes[3]),
                caught_rain_or_mist: Some(codes[4]),
            };
            let result = state.inspections.submit_symptom_form(&input).await?;
            Ok(pretty(&result.0)?)
        }
        ["save", uid, source, path] => {
            let source = RecordSource::parse(source)
                .with_context(|| format!("unknown collection: {}", source))?;
            let body = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path))?;
            let result: PredictionResult =
                serde_json::from_str(&body).context("result file is not JSON")?;
            let user = UserContext::new(*uid);
            let id = match source {
                RecordSource::Predictions => {
                    state
                        .inspections
                        .save_disease_prediction(Some(&user), &result, None)
                        .await?
                }
                RecordSource::PredictionsWithImage => {
                    state
                        .inspections
                        .save_image_prediction(Some(&user), &result, None)
                        .await?
                }
            };
            Ok(id)
        }
        ["reports", uid, date, rest @ ..] => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("not a date: {}", date))?;
            let user = UserContext::new(*uid);
            let listing = state.reports.select_date(Some(&user), date).await;
            if let Some(notice) = listing.error {
                return Ok(pretty(&json!({ "error": notice }))?);
            }

            if rest == ["--csv"] {
                return Ok(export_reports_csv(&listing.reports)?);
            }
            let reports: Vec<_> = listing
                .reports
                .iter()
                .map(|report| json!({ "report": report, "advice": resolve(report) }))
                .collect();
            Ok(pretty(&reports)?)
        }
        _ => Err(Command::Usage(
            "usage: predict-image <path> | predict-symptoms <5 codes> | \
             save <uid> <collection> <result.json> | reports <uid> <YYYY-MM-DD> [--csv]"
                .to_string(),
        )),
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
