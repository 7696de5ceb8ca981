use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use medcost::{Advisory, ArtifactArgs, FormInput, Predictor, Region, Report, Sex, Smoker};
use reqwest::blocking::Client;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "medcost-predict",
    about = "Estimate medical insurance cost for one person from the command line"
)]
struct PredictCli {
    /// Age in years (0-120)
    #[arg(long, default_value_t = 30)]
    age: i64,

    /// Body-mass index (0-100)
    #[arg(long, default_value_t = 25.0)]
    bmi: f64,

    /// Number of children / dependents (0-10)
    #[arg(long, default_value_t = 0)]
    children: i64,

    /// Sex: Laki-laki or Perempuan
    #[arg(long, default_value = "Laki-laki")]
    sex: Sex,

    /// Smoker: Ya or Tidak
    #[arg(long, default_value = "Ya")]
    smoker: Smoker,

    /// Region: Northeast, Northwest, Southeast or Southwest
    #[arg(long, default_value = "Northeast")]
    region: Region,

    /// Print the full report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Send the request to a running medcost-server instead of loading artifacts
    #[arg(long, env = "MEDCOST_SERVER_URL")]
    server_url: Option<String>,

    #[command(flatten)]
    artifacts: ArtifactArgs,
}

/// Subset of the server's report needed for display.
#[derive(Debug, Deserialize)]
struct RemoteReport {
    formatted: String,
    advisories: Vec<Advisory>,
}

fn main() -> Result<()> {
    medcost::init_tracing();
    let cli = PredictCli::parse();
    let form = FormInput {
        age: cli.age,
        bmi: cli.bmi,
        children: cli.children,
        sex: cli.sex,
        smoker: cli.smoker,
        region: cli.region,
    };

    match &cli.server_url {
        Some(url) => {
            let body = predict_remote(url, &form)?;
            if cli.json {
                println!("{body}");
                return Ok(());
            }
            let report: RemoteReport =
                serde_json::from_str(&body).context("failed to parse server response")?;
            print_summary(&report.formatted, &report.advisories);
        }
        None => {
            let predictor =
                Predictor::load(&cli.artifacts.scaler_path, &cli.artifacts.model_path)
                    .context("failed to load artifacts")?;
            let features = form.to_features();
            let prediction = predictor.predict(&features)?;
            let report = Report::new(features, prediction);
            if cli.json {
                let json = serde_json::to_string_pretty(&report)
                    .context("failed to serialize report")?;
                println!("{json}");
            } else {
                print_summary(&report.formatted, &report.advisories);
            }
        }
    }
    Ok(())
}

fn predict_remote(base_url: &str, form: &FormInput) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;
    let url = format!("{}/v1/predict", base_url.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .json(form)
        .send()
        .with_context(|| format!("failed to call medcost-server at {url}"))?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp
            .text()
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        bail!("medcost-server returned {}: {}", status, body);
    }
    resp.text().context("failed to read server response")
}

fn print_summary(formatted: &str, advisories: &[Advisory]) {
    println!("Prediksi biaya medis Anda adalah: {formatted}");
    for advisory in advisories {
        println!("{}", advisory.message());
    }
}
