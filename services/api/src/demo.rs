use crate::infra::{explainer_from, http_client, live_provider_set, StaticHazardData};
use clap::Args;
use std::sync::Arc;
use terra_guard::advisory::{RiskExplainer, TemplateExplainer};
use terra_guard::config::AppConfig;
use terra_guard::error::AppError;
use terra_guard::geo::validate_coords;
use terra_guard::providers::FactorCollector;
use terra_guard::risk::{Factor, RiskAssessment, RiskEngine};
use terra_guard::underwriting::{PayoutPolicy, RiskBand};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Longitude of the point to score
    #[arg(long)]
    pub(crate) lon: f64,
    /// Latitude of the point to score
    #[arg(long)]
    pub(crate) lat: f64,
    /// Score against projected data for this year instead of current observations
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Insured value to price a payout estimate for
    #[arg(long)]
    pub(crate) insured_value: Option<f64>,
    /// Include a policyholder-facing explanation in the output
    #[arg(long)]
    pub(crate) explain: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Insured value for the payout estimate portion of the demo
    #[arg(long, default_value_t = 10_000.0)]
    pub(crate) insured_value: f64,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (lon, lat) = validate_coords(args.lon, args.lat)?;

    let http = http_client(&config.providers)?;
    let collector = FactorCollector::new(
        live_provider_set(http.clone(), &config.providers),
        config.providers.call_timeout(),
    );

    let raw = collector.collect(lon, lat, args.year).await;
    let assessment = RiskEngine::with_defaults().assess(raw);
    let band = RiskBand::from_percent(assessment.risk_percent);

    match args.year {
        Some(year) => println!("Risk assessment for ({lat}, {lon}), projected to {year}"),
        None => println!("Risk assessment for ({lat}, {lon}), current observations"),
    }
    render_assessment(&assessment, band);

    if let Some(insured_value) = args.insured_value {
        render_payout(&PayoutPolicy::default(), band, insured_value);
    }

    if args.explain {
        let explainer = explainer_from(http, &config.providers);
        let location = format!("({lat:.4}, {lon:.4})");
        render_explanation(explainer, &assessment, band, &location).await;
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    // Bundled readings for Monterrey, MX; nothing leaves the process.
    let (lon, lat) = (-100.31, 25.67);
    let collector = FactorCollector::new(
        StaticHazardData::monterrey().provider_set(),
        std::time::Duration::from_secs(5),
    );

    println!("Risk scoring demo: Monterrey, MX ({lat}, {lon}), bundled sample readings");

    let raw = collector.collect(lon, lat, None).await;
    let assessment = RiskEngine::with_defaults().assess(raw);
    let band = RiskBand::from_percent(assessment.risk_percent);

    render_assessment(&assessment, band);
    render_payout(&PayoutPolicy::default(), band, args.insured_value);
    render_explanation(
        Arc::new(TemplateExplainer),
        &assessment,
        band,
        "Monterrey, MX",
    )
    .await;

    Ok(())
}

fn render_assessment(assessment: &RiskAssessment, band: RiskBand) {
    println!(
        "\nRisk score: {}/100 ({} band)",
        assessment.risk_percent,
        band.label()
    );

    println!("\nFactor breakdown");
    for factor in Factor::ALL {
        let percent = assessment
            .metrics_percent
            .get(&factor)
            .copied()
            .unwrap_or_default();
        println!("- {}: {:.2}%", factor.key(), percent);
    }
}

fn render_payout(policy: &PayoutPolicy, band: RiskBand, insured_value: f64) {
    println!(
        "\nEstimated payout on ${:.2} insured: ${:.2}",
        insured_value,
        policy.estimate(band, insured_value)
    );
}

async fn render_explanation(
    explainer: Arc<dyn RiskExplainer>,
    assessment: &RiskAssessment,
    band: RiskBand,
    location: &str,
) {
    match explainer.explain(assessment, band, location).await {
        Ok(text) => println!("\n{text}"),
        Err(err) => println!("\nExplanation unavailable: {err}"),
    }
}
