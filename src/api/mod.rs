use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AffordabilityReport, AnalysisRequest, BuyerProfile, CalcError, CostPolicy, CostRule, FUEL,
    FuelOption, FuelReport, FuelRequest, INSURANCE, MAINTENANCE, REGISTRATION_TAX,
    SuggestionPolicy, analyze,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Args(#[from] clap::Error),
}

#[derive(Debug, Clone, PartialEq)]
struct ExtraCost {
    name: String,
    monthly: f64,
}

fn parse_extra_cost(raw: &str) -> Result<ExtraCost, String> {
    let (name, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=amount, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing cost name in '{raw}'"));
    }
    let monthly = amount
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid amount in '{raw}': {e}"))?;
    Ok(ExtraCost {
        name: name.to_string(),
        monthly,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamedCostRule {
    name: String,
    #[serde(flatten)]
    rule: CostRule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtraCostPayload {
    name: String,
    monthly: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuelPayload {
    price_a: f64,
    price_b: f64,
    efficiency_a: f64,
    efficiency_b: f64,
    monthly_distance: Option<f64>,
}

impl FuelPayload {
    fn into_request(self) -> Result<FuelRequest, CalcError> {
        Ok(FuelRequest {
            a: FuelOption::new(self.price_a, self.efficiency_a)?,
            b: FuelOption::new(self.price_b, self.efficiency_b)?,
            monthly_distance: self.monthly_distance,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzePayload {
    monthly_income: Option<f64>,
    net_worth: Option<f64>,
    vehicle_price: Option<f64>,
    down_payment: Option<f64>,
    rates: Option<Vec<f64>>,
    terms: Option<Vec<i32>>,
    affordability_ratio: Option<f64>,
    suggestion_rate: Option<f64>,
    suggestion_term: Option<i32>,
    assumed_fixed_cost_fraction: Option<f64>,

    fuel_monthly: Option<f64>,
    insurance_rate: Option<f64>,
    registration_tax_rate: Option<f64>,
    maintenance_rate: Option<f64>,
    cost_rules: Option<Vec<NamedCostRule>>,
    extra_costs: Option<Vec<ExtraCostPayload>>,

    fuel: Option<FuelPayload>,
}

#[derive(Parser, Debug)]
#[command(
    name = "afford",
    about = "Vehicle affordability calculator: running costs, financing scenarios \
             and tiered price suggestions"
)]
struct Cli {
    #[arg(long, default_value_t = 5000.0, help = "Net monthly income")]
    monthly_income: f64,
    #[arg(long, default_value_t = 10000.0, help = "Total net worth")]
    net_worth: f64,
    #[arg(long, default_value_t = 40000.0)]
    vehicle_price: f64,
    #[arg(long, default_value_t = 0.0)]
    down_payment: f64,
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [12.0, 15.0, 18.0, 23.0],
        help = "Candidate annual interest rates in percent"
    )]
    rates: Vec<f64>,
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [36, 48, 60],
        help = "Candidate loan terms in months"
    )]
    terms: Vec<i32>,
    #[arg(
        long,
        default_value_t = 0.30,
        help = "Fraction of monthly income available for all vehicle costs, between 0 and 1"
    )]
    affordability_ratio: f64,
    #[arg(
        long,
        default_value_t = 18.0,
        help = "Annual rate in percent used for the tiered price suggestions"
    )]
    suggestion_rate: f64,
    #[arg(
        long,
        default_value_t = 48,
        help = "Loan term in months used for the tiered price suggestions"
    )]
    suggestion_term: i32,
    #[arg(
        long,
        default_value_t = 0.15,
        help = "Fraction of the suggestion budget assumed to go to running costs, between 0 and 1"
    )]
    assumed_fixed_cost_fraction: f64,
    #[arg(long, default_value_t = 300.0, help = "Flat monthly fuel spend")]
    fuel_monthly: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Insurance per year in percent of vehicle price"
    )]
    insurance_rate: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Registration tax per year in percent of vehicle price"
    )]
    registration_tax_rate: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Maintenance per year in percent of vehicle price"
    )]
    maintenance_rate: f64,
    #[arg(
        long = "extra-cost",
        value_parser = parse_extra_cost,
        help = "Additional flat monthly cost as name=amount; \
                overrides a default category of the same name"
    )]
    extra_costs: Vec<ExtraCost>,
    #[arg(long, help = "Fuel A price per unit volume")]
    fuel_a_price: Option<f64>,
    #[arg(long, help = "Fuel A distance per unit volume")]
    fuel_a_efficiency: Option<f64>,
    #[arg(long, help = "Fuel B price per unit volume")]
    fuel_b_price: Option<f64>,
    #[arg(long, help = "Fuel B distance per unit volume")]
    fuel_b_efficiency: Option<f64>,
    #[arg(long, help = "Distance driven per month, for fuel savings")]
    monthly_distance: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn cost_policy(cli: &Cli, rules: Option<&[NamedCostRule]>) -> CostPolicy {
    let mut policy = match rules {
        Some(rules) => rules
            .iter()
            .fold(CostPolicy::empty(), |policy, named| {
                policy.with_rule(&named.name, named.rule)
            }),
        None => CostPolicy::empty()
            .with_rule(
                FUEL,
                CostRule::Flat {
                    monthly: cli.fuel_monthly,
                },
            )
            .with_rule(
                INSURANCE,
                CostRule::AnnualFraction {
                    fraction: cli.insurance_rate / 100.0,
                },
            )
            .with_rule(
                REGISTRATION_TAX,
                CostRule::AnnualFraction {
                    fraction: cli.registration_tax_rate / 100.0,
                },
            )
            .with_rule(
                MAINTENANCE,
                CostRule::AnnualFraction {
                    fraction: cli.maintenance_rate / 100.0,
                },
            ),
    };
    for extra in &cli.extra_costs {
        policy = policy.with_extra(&extra.name, extra.monthly);
    }
    policy
}

fn fuel_request(cli: &Cli) -> Result<Option<FuelRequest>, CalcError> {
    match (
        cli.fuel_a_price,
        cli.fuel_a_efficiency,
        cli.fuel_b_price,
        cli.fuel_b_efficiency,
    ) {
        (None, None, None, None) => Ok(None),
        (Some(price_a), Some(efficiency_a), Some(price_b), Some(efficiency_b)) => {
            Ok(Some(FuelRequest {
                a: FuelOption::new(price_a, efficiency_a)?,
                b: FuelOption::new(price_b, efficiency_b)?,
                monthly_distance: cli.monthly_distance,
            }))
        }
        _ => Err(CalcError::invalid(
            "fuel",
            "--fuel-a-price, --fuel-a-efficiency, --fuel-b-price and --fuel-b-efficiency \
             must be given together",
        )),
    }
}

fn build_request(
    cli: Cli,
    rules: Option<&[NamedCostRule]>,
) -> Result<AnalysisRequest, CalcError> {
    let profile = BuyerProfile::new(cli.monthly_income, cli.net_worth)?;
    let cost_policy = cost_policy(&cli, rules);
    let fuel = fuel_request(&cli)?;

    Ok(AnalysisRequest {
        profile,
        affordability_ratio: cli.affordability_ratio,
        vehicle_price: cli.vehicle_price,
        down_payment: cli.down_payment,
        rates: cli.rates,
        terms: cli.terms,
        cost_policy,
        suggestion_rate_percent: cli.suggestion_rate,
        suggestion_term_months: cli.suggestion_term,
        suggestion_policy: SuggestionPolicy {
            assumed_fixed_cost_fraction: cli.assumed_fixed_cost_fraction,
        },
        fuel,
    })
}

/// One-shot command line analysis; returns the pretty-printed JSON report.
pub fn run_cli(raw_args: &[String]) -> Result<String, ApiError> {
    let cli = Cli::try_parse_from(raw_args)?;
    let request = build_request(cli, None)?;
    let report = analyze(&request)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/fuel/compare", post(fuel_compare_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "affordability API listening");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: "Not found".to_string(),
            kind: "not-found",
        },
    )
}

async fn analyze_handler(Json(payload): Json<AnalyzePayload>) -> Response {
    match analyze_from_payload(payload) {
        Ok(report) => {
            info!(
                scenarios = report.scenarios.len(),
                vehicle_price = report.vehicle_price,
                "analysis served"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => error_response(&err),
    }
}

async fn fuel_compare_handler(Json(payload): Json<FuelPayload>) -> Response {
    match payload.into_request().and_then(|request| FuelReport::build(&request)) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => error_response(&err),
    }
}

fn analyze_from_payload(payload: AnalyzePayload) -> Result<AffordabilityReport, CalcError> {
    let request = api_request_from_payload(payload)?;
    analyze(&request)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn status_for(err: &CalcError) -> StatusCode {
    match err {
        CalcError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        CalcError::UndefinedResult { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn error_response(err: &CalcError) -> Response {
    warn!(kind = err.kind(), error = %err, "request rejected");
    json_response(
        status_for(err),
        ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<AnalysisRequest, String> {
    let payload = serde_json::from_str::<AnalyzePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

fn api_request_from_payload(payload: AnalyzePayload) -> Result<AnalysisRequest, CalcError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.monthly_income {
        cli.monthly_income = v;
    }
    if let Some(v) = payload.net_worth {
        cli.net_worth = v;
    }
    if let Some(v) = payload.vehicle_price {
        cli.vehicle_price = v;
    }
    if let Some(v) = payload.down_payment {
        cli.down_payment = v;
    }
    if let Some(v) = payload.rates {
        cli.rates = v;
    }
    if let Some(v) = payload.terms {
        cli.terms = v;
    }
    if let Some(v) = payload.affordability_ratio {
        cli.affordability_ratio = v;
    }
    if let Some(v) = payload.suggestion_rate {
        cli.suggestion_rate = v;
    }
    if let Some(v) = payload.suggestion_term {
        cli.suggestion_term = v;
    }
    if let Some(v) = payload.assumed_fixed_cost_fraction {
        cli.assumed_fixed_cost_fraction = v;
    }

    if let Some(v) = payload.fuel_monthly {
        cli.fuel_monthly = v;
    }
    if let Some(v) = payload.insurance_rate {
        cli.insurance_rate = v;
    }
    if let Some(v) = payload.registration_tax_rate {
        cli.registration_tax_rate = v;
    }
    if let Some(v) = payload.maintenance_rate {
        cli.maintenance_rate = v;
    }
    if let Some(extras) = payload.extra_costs {
        cli.extra_costs = extras
            .into_iter()
            .map(|extra| ExtraCost {
                name: extra.name,
                monthly: extra.monthly,
            })
            .collect();
    }

    let fuel = payload.fuel.map(FuelPayload::into_request).transpose()?;
    let mut request = build_request(cli, payload.cost_rules.as_deref())?;
    request.fuel = fuel;
    Ok(request)
}

fn default_cli_for_api() -> Cli {
    Cli {
        monthly_income: 5_000.0,
        net_worth: 10_000.0,
        vehicle_price: 40_000.0,
        down_payment: 0.0,
        rates: vec![12.0, 15.0, 18.0, 23.0],
        terms: vec![36, 48, 60],
        affordability_ratio: 0.30,
        suggestion_rate: 18.0,
        suggestion_term: 48,
        assumed_fixed_cost_fraction: 0.15,
        fuel_monthly: 300.0,
        insurance_rate: 4.0,
        registration_tax_rate: 4.0,
        maintenance_rate: 2.0,
        extra_costs: Vec::new(),
        fuel_a_price: None,
        fuel_a_efficiency: None,
        fuel_b_price: None,
        fuel_b_efficiency: None,
        monthly_distance: None,
    }
}
