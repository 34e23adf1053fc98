//! AWS Lambda handler for investment reports
//!
//! Accepts API Gateway proxy events and answers two routes:
//! `GET /api/health` and `POST /api/investmentReport`. The report route takes
//! the camelCase request JSON and returns the simulated cash flows and metrics.
//!
//! `BOOKING_DATE` (YYYY-MM-DD) pins the booking date used when a request omits it.

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use chrono::{NaiveDate, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use property_cashflow::{calendar, investment::InvestmentRequest, SimulationEngine};
use serde_json::{json, Value};

const HEALTH_PATH: &str = "/api/health";
const REPORT_PATH: &str = "/api/investmentReport";

/// Booking date for requests that do not carry one
fn booking_today() -> NaiveDate {
    match std::env::var("BOOKING_DATE") {
        Ok(raw) => match calendar::parse_date(&raw) {
            Ok(date) => date,
            Err(e) => {
                warn!("Ignoring BOOKING_DATE: {}", e);
                calendar::today()
            }
        },
        Err(_) => calendar::today(),
    }
}

fn error_body(error: &str, message: impl std::fmt::Display) -> Value {
    json!({ "error": error, "message": message.to_string() })
}

fn investment_report(body: &str, today: NaiveDate) -> (u16, Value) {
    let request: InvestmentRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return (400, error_body("Invalid JSON", e)),
    };

    let resolved = match request.resolve(today) {
        Ok(r) => r,
        Err(e) => return (400, error_body("Invalid request", e)),
    };

    let engine = SimulationEngine::default();
    let result = match engine.simulate(&resolved.parameters) {
        Ok(r) => r,
        Err(e) => return (500, error_body("Internal server error", e)),
    };

    let data = match serde_json::to_value(&result) {
        Ok(v) => v,
        Err(e) => return (500, error_body("Internal server error", e)),
    };

    let mut response = json!({ "success": true, "data": data });
    if let Some(warning) = resolved.warning {
        response["warning"] = Value::String(warning);
    }
    (200, response)
}

/// Dispatch one request to a status code and JSON body
fn route(method: &str, path: &str, body: Option<&str>, today: NaiveDate) -> (u16, Value) {
    match (method, path) {
        ("GET", HEALTH_PATH) => (
            200,
            json!({
                "status": "ok",
                "message": "Investment report service is running",
                "timestamp": Utc::now().to_rfc3339(),
            }),
        ),
        ("POST", REPORT_PATH) => investment_report(body.unwrap_or("{}"), today),
        _ => (404, error_body("Not found", format!("No route for {} {}", method, path))),
    }
}

fn response(status: u16, body: Option<&Value>) -> Result<ApiGatewayProxyResponse, Error> {
    let mut response = ApiGatewayProxyResponse {
        status_code: status as i64,
        body: body.map(|b| Body::Text(b.to_string())),
        ..Default::default()
    };
    response.headers.insert("content-type", "application/json".parse()?);
    response.headers.insert("access-control-allow-origin", "*".parse()?);
    response.headers.insert("access-control-allow-methods", "GET, POST, OPTIONS".parse()?);
    response.headers.insert("access-control-allow-headers", "Content-Type".parse()?);
    Ok(response)
}

/// Lambda handler function
async fn handler(event: LambdaEvent<ApiGatewayProxyRequest>) -> Result<ApiGatewayProxyResponse, Error> {
    let request = event.payload;
    let method = request.http_method.as_str().to_uppercase();
    let path = request.path.clone().unwrap_or_default();

    // Handle CORS preflight
    if method == "OPTIONS" {
        return response(200, None);
    }

    let started = std::time::Instant::now();
    let (status, body) = route(&method, &path, request.body.as_deref(), booking_today());
    info!("{} {} -> {} in {} ms", method, path, status, started.elapsed().as_millis());

    response(status, Some(&body))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
