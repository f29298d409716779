//! HTTP surface: the patient form, its result page, and a JSON endpoint.
//!
//! The predictor is loaded before the server starts and shared read-only
//! between requests; every request builds its own record and vector.

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use log::{info, warn};
use serde_json::json;

use crate::codec::Field;
use crate::error::{HeartError, Result};
use crate::features::OldpeakMode;
use crate::pipeline::predict_record;
use crate::predictor::Predictor;
use crate::records::{FeatureField, PatientRecord};
use crate::report::PredictionReport;

const TITLE_COLOR: &str = "#D42027";
const VALUE_COLOR: &str = "#3498db";

#[derive(Clone)]
pub struct AppState {
    predictor: Arc<dyn Predictor>,
    oldpeak: OldpeakMode,
}

impl AppState {
    pub fn new(predictor: Arc<dyn Predictor>, oldpeak: OldpeakMode) -> Self {
        AppState { predictor, oldpeak }
    }

    fn predict(&self, record: &PatientRecord) -> Result<PredictionReport> {
        predict_record(self.predictor.as_ref(), record, self.oldpeak)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("serving the prediction form on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn status_for(err: &HeartError) -> StatusCode {
    if err.is_input_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// JSON error body for the API route.
struct ApiError(HeartError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("prediction request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn form_page() -> Html<String> {
    Html(page(&render_form(&PatientRecord::default())))
}

async fn predict_form(
    State(state): State<AppState>,
    Form(record): Form<PatientRecord>,
) -> Response {
    match state.predict(&record) {
        Ok(report) => Html(page(&format!(
            "{}{}",
            render_report(&report),
            render_form(&record)
        )))
        .into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                warn!("prediction request failed: {}", e);
            }
            let body = format!(
                "<p style=\"color:#e74c3c;\">Prediction failed: {}</p>{}",
                escape(&e.to_string()),
                render_form(&record)
            );
            (status, Html(page(&body))).into_response()
        }
    }
}

async fn predict_json(
    State(state): State<AppState>,
    Json(record): Json<PatientRecord>,
) -> std::result::Result<Json<PredictionReport>, ApiError> {
    state.predict(&record).map(Json).map_err(ApiError)
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Heart Disease Prediction</title></head><body>\n\
         <h1 style=\"color:{TITLE_COLOR};text-align:center;\">Heart Disease Prediction</h1>\n\
         <p style=\"color:#585858;text-align:center;\">Enter patient details and click 'Predict' to check for heart disease.</p>\n\
         <hr style=\"height:5px;border:none;color:{TITLE_COLOR};background-color:{TITLE_COLOR};\">\n\
         {body}</body></html>\n"
    )
}

/// The input form, pre-filled with `record`.
fn render_form(record: &PatientRecord) -> String {
    let selected = serde_json::to_value(record).unwrap_or_default();
    let mut html = String::from("<form method=\"post\" action=\"/predict\">\n");
    for field in FeatureField::ALL {
        let _ = write!(
            html,
            "<p><label for=\"{key}\">{name}</label> ",
            key = field.key(),
            name = escape(field.display_name())
        );
        if let Some(table) = field.categorical() {
            html.push_str(&render_select(field, table, selected[field.key()].as_str()));
        } else if let (Some(bounds), Some(value)) = (field.bounds(), record.numeric(field)) {
            let step = if bounds.integer { "1" } else { "0.01" };
            let _ = write!(
                html,
                "<input type=\"number\" id=\"{key}\" name=\"{key}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\">",
                key = field.key(),
                min = bounds.min,
                max = bounds.max,
            );
        }
        html.push_str("</p>\n");
    }
    html.push_str("<button type=\"submit\">Predict</button>\n</form>\n");
    html
}

fn render_select(field: FeatureField, table: Field, current: Option<&str>) -> String {
    let mut html = format!("<select id=\"{0}\" name=\"{0}\">", field.key());
    for label in table.labels() {
        let selected = if current == Some(label) { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape(label)
        );
    }
    html.push_str("</select>");
    html
}

fn render_report(report: &PredictionReport) -> String {
    let mut html = format!(
        "<p>Prediction: <span style=\"color:{}; font-size:18px;\">{}</span></p>\n<p>User Inputs:</p>\n<ul>\n",
        report.color(),
        report.diagnosis
    );
    for input in &report.inputs {
        let _ = writeln!(
            html,
            "<li>{}: <span style=\"color:{VALUE_COLOR}\">{}</span></li>",
            escape(input.name),
            escape(&input.value)
        );
    }
    html.push_str("</ul>\n<hr>\n");
    html
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
