use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{Json, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::core::{
    Analysis, Field, InputParameters, SolveConfig, SolveResult, TargetKind, View, analyze,
    break_even_rent, coerce_json, max_offer_for_cash_flow, max_offer_for_profit,
};
use crate::storage::{FileStore, ParameterStore, load_or_default, reset_params, save_params};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

type SharedStore = Arc<dyn ParameterStore>;

#[derive(Parser, Debug)]
#[command(
    name = "shiftrich",
    version,
    about = "Flip profit and rental cash-flow calculator"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "SHIFTRICH_DATA_DIR",
        default_value = ".shiftrich",
        help = "Directory holding the saved parameter snapshot"
    )]
    pub data_dir: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculator form and JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print every derived metric as JSON.
    Analyze(EditArgs),
    /// Solve for a deal target (max offer or break-even rent).
    Solve {
        #[command(flatten)]
        edits: EditArgs,
        #[arg(long, value_enum)]
        target: CliTarget,
        #[arg(
            long,
            default_value = "0",
            help = "Target profit or monthly cash flow; free-form numbers are accepted"
        )]
        value: String,
    },
    /// Apply edits and persist the result.
    Save(EditArgs),
    /// Delete the saved snapshot and print the defaults.
    Reset,
    /// Print the saved snapshot (or the defaults).
    Show,
}

#[derive(Args, Debug, Default)]
pub struct EditArgs {
    #[arg(
        long = "set",
        value_name = "PATH=VALUE",
        value_parser = parse_field_edit,
        help = "Field edit, e.g. rental.monthlyRent=1900 (repeatable)"
    )]
    pub edits: Vec<FieldEdit>,
    #[arg(long, value_parser = parse_view)]
    pub view: Option<View>,
    #[arg(long, help = "Start from built-in defaults instead of the saved snapshot")]
    pub defaults: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub field: Field,
    pub raw: String,
}

fn parse_field_edit(s: &str) -> Result<FieldEdit, String> {
    let (path, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=VALUE, got '{s}'"))?;
    Ok(FieldEdit {
        field: path.parse()?,
        raw: raw.to_string(),
    })
}

fn parse_view(s: &str) -> Result<View, String> {
    s.parse()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTarget {
    MaxOfferProfit,
    MaxOfferCashFlow,
    BreakEvenRent,
}

impl From<CliTarget> for TargetKind {
    fn from(value: CliTarget) -> Self {
        match value {
            CliTarget::MaxOfferProfit => TargetKind::MaxOfferForProfit,
            CliTarget::MaxOfferCashFlow => TargetKind::MaxOfferForCashFlow,
            CliTarget::BreakEvenRent => TargetKind::BreakEvenRent,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTarget {
    #[serde(alias = "maxOfferForProfit", alias = "max-offer-profit")]
    MaxOfferForProfit,
    #[serde(alias = "maxOfferForCashFlow", alias = "max-offer-cash-flow")]
    MaxOfferForCashFlow,
    #[serde(alias = "breakEvenRent")]
    BreakEvenRent,
}

impl From<ApiTarget> for TargetKind {
    fn from(value: ApiTarget) -> Self {
        match value {
            ApiTarget::MaxOfferForProfit => TargetKind::MaxOfferForProfit,
            ApiTarget::MaxOfferForCashFlow => TargetKind::MaxOfferForCashFlow,
            ApiTarget::BreakEvenRent => TargetKind::BreakEvenRent,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolvePayload {
    target: ApiTarget,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    params: InputParameters,
    analysis: Analysis,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_params(base: InputParameters, args: &EditArgs) -> InputParameters {
    let mut params = if args.defaults {
        InputParameters::default()
    } else {
        base
    };
    for edit in &args.edits {
        params = params.with_raw_field(edit.field, &edit.raw);
    }
    if let Some(view) = args.view {
        params = params.with_view(view);
    }
    params
}

// Unknown keys are ignored; only a non-object body is rejected.
fn params_from_json(base: InputParameters, body: &Value) -> Result<InputParameters, String> {
    if !body.is_object() {
        return Err("request body must be a JSON object".to_string());
    }

    let mut params = base;
    for field in Field::ALL {
        let pointer = format!("/{}", field.path().replace('.', "/"));
        if let Some(raw) = body.pointer(&pointer) {
            params = params.with_field(field, coerce_json(raw, 0.0));
        }
    }
    if let Some(view) = body.get("selectedView").and_then(Value::as_str) {
        params = params.with_view(view.parse()?);
    }
    Ok(params)
}

fn params_from_query(
    base: InputParameters,
    query: &HashMap<String, String>,
) -> Result<InputParameters, String> {
    let mut params = base;
    for (key, raw) in query {
        if key == "selectedView" || key == "view" {
            params = params.with_view(raw.parse()?);
            continue;
        }
        let field: Field = key.parse()?;
        params = params.with_raw_field(field, raw);
    }
    Ok(params)
}

fn run_solve(
    params: &InputParameters,
    kind: TargetKind,
    target: f64,
) -> Result<SolveResult, String> {
    match kind {
        TargetKind::MaxOfferForProfit => {
            max_offer_for_profit(params, target, SolveConfig::default())
        }
        TargetKind::MaxOfferForCashFlow => {
            max_offer_for_cash_flow(params, target, SolveConfig::default())
        }
        TargetKind::BreakEvenRent => Ok(break_even_rent(params)),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{json}");
    Ok(())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let store: SharedStore = Arc::new(FileStore::new(&cli.data_dir));
    debug!(data_dir = %cli.data_dir.display(), "using data directory");

    match cli.command {
        Command::Serve { port } => run_http_server(port, store)
            .await
            .context("HTTP server failed"),
        Command::Analyze(args) => {
            let params = build_params(load_or_default(store.as_ref()), &args);
            print_json(&AnalyzeResponse {
                analysis: analyze(&params),
                params,
            })
        }
        Command::Solve {
            edits,
            target,
            value,
        } => {
            let params = build_params(load_or_default(store.as_ref()), &edits);
            let target_value = crate::core::parse_or_default(&value, 0.0);
            let result =
                run_solve(&params, target.into(), target_value).map_err(anyhow::Error::msg)?;
            print_json(&result)
        }
        Command::Save(args) => {
            let params = build_params(load_or_default(store.as_ref()), &args);
            save_params(store.as_ref(), &params)?;
            print_json(&params)
        }
        Command::Reset => {
            let params = reset_params(store.as_ref())?;
            print_json(&params)
        }
        Command::Show => print_json(&load_or_default(store.as_ref())),
    }
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/analyze",
            get(analyze_get_handler).post(analyze_post_handler),
        )
        .route(
            "/api/params",
            get(params_get_handler)
                .put(params_put_handler)
                .delete(params_delete_handler),
        )
        .route("/api/solve", post(solve_handler))
        .fallback(not_found_handler)
        .with_state(store)
}

// The form's compute host is a local process, never a shared service.
fn listen_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

pub async fn run_http_server(port: u16, store: SharedStore) -> std::io::Result<()> {
    let addr = listen_addr(port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "calculator listening");
    info!("open http://{addr}/");

    axum::serve(listener, router(store)).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn analyze_get_handler(
    State(store): State<SharedStore>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    match params_from_query(load_or_default(store.as_ref()), &query) {
        Ok(params) => analyze_response(params),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn analyze_post_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    match params_from_json(load_or_default(store.as_ref()), &body) {
        Ok(params) => analyze_response(params),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn analyze_response(params: InputParameters) -> Response {
    json_response(
        StatusCode::OK,
        AnalyzeResponse {
            analysis: analyze(&params),
            params,
        },
    )
}

async fn params_get_handler(State(store): State<SharedStore>) -> Response {
    json_response(StatusCode::OK, load_or_default(store.as_ref()))
}

async fn params_put_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let params = match params_from_json(InputParameters::default(), &body) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    match save_params(store.as_ref(), &params) {
        Ok(()) => json_response(StatusCode::OK, params),
        Err(e) => {
            error!(error = %e, "saving parameters failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn params_delete_handler(State(store): State<SharedStore>) -> Response {
    match reset_params(store.as_ref()) {
        Ok(params) => json_response(StatusCode::OK, params),
        Err(e) => {
            error!(error = %e, "resetting parameters failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn solve_handler(
    State(store): State<SharedStore>,
    payload: Result<Json<SolvePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let base = load_or_default(store.as_ref());
    let params = match payload.params.as_ref() {
        Some(body) => match params_from_json(base, body) {
            Ok(params) => params,
            Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
        },
        None => base,
    };
    let target = coerce_json(&payload.value, 0.0);
    match run_solve(&params, payload.target.into(), target) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
