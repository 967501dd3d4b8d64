use axum::{
    Router,
    extract::{Json, Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::core::{
    IncomePlanner, IncomePlanningInputs, IncomePlanningReport, InputUpdate, Progress,
    json_progress,
};
use crate::error::{WorkbookError, WorkbookResult};
use crate::storage::{
    PlanId, SectionKey, SectionStore, income_planner_from_stored, load_income_planning,
    save_income_planning,
};

/// Shared handler state. Writes to one plan hold that plan's lock, so a load,
/// edit and save is never interleaved with another write to the same plan.
/// Store calls run on the blocking pool, never on a runtime worker.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn SectionStore>,
    plan_locks: Arc<Mutex<HashMap<PlanId, Arc<Mutex<()>>>>>,
}

fn lock_poisoned() -> WorkbookError {
    WorkbookError::Storage("plan lock poisoned".to_string())
}

impl AppState {
    pub fn new(store: Arc<dyn SectionStore>) -> Self {
        Self {
            store,
            plan_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn plan_lock(&self, plan: &PlanId) -> WorkbookResult<Arc<Mutex<()>>> {
        let mut locks = self.plan_locks.lock().map_err(|_| lock_poisoned())?;
        Ok(Arc::clone(locks.entry(plan.clone()).or_default()))
    }

    fn with_plan_lock<T>(
        &self,
        plan: &PlanId,
        f: impl FnOnce() -> WorkbookResult<T>,
    ) -> WorkbookResult<T> {
        let lock = self.plan_lock(plan)?;
        let _guard = lock.lock().map_err(|_| lock_poisoned())?;
        f()
    }
}

/// Runs a store-touching request body on the blocking pool.
async fn run_blocking<T, F>(f: F) -> WorkbookResult<T>
where
    F: FnOnce() -> WorkbookResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WorkbookError::Storage(format!("Request task failed: {e}")))?
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanIncomeResponse {
    plan_id: String,
    #[serde(flatten)]
    report: IncomePlanningReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SectionResponse {
    plan_id: String,
    section: SectionKey,
    document: Value,
    progress: Progress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SectionProgress {
    section: SectionKey,
    saved: bool,
    complete: bool,
    progress: Progress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanProgressResponse {
    plan_id: String,
    sections: Vec<SectionProgress>,
    overall_percent_complete: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/income-planning/derive", post(derive_handler))
        .route(
            "/api/plans/:plan_id/income-planning",
            get(get_income_handler)
                .put(put_income_handler)
                .patch(patch_income_handler),
        )
        .route(
            "/api/plans/:plan_id/sections/:section",
            get(get_section_handler).put(put_section_handler),
        )
        .route("/api/plans/:plan_id/progress", get(progress_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, store: Arc<dyn SectionStore>) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::new(store));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "workbook HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn derive_handler(payload: Result<Json<IncomePlanningInputs>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(inputs)) => {
            let planner = IncomePlanner::new(inputs);
            tracing::debug!(final_gci = planner.metrics().final_gci, "derived metrics");
            json_response(StatusCode::OK, planner.report())
        }
        Err(rejection) => rejection_response(rejection),
    }
}

async fn get_income_handler(State(state): State<AppState>, Path(plan_id): Path<String>) -> Response {
    result_response(run_blocking(move || load_income(&state, &plan_id)).await)
}

async fn put_income_handler(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    payload: Result<Json<IncomePlanningInputs>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(inputs)) => {
            result_response(run_blocking(move || replace_income(&state, &plan_id, inputs)).await)
        }
        Err(rejection) => rejection_response(rejection),
    }
}

async fn patch_income_handler(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    payload: Result<Json<InputUpdate>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(update)) => {
            result_response(run_blocking(move || update_income(&state, &plan_id, update)).await)
        }
        Err(rejection) => rejection_response(rejection),
    }
}

async fn get_section_handler(
    State(state): State<AppState>,
    Path((plan_id, section)): Path<(String, String)>,
) -> Response {
    result_response(run_blocking(move || load_section(&state, &plan_id, &section)).await)
}

async fn put_section_handler(
    State(state): State<AppState>,
    Path((plan_id, section)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(document)) => result_response(
            run_blocking(move || save_section(&state, &plan_id, &section, document)).await,
        ),
        Err(rejection) => rejection_response(rejection),
    }
}

async fn progress_handler(State(state): State<AppState>, Path(plan_id): Path<String>) -> Response {
    result_response(run_blocking(move || plan_progress(&state, &plan_id)).await)
}

fn load_income(state: &AppState, plan_id: &str) -> WorkbookResult<PlanIncomeResponse> {
    let plan = PlanId::parse(plan_id)?;
    let planner = load_income_planning(state.store.as_ref(), &plan)?;
    Ok(plan_income_response(&plan, &planner))
}

fn replace_income(
    state: &AppState,
    plan_id: &str,
    inputs: IncomePlanningInputs,
) -> WorkbookResult<PlanIncomeResponse> {
    let plan = PlanId::parse(plan_id)?;
    let planner = IncomePlanner::new(inputs);
    state.with_plan_lock(&plan, || {
        save_income_planning(state.store.as_ref(), &plan, &planner)
    })?;
    tracing::info!(plan = %plan, "replaced income-planning inputs");
    Ok(plan_income_response(&plan, &planner))
}

fn update_income(
    state: &AppState,
    plan_id: &str,
    update: InputUpdate,
) -> WorkbookResult<PlanIncomeResponse> {
    let plan = PlanId::parse(plan_id)?;
    let planner = state.with_plan_lock(&plan, || {
        let mut planner = load_income_planning(state.store.as_ref(), &plan)?;
        planner.apply(update);
        save_income_planning(state.store.as_ref(), &plan, &planner)?;
        Ok(planner)
    })?;
    tracing::debug!(plan = %plan, "applied income-planning update");
    Ok(plan_income_response(&plan, &planner))
}

fn load_section(state: &AppState, plan_id: &str, section: &str) -> WorkbookResult<SectionResponse> {
    let plan = PlanId::parse(plan_id)?;
    let key: SectionKey = section.parse()?;
    let not_found = || WorkbookError::NotFound {
        plan_id: plan.to_string(),
        section: key.to_string(),
    };

    let stored = state.store.load(&plan, key)?.ok_or_else(not_found)?;
    if key == SectionKey::IncomePlanning {
        // Stored metrics may be stale; answer with a fresh derivation.
        let planner = income_planner_from_stored(&plan, stored)?;
        return income_section_response(&plan, &planner);
    }
    Ok(section_response(&plan, key, stored))
}

fn save_section(
    state: &AppState,
    plan_id: &str,
    section: &str,
    document: Value,
) -> WorkbookResult<SectionResponse> {
    let plan = PlanId::parse(plan_id)?;
    let key: SectionKey = section.parse()?;

    if key == SectionKey::IncomePlanning {
        let inputs: IncomePlanningInputs = serde_json::from_value(document)
            .map_err(|e| WorkbookError::InvalidUpdate(e.to_string()))?;
        let planner = IncomePlanner::new(inputs);
        state.with_plan_lock(&plan, || {
            save_income_planning(state.store.as_ref(), &plan, &planner)
        })?;
        tracing::info!(plan = %plan, section = %key, "saved section");
        return income_section_response(&plan, &planner);
    }

    state.with_plan_lock(&plan, || state.store.save(&plan, key, &document))?;
    tracing::info!(plan = %plan, section = %key, "saved section");
    Ok(section_response(&plan, key, document))
}

fn plan_progress(state: &AppState, plan_id: &str) -> WorkbookResult<PlanProgressResponse> {
    let plan = PlanId::parse(plan_id)?;
    let mut sections = Vec::with_capacity(SectionKey::ALL.len());

    for key in SectionKey::ALL {
        let stored = state.store.load(&plan, key)?;
        let saved = stored.is_some();
        let progress = match (key, stored) {
            (SectionKey::IncomePlanning, Some(document)) => {
                income_planner_from_stored(&plan, document)?.report().progress
            }
            (SectionKey::IncomePlanning, None) => IncomePlanner::default().report().progress,
            (_, Some(document)) => json_progress(&document),
            (_, None) => Progress::from_counts(0, 0),
        };
        sections.push(SectionProgress {
            section: key,
            saved,
            complete: progress.is_complete(),
            progress,
        });
    }

    // Each section weighs the same, whatever its number of fields.
    let overall_percent_complete = sections
        .iter()
        .map(|s| s.progress.percent_complete)
        .sum::<f64>()
        / sections.len() as f64;

    Ok(PlanProgressResponse {
        plan_id: plan.to_string(),
        sections,
        overall_percent_complete,
    })
}

fn plan_income_response(plan: &PlanId, planner: &IncomePlanner) -> PlanIncomeResponse {
    PlanIncomeResponse {
        plan_id: plan.to_string(),
        report: planner.report(),
    }
}

fn income_section_response(
    plan: &PlanId,
    planner: &IncomePlanner,
) -> WorkbookResult<SectionResponse> {
    let report = planner.report();
    Ok(SectionResponse {
        plan_id: plan.to_string(),
        section: SectionKey::IncomePlanning,
        document: serde_json::to_value(planner.to_section())?,
        progress: report.progress,
    })
}

fn section_response(plan: &PlanId, key: SectionKey, document: Value) -> SectionResponse {
    let progress = json_progress(&document);
    SectionResponse {
        plan_id: plan.to_string(),
        section: key,
        document,
        progress,
    }
}

fn error_status(err: &WorkbookError) -> StatusCode {
    match err {
        err if err.is_not_found() => StatusCode::NOT_FOUND,
        err if err.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn result_response<T: Serialize>(result: WorkbookResult<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            let status = error_status(&err);
            if status.is_server_error() {
                tracing::error!(error = %err, "request failed");
            } else {
                tracing::warn!(error = %err, "request rejected");
            }
            error_response(status, &err.to_string())
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    tracing::warn!(error = %rejection.body_text(), "invalid JSON payload");
    error_response(rejection.status(), &rejection.body_text())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
