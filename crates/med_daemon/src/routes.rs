use crate::hosted::{self, HostedSimulator};
use crate::state::{AppState, Session, UpdateCause};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use med_content::Page;
use med_core::{CaseError, Dka, QuizError, QuizRunner, Sepsis};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const HEARTBEAT_PERIOD: Duration = Duration::from_secs(5);

type ApiError = (StatusCode, Json<Value>);
type ApiResult = Result<Json<Value>, ApiError>;

fn api_error(status: StatusCode, err: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": err.to_string() })))
}

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173").unwrap()
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{cors_origin}'"))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(Any);

    let router = Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/pages", get(pages_handler))
        .route("/api/v1/progress", get(progress_handler))
        .route("/api/v1/dark-mode/toggle", post(dark_mode_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/quiz", get(quiz_handler))
        .route("/api/v1/quiz/select", post(quiz_select_handler))
        .route("/api/v1/quiz/submit", post(quiz_submit_handler))
        .route("/api/v1/quiz/next", post(quiz_next_handler))
        .route("/api/v1/quiz/previous", post(quiz_previous_handler))
        .route("/api/v1/quiz/reset", post(quiz_reset_handler))
        .route("/api/v1/cases", get(cases_handler))
        .route("/api/v1/cases/:id/reveal", post(case_reveal_handler));
    let router = simulator_routes::<Sepsis>(router);
    let router = simulator_routes::<Dka>(router);

    Ok(router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn simulator_routes<M: HostedSimulator>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/api/v1/{}", M::NAME);
    router
        .route(&base, get(sim_view_handler::<M>))
        .route(&format!("{base}/start"), post(sim_start_handler::<M>))
        .route(&format!("{base}/stop"), post(sim_stop_handler::<M>))
        .route(&format!("{base}/reset"), post(sim_reset_handler::<M>))
        .route(&format!("{base}/action"), post(sim_action_handler::<M>))
        .route(
            &format!("{base}/state"),
            axum::routing::patch(sim_patch_handler::<M>),
        )
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<Value> {
    let session = app_state.session.lock();
    Json(json!({
        "content_version": session.content.content_version,
        "ticks_per_sec": app_state.ticks_per_sec,
        "sepsis_running": session.sepsis.is_running(),
        "dka_running": session.dka.is_running(),
        "dark_mode": session.store.dark_mode(),
    }))
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let session = app_state.session.lock();
    match session.store.to_json() {
        Ok(json) => {
            drop(session);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
        }
        Err(err) => {
            tracing::error!("snapshot serialization failed: {err}");
            drop(session);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

pub async fn pages_handler() -> Json<Value> {
    let pages: Vec<Value> = Page::ALL
        .iter()
        .map(|page| json!({ "page": page, "path": page.path(), "label": page.label() }))
        .collect();
    Json(Value::Array(pages))
}

pub async fn progress_handler(State(app_state): State<AppState>) -> Json<Value> {
    let session = app_state.session.lock();
    let progress = session.store.progress();
    Json(json!({
        "progress": progress,
        "average_score": progress.average_score(),
    }))
}

pub async fn dark_mode_handler(State(app_state): State<AppState>) -> Json<Value> {
    let mut session = app_state.session.lock();
    session.store.toggle_dark_mode();
    Json(json!({ "dark_mode": session.store.dark_mode() }))
}

// ---------------------------------------------------------------------------
// Simulators
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ActionRequest<A> {
    action: A,
}

pub async fn sim_view_handler<M: HostedSimulator>(
    State(app_state): State<AppState>,
) -> Json<Value> {
    let session = app_state.session.lock();
    Json(hosted::view::<M>(&session))
}

pub async fn sim_start_handler<M: HostedSimulator>(
    State(app_state): State<AppState>,
) -> Json<Value> {
    let mut session = app_state.session.lock();
    let (sim, _) = M::parts(&mut session);
    sim.start();
    Json(json!({ "running": sim.is_running() }))
}

pub async fn sim_stop_handler<M: HostedSimulator>(
    State(app_state): State<AppState>,
) -> Json<Value> {
    let mut session = app_state.session.lock();
    let (sim, _) = M::parts(&mut session);
    sim.stop();
    Json(json!({ "running": sim.is_running() }))
}

/// Applies `change` to `M` under the lock, broadcasts the resulting update and
/// returns the simulator's full view.
fn change_simulator<M: HostedSimulator>(
    app_state: &AppState,
    cause: UpdateCause,
    change: impl FnOnce(&mut Session),
) -> Json<Value> {
    let (update, view) = {
        let mut session = app_state.session.lock();
        let from = M::simulator(&session).feedback().len();
        change(&mut session);
        (
            hosted::update::<M>(&session, cause, from),
            hosted::view::<M>(&session),
        )
    };
    let _ = app_state.update_tx.send(update);
    Json(view)
}

pub async fn sim_reset_handler<M: HostedSimulator>(
    State(app_state): State<AppState>,
) -> Json<Value> {
    change_simulator::<M>(&app_state, UpdateCause::Reset, |session| {
        let (sim, store) = M::parts(session);
        sim.reset(store);
    })
}

pub async fn sim_action_handler<M: HostedSimulator>(
    State(app_state): State<AppState>,
    Json(request): Json<ActionRequest<M::Action>>,
) -> Json<Value> {
    change_simulator::<M>(&app_state, UpdateCause::Action, |session| {
        let (sim, store) = M::parts(session);
        M::apply(sim, store, request.action);
    })
}

pub async fn sim_patch_handler<M: HostedSimulator>(
    State(app_state): State<AppState>,
    Json(patch): Json<M::Patch>,
) -> Json<Value> {
    change_simulator::<M>(&app_state, UpdateCause::Patch, |session| {
        M::update(&mut session.store, &patch);
    })
}

// ---------------------------------------------------------------------------
// Quiz
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SelectRequest {
    answer: String,
}

fn quiz_view(quiz: &QuizRunner) -> Value {
    let question = quiz.current_question();
    json!({
        "index": quiz.index(),
        "total": quiz.len(),
        "question": {
            "id": question.id,
            "category": question.category,
            "type": question.kind,
            "difficulty": question.difficulty,
            "question": question.prompt,
            "options": question.options,
        },
        "pending_answer": quiz.pending_answer(),
        "phase": quiz.phase(),
        "score": quiz.score(),
        "result": quiz.last_result(),
        "is_complete": quiz.is_complete(),
        "can_go_next": quiz.can_go_next(),
        "can_go_previous": quiz.can_go_previous(),
    })
}

/// Runs `op` against the quiz and returns its view. Misuse maps to 409.
fn with_quiz(
    app_state: &AppState,
    op: impl FnOnce(&mut QuizRunner, &mut med_core::AppStore) -> Result<(), QuizError>,
) -> ApiResult {
    let mut session = app_state.session.lock();
    let Session { quiz, store, .. } = &mut *session;
    let quiz = quiz
        .as_mut()
        .ok_or_else(|| api_error(StatusCode::CONFLICT, QuizError::NoQuestions))?;
    op(&mut *quiz, &mut *store).map_err(|err| api_error(StatusCode::CONFLICT, err))?;
    Ok(Json(quiz_view(quiz)))
}

pub async fn quiz_handler(State(app_state): State<AppState>) -> ApiResult {
    with_quiz(&app_state, |_, _| Ok(()))
}

pub async fn quiz_select_handler(
    State(app_state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> ApiResult {
    with_quiz(&app_state, |quiz, _| quiz.select_answer(&request.answer))
}

pub async fn quiz_submit_handler(State(app_state): State<AppState>) -> ApiResult {
    with_quiz(&app_state, |quiz, store| quiz.submit(store).map(|_| ()))
}

pub async fn quiz_next_handler(State(app_state): State<AppState>) -> ApiResult {
    with_quiz(&app_state, |quiz, _| quiz.next())
}

pub async fn quiz_previous_handler(State(app_state): State<AppState>) -> ApiResult {
    with_quiz(&app_state, |quiz, _| quiz.previous())
}

pub async fn quiz_reset_handler(State(app_state): State<AppState>) -> ApiResult {
    with_quiz(&app_state, |quiz, _| {
        quiz.reset();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

pub async fn cases_handler(State(app_state): State<AppState>) -> Json<Value> {
    let session = app_state.session.lock();
    let progress = session.store.progress();
    let cases: Vec<Value> = session
        .content
        .cases
        .iter()
        .map(|case| {
            json!({
                "id": case.id,
                "title": case.title,
                "category": case.category,
                "difficulty": case.difficulty,
                "presentation": case.presentation,
                "labs": case.labs,
                "completed": progress.has_completed_case(&case.id),
            })
        })
        .collect();
    Json(Value::Array(cases))
}

pub async fn case_reveal_handler(
    State(app_state): State<AppState>,
    Path(case_id): Path<String>,
) -> ApiResult {
    let mut session = app_state.session.lock();
    let Session {
        cases,
        content,
        store,
        ..
    } = &mut *session;
    let case = cases.select(content, &case_id).map_err(|err| match err {
        CaseError::UnknownCase(_) => api_error(StatusCode::NOT_FOUND, err),
        CaseError::NothingSelected => api_error(StatusCode::CONFLICT, err),
    })?;
    cases
        .reveal_diagnosis(store)
        .map_err(|err| api_error(StatusCode::CONFLICT, err))?;
    Ok(Json(json!({
        "id": case.id,
        "diagnosis": case.diagnosis,
        "learning_points": case.learning_points,
    })))
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.update_tx.subscribe();
    let session = app_state.session.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_PERIOD);
        heartbeat.tick().await; // discard the immediate first tick
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(update) => {
                            let data = serde_json::to_string(&update).unwrap_or_default();
                            yield Ok(Event::default().event("update").data(data));
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = heartbeat.tick() => {
                    let (sepsis, dka, disposed) = {
                        let session = session.lock();
                        (
                            session.store.sepsis().time_elapsed,
                            session.store.dka().time_elapsed,
                            session.is_disposed(),
                        )
                    };
                    // Lets graceful shutdown finish with subscribers attached.
                    if disposed {
                        break;
                    }
                    let hb = json!({"heartbeat": true, "sepsis": sepsis, "dka": dka});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
