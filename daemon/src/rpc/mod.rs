// HTTP surface of the earning engine
//
// Handlers only parse the request and translate errors, every rule lives in
// the engine. Authentication is done upstream.

use std::{marker::PhantomData, sync::Arc};

use actix_web::{
    dev::ServerHandle,
    get,
    http::StatusCode,
    web::{self, Bytes, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder, ResponseError,
};
use earn_common::{
    account::{MembershipStatus, UserId},
    plan::{Plan, PlanTier},
    task::{
        CompletionKey, EngagementProof, EngagementThresholds, MissingRequirement, TaskId,
        TaskStatus, TaskTemplate, TaskType,
    },
    time::{DayIndex, TimestampSeconds},
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use crate::core::{
    earning::EarningEngine,
    error::{EngineError, ErrorKind},
    storage::Storage,
};

pub type SharedEarningRpcServer<S> = Arc<EarningRpcServer<S>>;

pub struct EarningRpcServer<S: Storage> {
    handle: Mutex<Option<ServerHandle>>,
    _storage: PhantomData<S>,
}

/// Error rendered as an HTTP response
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        let err = match self {
            ApiError::Engine(err) => err,
            ApiError::InvalidBody(_) => return StatusCode::BAD_REQUEST,
        };
        match err.kind() {
            ErrorKind::Gate => StatusCode::FORBIDDEN,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Idempotence => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Ledger => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // never leak storage details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            if log::log_enabled!(log::Level::Error) {
                error!("request failed: {:#}", self);
            }
            "internal ledger error".to_string()
        } else {
            self.to_string()
        };

        let missing: &[MissingRequirement] = match self {
            ApiError::Engine(err) => err.missing_requirements(),
            ApiError::InvalidBody(_) => &[],
        };
        let body = if missing.is_empty() {
            json!({ "error": message })
        } else {
            json!({ "error": message, "missingRequirements": missing })
        };
        HttpResponse::build(status).json(body)
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct SubmitTaskRequest {
    #[serde(default)]
    pub proof: Option<EngagementProof>,
}

impl SubmitTaskRequest {
    /// An absent body is a submission without proof, a malformed one is rejected
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterAccountRequest {
    pub id: UserId,
    #[serde(default)]
    pub sponsor: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    pub plan: Option<PlanTier>,
    pub status: MembershipStatus,
    pub start: Option<TimestampSeconds>,
}

#[derive(Debug, Deserialize)]
pub struct PutTaskRequest {
    pub title: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub thresholds: Option<EngagementThresholds>,
}

impl PutTaskRequest {
    fn into_template(self, id: TaskId) -> TaskTemplate {
        let mut template = TaskTemplate::new(id, self.title, self.task_type);
        if let Some(status) = self.status {
            template.status = status;
        }
        template.thresholds = self.thresholds;
        template
    }
}

#[derive(Debug, Deserialize)]
pub struct TasksEnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExtendEarningsRequest {
    pub until: Option<TimestampSeconds>,
}

#[derive(Debug, Serialize)]
struct DailyTasksResponse<T: Serialize> {
    count: usize,
    tasks: Vec<T>,
}

impl<S: Storage> EarningRpcServer<S> {
    /// Bind and start serving in the background
    pub async fn new(
        engine: Arc<EarningEngine<S>>,
        bind_address: &str,
        threads: usize,
    ) -> Result<SharedEarningRpcServer<S>, anyhow::Error> {
        if bind_address.starts_with("0.0.0.0") {
            warn!("RPC server is bound to all interfaces, admin routes have no authentication");
        }

        if log::log_enabled!(log::Level::Info) {
            info!("Starting RPC server on {}", bind_address);
        }

        let server = Arc::new(Self {
            handle: Mutex::new(None),
            _storage: PhantomData,
        });

        let mut builder = HttpServer::new(move || {
            App::new()
                .app_data(Data::from(Arc::clone(&engine)))
                .configure(routes::<S>)
        })
        .disable_signals()
        .bind(bind_address)?;

        if threads > 0 {
            builder = builder.workers(threads);
        }
        let http_server = builder.run();

        {
            let mut lock = server.handle.lock().await;
            *lock = Some(http_server.handle());
        }

        tokio::spawn(async move {
            if let Err(e) = http_server.await {
                error!("RPC server stopped with error: {}", e);
            }
        });

        Ok(server)
    }

    pub async fn stop(&self) {
        info!("Stopping RPC Server...");
        let mut handle = self.handle.lock().await;
        if let Some(handle) = handle.take() {
            handle.stop(true).await;
            info!("RPC Server is now stopped!");
        } else {
            warn!("RPC Server is not running!");
        }
    }
}

/// Register every route on an app
pub fn routes<S: Storage>(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .route("/users/{id}/tasks/daily", web::get().to(daily_status::<S>))
        .route("/users/{id}/tasks/daily", web::post().to(assign_daily::<S>))
        .route("/users/{id}/tasks/{task}/submit", web::post().to(submit_task::<S>))
        .route("/users/{id}/stats", web::get().to(user_stats::<S>))
        .route("/users/{id}/notifications", web::get().to(user_notifications::<S>))
        .route("/plans", web::get().to(plans::<S>))
        .route("/admin/users", web::post().to(register_account::<S>))
        .route("/admin/users/{id}/membership", web::post().to(set_membership::<S>))
        .route("/admin/tasks/{id}", web::put().to(put_task::<S>))
        .route("/admin/plans", web::put().to(put_plan::<S>))
        .route("/admin/notifications", web::get().to(admin_notifications::<S>))
        .route("/admin/reviews", web::get().to(pending_reviews::<S>))
        .route(
            "/admin/reviews/{user}/{day}/{slot}/approve",
            web::post().to(approve_review::<S>),
        )
        .route(
            "/admin/users/{id}/tasks-enabled",
            web::post().to(set_tasks_enabled::<S>),
        )
        .route("/admin/users/{id}/extend", web::post().to(extend_earnings::<S>));
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn daily_status<S: Storage>(engine: Data<EarningEngine<S>>, id: Path<u64>) -> ApiResult {
    let status = engine.daily_status(UserId(id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(status))
}

async fn assign_daily<S: Storage>(engine: Data<EarningEngine<S>>, id: Path<u64>) -> ApiResult {
    let tasks = engine.assign_daily_tasks(UserId(id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(DailyTasksResponse {
        count: tasks.len(),
        tasks,
    }))
}

async fn submit_task<S: Storage>(
    engine: Data<EarningEngine<S>>,
    path: Path<(u64, u64)>,
    body: Bytes,
) -> ApiResult {
    let (user, task) = path.into_inner();
    let request = SubmitTaskRequest::from_body(&body)?;
    let outcome = engine
        .submit_task(UserId(user), TaskId(task), request.proof)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

async fn user_stats<S: Storage>(engine: Data<EarningEngine<S>>, id: Path<u64>) -> ApiResult {
    let stats = engine.user_stats(UserId(id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(stats))
}

async fn user_notifications<S: Storage>(engine: Data<EarningEngine<S>>, id: Path<u64>) -> ApiResult {
    let notifications = engine.notifications(Some(UserId(id.into_inner()))).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

async fn plans<S: Storage>(engine: Data<EarningEngine<S>>) -> ApiResult {
    let plans = engine.plans().await?;
    Ok(HttpResponse::Ok().json(plans))
}

async fn register_account<S: Storage>(
    engine: Data<EarningEngine<S>>,
    body: Json<RegisterAccountRequest>,
) -> ApiResult {
    let account = engine.register_account(body.id, body.sponsor).await?;
    Ok(HttpResponse::Created().json(account))
}

async fn set_membership<S: Storage>(
    engine: Data<EarningEngine<S>>,
    id: Path<u64>,
    body: Json<MembershipRequest>,
) -> ApiResult {
    let account = engine.set_membership(UserId(id.into_inner()), body.plan, body.status, body.start)?;
    Ok(HttpResponse::Ok().json(account))
}

async fn put_task<S: Storage>(
    engine: Data<EarningEngine<S>>,
    id: Path<u64>,
    body: Json<PutTaskRequest>,
) -> ApiResult {
    let template = body.into_inner().into_template(TaskId(id.into_inner()));
    let template = engine.put_task(template)?;
    Ok(HttpResponse::Ok().json(template))
}

async fn put_plan<S: Storage>(engine: Data<EarningEngine<S>>, body: Json<Plan>) -> ApiResult {
    let plan = engine.put_plan(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(plan))
}

async fn admin_notifications<S: Storage>(engine: Data<EarningEngine<S>>) -> ApiResult {
    let notifications = engine.notifications(None).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

async fn pending_reviews<S: Storage>(engine: Data<EarningEngine<S>>) -> ApiResult {
    let reviews = engine.pending_reviews().await?;
    Ok(HttpResponse::Ok().json(reviews))
}

async fn approve_review<S: Storage>(
    engine: Data<EarningEngine<S>>,
    path: Path<(u64, DayIndex, u8)>,
) -> ApiResult {
    let (user, day, slot) = path.into_inner();
    let outcome = engine
        .approve_review(CompletionKey::new(UserId(user), day, slot))
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

async fn set_tasks_enabled<S: Storage>(
    engine: Data<EarningEngine<S>>,
    id: Path<u64>,
    body: Json<TasksEnabledRequest>,
) -> ApiResult {
    let account = engine.set_tasks_enabled(UserId(id.into_inner()), body.enabled)?;
    Ok(HttpResponse::Ok().json(account))
}

async fn extend_earnings<S: Storage>(
    engine: Data<EarningEngine<S>>,
    id: Path<u64>,
    body: Json<ExtendEarningsRequest>,
) -> ApiResult {
    let account = engine.extend_earnings(UserId(id.into_inner()), body.until)?;
    Ok(HttpResponse::Ok().json(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use earn_common::eligibility::IneligibleReason;

    #[test]
    fn test_status_codes() {
        let status = |err: EngineError| ApiError::from(err).status_code();
        assert_eq!(status(IneligibleReason::WindowExpired.into()), StatusCode::FORBIDDEN);
        assert_eq!(status(EngineError::RequirementsNotMet(Vec::new())), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(EngineError::AlreadyCompleted(TaskId(1))), StatusCode::CONFLICT);
        assert_eq!(status(EngineError::UserNotFound(UserId(1))), StatusCode::NOT_FOUND);
        assert_eq!(status(EngineError::NoTasksAvailable), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_missing_requirements_body() {
        let err = ApiError::from(EngineError::RequirementsNotMet(vec![MissingRequirement::Scroll {
            required: 80,
            actual: 20,
        }]));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["missingRequirements"][0]["requirement"], "scroll");
        assert_eq!(value["missingRequirements"][0]["required"], 80);
    }

    #[test]
    fn test_submit_body_parsing() {
        assert!(SubmitTaskRequest::from_body(b"").unwrap().proof.is_none());
        assert!(SubmitTaskRequest::from_body(b" \n").unwrap().proof.is_none());
        assert!(SubmitTaskRequest::from_body(b"{}").unwrap().proof.is_none());

        let request = SubmitTaskRequest::from_body(br#"{"proof":{"time_spent":120}}"#).unwrap();
        assert_eq!(request.proof.map(|p| p.time_spent), Some(120));

        let err = SubmitTaskRequest::from_body(br#"{"proof":{"time_spent":"#).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let err = SubmitTaskRequest::from_body(br#"{"proof":{"time_spent":"long"}}"#).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
