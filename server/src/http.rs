use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use platform_api::{
    ApiResult, HealthStatus, Procedure, ProcedureKind,
    rpc::{RpcFailure, RpcSuccess},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::AppConfig,
    graphql::{self, SchemaType},
    rpc,
    service::EmployeeService,
};

#[derive(Clone)]
pub struct AppState {
    pub service: EmployeeService,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service: EmployeeService, config: Arc<AppConfig>) -> Self {
        Self {
            schema: graphql::build_schema(service.clone()),
            service,
            config,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    serve_on(listener, state).await
}

/// Serves on an already bound listener until Ctrl-C or SIGTERM.
pub async fn serve_on(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "staffdesk server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    // an empty list matches no origin
    CorsLayer::new()
        .allow_credentials(true)
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(AllowOrigin::list(allowed))
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    let cors = cors_layer(&state.config.cors_allowed_origins);
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/trpc/{procedure}",
            get(rpc_query_handler).post(rpc_mutation_handler),
        )
        .route("/graphql", post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus::ok_now())
}

#[derive(Debug, Default, Deserialize)]
struct RpcQueryParams {
    input: Option<String>,
}

async fn rpc_query_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<RpcQueryParams>,
) -> RpcReply {
    dispatch(&state, &path, ProcedureKind::Query, || {
        rpc::decode_query_input(params.input.as_deref())
    })
    .await
}

async fn rpc_mutation_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> RpcReply {
    dispatch(&state, &path, ProcedureKind::Mutation, || rpc::decode_body(&body)).await
}

async fn dispatch(
    state: &AppState,
    path: &str,
    method_kind: ProcedureKind,
    input: impl FnOnce() -> ApiResult<Value>,
) -> RpcReply {
    let procedure = match path.parse::<Procedure>() {
        Ok(procedure) => procedure,
        Err(err) => {
            return RpcReply::Failure(RpcFailure::new(
                "NOT_FOUND",
                404,
                err.to_string(),
                Some(path),
            ));
        }
    };
    if procedure.kind() != method_kind {
        let message = match method_kind {
            ProcedureKind::Query => {
                format!("unsupported GET-request to mutation procedure at path \"{path}\"")
            }
            ProcedureKind::Mutation => {
                format!("unsupported POST-request to query procedure at path \"{path}\"")
            }
        };
        return RpcReply::Failure(RpcFailure::new(
            "METHOD_NOT_SUPPORTED",
            405,
            message,
            Some(path),
        ));
    }

    let result = match input() {
        Ok(input) => rpc::call(&state.service, procedure, &input).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(data) => RpcReply::Data(data),
        Err(err) => RpcReply::Failure(RpcFailure::from_api_error(&err, Some(path))),
    }
}

#[derive(Debug)]
enum RpcReply {
    Data(Value),
    Failure(RpcFailure),
}

impl IntoResponse for RpcReply {
    fn into_response(self) -> Response {
        match self {
            RpcReply::Data(data) => (StatusCode::OK, Json(RpcSuccess::new(data))).into_response(),
            RpcReply::Failure(failure) => {
                let status = StatusCode::from_u16(failure.error.data.http_status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(failure)).into_response()
            }
        }
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
