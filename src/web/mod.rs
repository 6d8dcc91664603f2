use std::{collections::BTreeMap, convert::Infallible, net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::oneshot};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    action::Action,
    catalog::{
        self, BuildingType, ResourceKind, WorkerType, CYCLE_MS, GRID_SIZE,
        MAX_WORKERS_PER_BUILDING, WORKER_COST,
    },
    config::SimulationConfig,
    engine::{run_cycles, SharedSimulation},
    snapshot::SimulationSnapshot,
    state::SimulationState,
};

pub struct WebServerConfig {
    pub simulation: SimulationConfig,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub building: BuildingType,
    pub label: &'static str,
    pub worker_type: WorkerType,
    pub output_resource: ResourceKind,
    pub output_per_worker: u64,
    pub cost: BTreeMap<ResourceKind, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub buildings: Vec<CatalogEntry>,
    pub worker_cost: BTreeMap<ResourceKind, u64>,
    pub grid_size: usize,
    pub max_workers_per_building: u32,
    pub cycle_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub snapshot: SimulationSnapshot,
}

pub fn router(simulation: SharedSimulation) -> Router {
    Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/catalog", get(catalog_view))
        .route("/api/actions", post(apply_action))
        .route("/api/events", get(stream_events))
        .with_state(simulation)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        simulation,
        host,
        port,
    } = config;

    let shared = SharedSimulation::new(SimulationState::with_system_clock(&simulation));
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let driver = tokio::spawn(run_cycles(shared.clone(), async move {
        let _ = stop_rx.await;
    }));

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, session = %simulation.name, "presentation bridge listening");

    axum::serve(listener, router(shared))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = stop_tx.send(());
    driver.await.context("cycle driver task failed")?;
    tracing::info!("presentation bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}

async fn latest_state(State(simulation): State<SharedSimulation>) -> Json<SimulationSnapshot> {
    Json(simulation.snapshot())
}

async fn catalog_view() -> Json<CatalogResponse> {
    let buildings = catalog::all()
        .iter()
        .map(|spec| CatalogEntry {
            building: spec.building,
            label: spec.label,
            worker_type: spec.worker_type,
            output_resource: spec.output_resource,
            output_per_worker: spec.output_per_worker,
            cost: spec.cost.iter().copied().collect(),
        })
        .collect();
    Json(CatalogResponse {
        buildings,
        worker_cost: WORKER_COST.iter().copied().collect(),
        grid_size: GRID_SIZE,
        max_workers_per_building: MAX_WORKERS_PER_BUILDING,
        cycle_ms: CYCLE_MS,
    })
}

async fn apply_action(
    State(simulation): State<SharedSimulation>,
    Json(action): Json<Action>,
) -> (StatusCode, Json<ActionResponse>) {
    let outcome = simulation.apply(action);
    match outcome.result {
        Ok(()) => (
            StatusCode::OK,
            Json(ActionResponse {
                ok: true,
                error: None,
                snapshot: outcome.snapshot,
            }),
        ),
        Err(err) => (
            StatusCode::CONFLICT,
            Json(ActionResponse {
                ok: false,
                error: Some(err.to_string()),
                snapshot: outcome.snapshot,
            }),
        ),
    }
}

async fn stream_events(
    State(simulation): State<SharedSimulation>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = simulation.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(update) => serde_json::to_string(&update)
            .ok()
            .map(|payload| Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
