//! Independent Set Physics - WASM Module
//!
//! A force-directed heuristic for spotting large independent sets in a
//! random graph. Adjacent vertices repel and non-adjacent vertices attract,
//! so after enough ticks mutually non-adjacent vertices cluster together and
//! a circular region drawn around a cluster is a good candidate independent
//! set. The module is compiled to WebAssembly and exposes a JavaScript API
//! via wasm-bindgen; rendering, timers and widgets stay on the JS side.
//!
//! # Architecture
//!
//! - `geometry`: 2D vector arithmetic
//! - `graph`: Vertices, edges, petgraph topology and random generation
//! - `physics`: Parameters, force law, collision policies and the integrator
//! - `spatial`: R-tree index used to gather region members
//! - `query`: Region queries and independence checking
//! - `simulation`: The driver and its Stopped/Running/Paused state machine

use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod geometry;
pub mod graph;
pub mod logging;
pub mod physics;
pub mod query;
pub mod simulation;
pub mod spatial;

pub use error::SimulationError;
pub use geometry::Vector2;
pub use graph::{Edge, VertexGraph, VertexId};
pub use physics::SimulationParameters;
pub use query::{QueryResult, RegionQuery};
pub use simulation::{Simulation, SimulationState, Snapshot};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Forward `tracing` events to the browser console.
///
/// `level` defaults to "info".
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    logging::init_logging(level.as_deref().unwrap_or("info"))?;
    Ok(())
}

/// Query result in the shape the page renders.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryReport {
    members: Vec<u32>,
    names: Vec<String>,
    display: String,
    is_independent: bool,
    conflict: Option<[u32; 2]>,
    summary: String,
}

impl From<QueryResult> for QueryReport {
    fn from(result: QueryResult) -> Self {
        Self {
            members: result.members.iter().map(|id| id.raw()).collect(),
            names: result.member_names(),
            display: result.display_list(),
            is_independent: result.is_independent,
            conflict: result.conflict.map(|e| [e.from().raw(), e.to().raw()]),
            summary: result.summary(),
        }
    }
}

/// Split [x0, y0, x1, y1, ...] into points.
fn unpack_positions(flat: &[f64]) -> Result<Vec<Vector2>, SimulationError> {
    if flat.len() % 2 != 0 {
        return Err(SimulationError::InvalidParameters {
            reason: format!("positions buffer has odd length {}", flat.len()),
        });
    }
    Ok(flat
        .chunks_exact(2)
        .map(|xy| Vector2::new(xy[0], xy[1]))
        .collect())
}

/// Split [from0, to0, from1, to1, ...] into edges.
fn unpack_edges(flat: &[u32]) -> Result<Vec<Edge>, SimulationError> {
    if flat.len() % 2 != 0 {
        return Err(SimulationError::InvalidParameters {
            reason: format!("edges buffer has odd length {}", flat.len()),
        });
    }
    flat.chunks_exact(2)
        .map(|pair| {
            Edge::new(VertexId(pair[0]), VertexId(pair[1])).ok_or_else(|| {
                SimulationError::InvalidParameters {
                    reason: format!("self loop on V_{}", pair[0]),
                }
            })
        })
        .collect()
}

/// Main entry point for the simulation.
///
/// This struct wraps the `Simulation` driver and provides the public API
/// exposed to JavaScript. The page calls `step()` once per animation tick
/// and reads positions back for drawing.
#[wasm_bindgen]
pub struct IndependentSetSim {
    sim: Simulation,
}

#[wasm_bindgen]
impl IndependentSetSim {
    /// Create a stopped simulation.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            sim: Simulation::new(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a run on a random graph.
    ///
    /// `params` is a plain object with camelCase `SimulationParameters`
    /// fields; omitted fields take their defaults.
    pub fn start(&mut self, params: JsValue) -> Result<(), JsError> {
        let params: SimulationParameters = serde_wasm_bindgen::from_value(params)?;
        self.sim.start(params)?;
        Ok(())
    }

    /// Start a run on a given graph.
    ///
    /// The positions array should be [x0, y0, x1, y1, ...] and the edges
    /// array [from0, to0, from1, to1, ...].
    #[wasm_bindgen(js_name = startWithGraph)]
    pub fn start_with_graph(
        &mut self,
        params: JsValue,
        positions: &[f64],
        edges: &[u32],
    ) -> Result<(), JsError> {
        let params: SimulationParameters = serde_wasm_bindgen::from_value(params)?;
        let positions = unpack_positions(positions)?;
        let edges = unpack_edges(edges)?;
        self.sim.start_with_graph(params, &positions, &edges)?;
        Ok(())
    }

    /// Discard the current run.
    pub fn stop(&mut self) {
        self.sim.stop();
    }

    /// Suspend ticking; queries become available.
    pub fn pause(&mut self) -> Result<(), JsError> {
        self.sim.pause()?;
        Ok(())
    }

    /// Continue ticking.
    pub fn resume(&mut self) -> Result<(), JsError> {
        self.sim.resume()?;
        Ok(())
    }

    /// Pause when running, resume when paused.
    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) -> Result<(), JsError> {
        self.sim.toggle_pause()?;
        Ok(())
    }

    /// Advance one tick. Returns false while paused.
    pub fn step(&mut self) -> Result<bool, JsError> {
        Ok(self.sim.step()?)
    }

    /// Current state: "stopped", "running" or "paused".
    pub fn state(&self) -> String {
        self.sim.state().to_string()
    }

    /// Completed ticks.
    pub fn iteration(&self) -> f64 {
        self.sim.iteration() as f64
    }

    /// Seed of the generated graph, if any.
    pub fn seed(&self) -> Option<f64> {
        self.sim.seed().map(|seed| seed as f64)
    }

    // =========================================================================
    // Rendering Output
    // =========================================================================

    /// Number of vertices, anchor included.
    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> u32 {
        self.sim.graph().map_or(0, |g| g.vertex_count() as u32)
    }

    /// Number of edges.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.sim.graph().map_or(0, |g| g.edge_count() as u32)
    }

    /// Positions as [x0, y0, x1, y1, ...], anchor last.
    pub fn positions(&self) -> Float64Array {
        let positions = self.sim.graph().map(VertexGraph::positions).unwrap_or_default();
        Float64Array::from(&positions[..])
    }

    /// Velocities as [vx0, vy0, vx1, vy1, ...], anchor last.
    pub fn velocities(&self) -> Float64Array {
        let velocities = self.sim.graph().map(VertexGraph::velocities).unwrap_or_default();
        Float64Array::from(&velocities[..])
    }

    /// Edges as [from0, to0, from1, to1, ...] for drawing.
    #[wasm_bindgen(js_name = edgePairs)]
    pub fn edge_pairs(&self) -> Vec<u32> {
        self.sim.graph().map(VertexGraph::edge_pairs).unwrap_or_default()
    }

    /// Full snapshot of state, iteration, vertices and edges.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.sim.snapshot())?)
    }

    /// Effective attraction, repulsion and anchor mass of the run, for
    /// writing back into the page's fields.
    #[wasm_bindgen(js_name = effectiveFactors)]
    pub fn effective_factors(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.sim.effective_factors())?)
    }

    /// Log every vertex's kinematic state at debug level.
    #[wasm_bindgen(js_name = logVertices)]
    pub fn log_vertices(&self) {
        self.sim.log_vertices();
    }

    // =========================================================================
    // Region Queries
    // =========================================================================

    /// Check the mobile vertices strictly inside a circle for independence.
    ///
    /// Only allowed while paused.
    #[wasm_bindgen(js_name = queryRegion)]
    pub fn query_region(
        &self,
        center_x: f64,
        center_y: f64,
        radius: f64,
    ) -> Result<JsValue, JsError> {
        let result = self
            .sim
            .query_region(&RegionQuery::new(center_x, center_y, radius))?;
        Ok(serde_wasm_bindgen::to_value(&QueryReport::from(result))?)
    }

    /// Check the region given in the run's parameters.
    #[wasm_bindgen(js_name = queryConfiguredRegion)]
    pub fn query_configured_region(&self) -> Result<JsValue, JsError> {
        let result = self.sim.query_configured_region()?;
        Ok(serde_wasm_bindgen::to_value(&QueryReport::from(result))?)
    }
}

impl Default for IndependentSetSim {
    fn default() -> Self {
        Self::new()
    }
}
