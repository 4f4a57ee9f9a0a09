//! Simulation driver.
//!
//! Owns the state of one run and sequences generation, ticking and region
//! queries behind a small state machine:
//!
//! ```text
//!   Stopped --start--> Running --pause--> Paused
//!      ^                  ^  <--resume--    |
//!      +------stop--------+-------stop------+
//! ```
//!
//! `start` from any state discards the current run and generates a fresh
//! graph. Queries are only answered while paused, so a query never observes
//! a half-finished tick.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::error::{Result, SimulationError};
use crate::geometry::Vector2;
use crate::graph::{self, AnchorSpec, Edge, VertexGraph};
use crate::physics::integrator;
use crate::physics::{CollisionSet, ForceFactors, PhysicsParams, SimulationParameters};
use crate::query::{self, QueryResult, RegionQuery};

/// Lifecycle state of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SimulationState {
    /// No run exists.
    #[default]
    Stopped,
    /// Ticks advance the layout.
    Running,
    /// Ticks are ignored and queries are allowed.
    Paused,
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        })
    }
}

/// Everything belonging to one run.
#[derive(Debug, Clone)]
struct Run {
    params: SimulationParameters,
    physics: PhysicsParams,
    collisions: CollisionSet,
    graph: VertexGraph,
    iteration: u64,
    seed: Option<u64>,
}

/// Kinematic state of one vertex for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexSnapshot {
    /// Vertex id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Position X.
    pub x: f64,
    /// Position Y.
    pub y: f64,
    /// Velocity X.
    pub vx: f64,
    /// Velocity Y.
    pub vy: f64,
    /// False for the anchor.
    pub mobile: bool,
}

/// Read-only view of the driver for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Driver state.
    pub state: SimulationState,
    /// Completed ticks.
    pub iteration: u64,
    /// All vertices, anchor last.
    pub vertices: Vec<VertexSnapshot>,
    /// All edges.
    pub edges: Vec<Edge>,
}

/// The simulation driver.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    state: SimulationState,
    run: Option<Run>,
}

impl Simulation {
    /// Create a stopped driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a new run on a randomly generated graph.
    ///
    /// Any current run is discarded. The iteration counter restarts at 0.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if the parameters do not validate; the
    /// driver state is left unchanged in that case.
    pub fn start(&mut self, params: SimulationParameters) -> Result<()> {
        let physics = params.resolve()?;
        let seed = params.seed.unwrap_or_else(entropy_seed);
        let mut rng = SmallRng::seed_from_u64(seed);
        let graph = graph::generate(&physics, &mut rng)?;

        self.begin(params, physics, graph, Some(seed));
        Ok(())
    }

    /// Start a new run on caller-supplied positions and edges.
    ///
    /// `vertexCount` and `edgeCount` are taken from the inputs; the anchor is
    /// added when `useAnchor` is set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if the parameters do not validate or an
    /// edge references a missing vertex or repeats.
    pub fn start_with_graph(
        &mut self,
        params: SimulationParameters,
        positions: &[Vector2],
        edges: &[Edge],
    ) -> Result<()> {
        let params = SimulationParameters {
            vertex_count: positions.len() as i64,
            edge_count: edges.len() as i64,
            ..params
        };
        let physics = params.resolve()?;
        let anchor = physics.use_anchor.then(|| AnchorSpec {
            position: physics.world.center(),
            mass: physics.factors.anchor_mass,
        });
        let graph = VertexGraph::new(positions, edges, anchor)?;

        self.begin(params, physics, graph, None);
        Ok(())
    }

    fn begin(
        &mut self,
        params: SimulationParameters,
        physics: PhysicsParams,
        graph: VertexGraph,
        seed: Option<u64>,
    ) {
        info!(
            vertices = physics.vertex_count,
            edges = physics.edge_count,
            attraction = physics.factors.attraction,
            repulsion = physics.factors.repulsion,
            anchor = physics.use_anchor,
            walls = physics.use_walls,
            ?seed,
            "simulation started"
        );
        self.run = Some(Run {
            collisions: CollisionSet::from_params(&physics),
            params,
            physics,
            graph,
            iteration: 0,
            seed,
        });
        self.state = SimulationState::Running;
    }

    /// Discard the current run. Always succeeds.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            info!(iteration = run.iteration, "simulation stopped");
        }
        self.state = SimulationState::Stopped;
    }

    /// Suspend ticking.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless running.
    pub fn pause(&mut self) -> Result<()> {
        if self.state != SimulationState::Running {
            return Err(self.reject("pause"));
        }
        self.state = SimulationState::Paused;
        info!(iteration = self.iteration(), "simulation paused");
        Ok(())
    }

    /// Continue ticking.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless paused.
    pub fn resume(&mut self) -> Result<()> {
        if self.state != SimulationState::Paused {
            return Err(self.reject("resume"));
        }
        self.state = SimulationState::Running;
        info!(iteration = self.iteration(), "simulation resumed");
        Ok(())
    }

    /// Pause when running, resume when paused.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when stopped.
    pub fn toggle_pause(&mut self) -> Result<()> {
        match self.state {
            SimulationState::Running => self.pause(),
            SimulationState::Paused => self.resume(),
            SimulationState::Stopped => Err(self.reject("toggle pause")),
        }
    }

    fn reject(&self, operation: &'static str) -> SimulationError {
        warn!(operation, state = %self.state, "operation rejected");
        SimulationError::InvalidState {
            operation,
            state: self.state,
        }
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Advance one tick.
    ///
    /// Returns true if the layout advanced and false while paused.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when stopped.
    pub fn step(&mut self) -> Result<bool> {
        match self.state {
            SimulationState::Stopped => return Err(self.reject("step")),
            SimulationState::Paused => return Ok(false),
            SimulationState::Running => {}
        }
        let Some(run) = self.run.as_mut() else {
            return Ok(false);
        };

        integrator::step(&mut run.graph, &run.physics, &run.collisions, run.iteration);
        run.iteration += 1;
        trace!(iteration = run.iteration, "tick");
        Ok(true)
    }

    /// Completed ticks of the current run, 0 when stopped.
    pub fn iteration(&self) -> u64 {
        self.run.as_ref().map_or(0, |run| run.iteration)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Collect the mobile vertices strictly inside `region` and check that no
    /// two of them share an edge.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless paused, and `InvalidParameters` for a
    /// malformed region.
    pub fn query_region(&self, region: &RegionQuery) -> Result<QueryResult> {
        if self.state != SimulationState::Paused {
            return Err(self.reject("query a region"));
        }
        region.validate()?;
        let Some(run) = self.run.as_ref() else {
            return Err(self.reject("query a region"));
        };

        let result = query::query_region(&run.graph, region);
        debug!(
            center_x = region.center_x,
            center_y = region.center_y,
            radius = region.radius,
            members = result.size(),
            independent = result.is_independent,
            "region queried"
        );
        Ok(result)
    }

    /// Run the region stored in the run's parameters.
    ///
    /// # Errors
    ///
    /// As `query_region`, plus `InvalidParameters` if no region was given.
    pub fn query_configured_region(&self) -> Result<QueryResult> {
        let region = self
            .run
            .as_ref()
            .and_then(|run| run.params.region_query)
            .ok_or_else(|| SimulationError::invalid_parameters("no regionQuery was configured"))?;
        self.query_region(&region)
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// The current graph, if a run exists.
    pub fn graph(&self) -> Option<&VertexGraph> {
        self.run.as_ref().map(|run| &run.graph)
    }

    /// Validated parameters of the current run.
    pub fn physics(&self) -> Option<&PhysicsParams> {
        self.run.as_ref().map(|run| &run.physics)
    }

    /// Effective force factors, manual or derived.
    pub fn effective_factors(&self) -> Option<ForceFactors> {
        self.physics().map(|physics| physics.factors)
    }

    /// Seed of the generated graph; None for caller-supplied graphs.
    pub fn seed(&self) -> Option<u64> {
        self.run.as_ref().and_then(|run| run.seed)
    }

    /// Snapshot of every vertex and edge.
    pub fn snapshot(&self) -> Snapshot {
        let (vertices, edges) = self.graph().map_or_else(
            || (Vec::new(), Vec::new()),
            |graph| {
                let vertices = graph
                    .vertices()
                    .iter()
                    .map(|v| VertexSnapshot {
                        id: v.id().raw(),
                        name: v.name(),
                        x: v.position.x,
                        y: v.position.y,
                        vx: v.velocity.x,
                        vy: v.velocity.y,
                        mobile: v.is_mobile(),
                    })
                    .collect();
                (vertices, graph.edges().to_vec())
            },
        );

        Snapshot {
            state: self.state,
            iteration: self.iteration(),
            vertices,
            edges,
        }
    }

    /// Emit every vertex's kinematic state at debug level.
    pub fn log_vertices(&self) {
        let Some(graph) = self.graph() else {
            return;
        };
        for v in graph.vertices() {
            debug!(
                vertex = %v.name(),
                position = %v.position,
                velocity = %v.velocity,
                acceleration = %v.acceleration,
                "vertex state"
            );
        }
    }
}

/// Seed for runs that did not ask for one.
#[cfg(target_arch = "wasm32")]
fn entropy_seed() -> u64 {
    (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64
}

/// Seed for runs that did not ask for one.
#[cfg(not(target_arch = "wasm32"))]
fn entropy_seed() -> u64 {
    use rand::RngCore;

    SmallRng::from_entropy().next_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VertexId;

    fn seeded(vertex_count: i64, edge_count: i64) -> SimulationParameters {
        SimulationParameters {
            seed: Some(11),
            ..SimulationParameters::new(vertex_count, edge_count)
        }
    }

    #[test]
    fn test_initial_state() {
        let sim = Simulation::new();
        assert_eq!(sim.state(), SimulationState::Stopped);
        assert_eq!(sim.iteration(), 0);
        assert!(sim.graph().is_none());
    }

    #[test]
    fn test_start_runs_fresh_graph() {
        let mut sim = Simulation::new();
        sim.start(seeded(10, 12)).unwrap();

        assert_eq!(sim.state(), SimulationState::Running);
        assert_eq!(sim.iteration(), 0);
        assert_eq!(sim.graph().unwrap().vertex_count(), 10);
        assert_eq!(sim.graph().unwrap().edge_count(), 12);
        assert_eq!(sim.seed(), Some(11));
    }

    #[test]
    fn test_unseeded_start_records_replayable_seed() {
        let mut sim = Simulation::new();
        sim.start(SimulationParameters::new(8, 6)).unwrap();
        let seed = sim.seed().unwrap();

        let mut replay = Simulation::new();
        replay
            .start(SimulationParameters {
                seed: Some(seed),
                ..SimulationParameters::new(8, 6)
            })
            .unwrap();
        assert_eq!(replay.snapshot(), sim.snapshot());
    }

    #[test]
    fn test_invalid_start_leaves_state() {
        let mut sim = Simulation::new();
        let err = sim.start(seeded(4, 7)).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameters { .. }));
        assert_eq!(sim.state(), SimulationState::Stopped);
    }

    #[test]
    fn test_step_counts_iterations() {
        let mut sim = Simulation::new();
        sim.start(seeded(5, 3)).unwrap();
        for _ in 0..4 {
            assert!(sim.step().unwrap());
        }
        assert_eq!(sim.iteration(), 4);
    }

    #[test]
    fn test_step_while_paused_is_noop() {
        let mut sim = Simulation::new();
        sim.start(seeded(5, 3)).unwrap();
        sim.step().unwrap();
        sim.pause().unwrap();
        let before = sim.graph().unwrap().positions();

        assert!(!sim.step().unwrap());
        assert_eq!(sim.iteration(), 1);
        assert_eq!(sim.graph().unwrap().positions(), before);
    }

    #[test]
    fn test_step_while_stopped_fails() {
        let mut sim = Simulation::new();
        assert!(matches!(
            sim.step(),
            Err(SimulationError::InvalidState {
                state: SimulationState::Stopped,
                ..
            })
        ));
    }

    #[test]
    fn test_pause_resume_transitions() {
        let mut sim = Simulation::new();
        assert!(sim.pause().is_err());
        assert!(sim.resume().is_err());

        sim.start(seeded(3, 1)).unwrap();
        assert!(sim.resume().is_err());
        sim.pause().unwrap();
        assert_eq!(sim.state(), SimulationState::Paused);
        assert!(sim.pause().is_err());
        sim.resume().unwrap();
        assert_eq!(sim.state(), SimulationState::Running);

        sim.toggle_pause().unwrap();
        assert_eq!(sim.state(), SimulationState::Paused);
        sim.toggle_pause().unwrap();
        assert_eq!(sim.state(), SimulationState::Running);
    }

    #[test]
    fn test_query_while_running_fails() {
        let mut sim = Simulation::new();
        sim.start(seeded(5, 2)).unwrap();
        let err = sim.query_region(&RegionQuery::new(100.0, 100.0, 50.0)).unwrap_err();
        assert_eq!(
            err,
            SimulationError::InvalidState {
                operation: "query a region",
                state: SimulationState::Running,
            }
        );
    }

    #[test]
    fn test_query_while_stopped_fails() {
        let sim = Simulation::new();
        assert!(matches!(
            sim.query_region(&RegionQuery::new(0.0, 0.0, 1.0)),
            Err(SimulationError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_stop_discards_run() {
        let mut sim = Simulation::new();
        sim.start(seeded(5, 2)).unwrap();
        sim.step().unwrap();
        sim.stop();

        assert_eq!(sim.state(), SimulationState::Stopped);
        assert_eq!(sim.iteration(), 0);
        assert!(sim.graph().is_none());
        assert!(sim.snapshot().vertices.is_empty());

        // stop is idempotent
        sim.stop();
        assert_eq!(sim.state(), SimulationState::Stopped);
    }

    #[test]
    fn test_restart_discards_previous_graph() {
        let mut sim = Simulation::new();
        sim.start(seeded(5, 2)).unwrap();
        sim.step().unwrap();
        sim.pause().unwrap();

        sim.start(SimulationParameters {
            seed: Some(12),
            ..SimulationParameters::new(8, 4)
        })
        .unwrap();
        assert_eq!(sim.state(), SimulationState::Running);
        assert_eq!(sim.iteration(), 0);
        assert_eq!(sim.graph().unwrap().vertex_count(), 8);
    }

    #[test]
    fn test_start_with_graph_and_query() {
        let positions = [
            Vector2::new(50.0, 50.0),
            Vector2::new(53.0, 50.0),
            Vector2::new(50.0, 55.0),
            Vector2::new(200.0, 200.0),
            Vector2::new(300.0, 100.0),
        ];
        let edges = [
            Edge::new(VertexId(0), VertexId(3)).unwrap(),
            Edge::new(VertexId(3), VertexId(4)).unwrap(),
        ];
        let mut sim = Simulation::new();
        sim.start_with_graph(SimulationParameters::default(), &positions, &edges)
            .unwrap();
        sim.pause().unwrap();

        let result = sim.query_region(&RegionQuery::new(50.0, 50.0, 10.0)).unwrap();
        assert_eq!(result.size(), 3);
        assert!(result.is_independent);
        assert_eq!(sim.seed(), None);
    }

    #[test]
    fn test_start_with_graph_rejects_nan_position() {
        let positions = [Vector2::new(f64::NAN, 50.0), Vector2::new(50.0, 50.0)];
        let mut sim = Simulation::new();
        let err = sim
            .start_with_graph(SimulationParameters::default(), &positions, &[])
            .unwrap_err();

        assert!(matches!(err, SimulationError::InvalidParameters { .. }));
        assert_eq!(sim.state(), SimulationState::Stopped);
        assert!(sim.graph().is_none());
    }

    #[test]
    fn test_query_configured_region() {
        let mut sim = Simulation::new();
        sim.start(SimulationParameters {
            region_query: Some(RegionQuery::new(400.0, 300.0, 1000.0)),
            ..seeded(6, 0)
        })
        .unwrap();
        sim.pause().unwrap();

        let result = sim.query_configured_region().unwrap();
        assert_eq!(result.size(), 6);
        assert!(result.is_independent);
    }

    #[test]
    fn test_query_configured_region_missing() {
        let mut sim = Simulation::new();
        sim.start(seeded(3, 0)).unwrap();
        sim.pause().unwrap();
        assert!(matches!(
            sim.query_configured_region(),
            Err(SimulationError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_effective_factors_reported() {
        let mut sim = Simulation::new();
        sim.start(seeded(10, 5)).unwrap();
        let factors = sim.effective_factors().unwrap();
        assert_eq!(factors.attraction, 1.0);
        assert_eq!(factors.repulsion, 22.5);
        assert_eq!(factors.anchor_mass, 4.0);
    }

    #[test]
    fn test_snapshot_contents() {
        let mut sim = Simulation::new();
        sim.start(SimulationParameters {
            use_anchor: true,
            ..seeded(3, 2)
        })
        .unwrap();
        sim.step().unwrap();

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.state, SimulationState::Running);
        assert_eq!(snapshot.iteration, 1);
        assert_eq!(snapshot.vertices.len(), 4);
        assert_eq!(snapshot.edges.len(), 2);
        assert_eq!(snapshot.vertices[0].name, "V_0");
        let anchor = &snapshot.vertices[3];
        assert_eq!(anchor.name, "x");
        assert!(!anchor.mobile);
        assert_eq!((anchor.x, anchor.y), (400.0, 300.0));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut sim = Simulation::new();
        sim.start(seeded(2, 1)).unwrap();

        let json = serde_json::to_value(sim.snapshot()).unwrap();
        assert_eq!(json["state"], "running");
        assert_eq!(json["iteration"], 0);
        assert_eq!(json["vertices"][1]["name"], "V_1");
        assert_eq!(json["vertices"][1]["mobile"], true);
        assert_eq!(json["edges"][0]["from"], 0);
        assert_eq!(json["edges"][0]["to"], 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SimulationState::Stopped.to_string(), "stopped");
        assert_eq!(SimulationState::Running.to_string(), "running");
        assert_eq!(SimulationState::Paused.to_string(), "paused");
    }
}
