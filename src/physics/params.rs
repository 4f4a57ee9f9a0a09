//! Simulation parameters.
//!
//! `SimulationParameters` is the JS-facing configuration object. It is
//! deserialized with camelCase field names, every field has a default, and
//! the three force factors may be left unset to have them derived from the
//! graph size. `resolve` validates the whole object and produces the numeric
//! `PhysicsParams` the integrator works with.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::geometry::Vector2;
use crate::query::RegionQuery;

/// Canvas-equivalent world the vertices live in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    /// Width of the bounding box `[0, width]`.
    pub width: f64,
    /// Height of the bounding box `[0, height]`.
    pub height: f64,
    /// Drawing radius of a vertex; walls and collisions are measured in it.
    pub vertex_radius: f64,
}

impl World {
    /// Distance from each edge that initial positions are kept clear of.
    pub const PLACEMENT_MARGIN: f64 = 20.0;

    /// Wall contact distance in vertex radii.
    pub const WALL_CONTACT_RADII: f64 = 1.25;

    /// The center of the box, where the anchor sits.
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a vertex at `position` touches any wall.
    pub fn touches_wall(&self, position: Vector2) -> bool {
        let reach = Self::WALL_CONTACT_RADII * self.vertex_radius;
        position.x <= reach
            || position.y <= reach
            || position.x >= self.width - reach
            || position.y >= self.height - reach
    }

    /// Clamp a position into the placement area.
    pub fn clamp_to_placement(&self, position: Vector2) -> Vector2 {
        let m = Self::PLACEMENT_MARGIN;
        Vector2::new(
            position.x.min(self.width - m).max(m),
            position.y.min(self.height - m).max(m),
        )
    }

    fn validate(&self) -> Result<()> {
        let min_extent = 2.0 * Self::PLACEMENT_MARGIN;
        if !(self.width.is_finite() && self.width >= min_extent) {
            return Err(SimulationError::invalid_parameters(format!(
                "width must be a finite value of at least {min_extent}, got {}",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height >= min_extent) {
            return Err(SimulationError::invalid_parameters(format!(
                "height must be a finite value of at least {min_extent}, got {}",
                self.height
            )));
        }
        if !(self.vertex_radius.is_finite() && self.vertex_radius > 0.0) {
            return Err(SimulationError::invalid_parameters(format!(
                "vertexRadius must be positive and finite, got {}",
                self.vertex_radius
            )));
        }
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            vertex_radius: 10.0,
        }
    }
}

/// Strength constants of the force law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceFactors {
    /// Scales attraction between non-adjacent vertices.
    pub attraction: f64,
    /// Scales repulsion between adjacent vertices.
    pub repulsion: f64,
    /// Mass of the anchor vertex.
    pub anchor_mass: f64,
}

impl ForceFactors {
    /// Attraction used when not overridden.
    pub const DEFAULT_ATTRACTION: f64 = 1.0;

    /// Anchor mass used when not overridden.
    pub const DEFAULT_ANCHOR_MASS: f64 = 4.0;

    /// Both bounds of the vertex/edge ratio clamp. Equal bounds pin the ratio,
    /// so the derived repulsion is always `2.25 * vertex_count`.
    const RATIO_CLAMP: f64 = 1.5;

    /// Repulsion derived from the graph size:
    /// `1.5 * n * max(1.5, min(1.5, n / m))`.
    pub fn auto_repulsion(vertex_count: usize, edge_count: usize) -> f64 {
        let n = vertex_count as f64;
        let ratio = n / edge_count as f64;
        1.5 * n * ratio.min(Self::RATIO_CLAMP).max(Self::RATIO_CLAMP)
    }

    /// Factors derived entirely from the graph size.
    pub fn auto(vertex_count: usize, edge_count: usize) -> Self {
        Self {
            attraction: Self::DEFAULT_ATTRACTION,
            repulsion: Self::auto_repulsion(vertex_count, edge_count),
            anchor_mass: Self::DEFAULT_ANCHOR_MASS,
        }
    }
}

/// Parameters supplied by the caller when a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationParameters {
    /// Number of free vertices.
    pub vertex_count: i64,
    /// Number of distinct random edges.
    pub edge_count: i64,
    /// Manual attraction factor; derived when None.
    pub attraction_factor: Option<f64>,
    /// Manual repulsion factor; derived when None.
    pub repulsion_factor: Option<f64>,
    /// Manual anchor mass; derived when None.
    pub anchor_mass: Option<f64>,
    /// Place an immobile anchor at the center.
    pub use_anchor: bool,
    /// Reflect vertices that touch the walls.
    pub use_walls: bool,
    /// Reflect vertices that come within reach of another vertex.
    pub collide_with_vertices: bool,
    /// Push vertices out of the box around each anchor.
    pub collide_with_anchors: bool,
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Vertex radius.
    pub vertex_radius: f64,
    /// Generator seed; drawn from the environment when None.
    pub seed: Option<u64>,
    /// Region to check with `query_configured_region`.
    pub region_query: Option<RegionQuery>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        let world = World::default();
        Self {
            vertex_count: 0,
            edge_count: 0,
            attraction_factor: None,
            repulsion_factor: None,
            anchor_mass: None,
            use_anchor: false,
            use_walls: true,
            collide_with_vertices: false,
            collide_with_anchors: false,
            width: world.width,
            height: world.height,
            vertex_radius: world.vertex_radius,
            seed: None,
            region_query: None,
        }
    }
}

impl SimulationParameters {
    /// Parameters for a graph of the given size with everything else default.
    pub fn new(vertex_count: i64, edge_count: i64) -> Self {
        Self {
            vertex_count,
            edge_count,
            ..Self::default()
        }
    }

    /// The world described by these parameters.
    pub fn world(&self) -> World {
        World {
            width: self.width,
            height: self.height,
            vertex_radius: self.vertex_radius,
        }
    }

    /// Validate and resolve into numeric physics parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for negative counts, more edges than
    /// distinct vertex pairs, non-finite or non-positive factors, or a
    /// world too small for the placement margin.
    pub fn resolve(&self) -> Result<PhysicsParams> {
        let vertex_count = usize::try_from(self.vertex_count).map_err(|_| {
            SimulationError::invalid_parameters(format!(
                "vertexCount must not be negative, got {}",
                self.vertex_count
            ))
        })?;
        let edge_count = usize::try_from(self.edge_count).map_err(|_| {
            SimulationError::invalid_parameters(format!(
                "edgeCount must not be negative, got {}",
                self.edge_count
            ))
        })?;

        let max_edges = max_edge_count(vertex_count);
        if edge_count as u128 > max_edges {
            return Err(SimulationError::invalid_parameters(format!(
                "edgeCount {edge_count} exceeds the {max_edges} distinct pairs of {vertex_count} vertices"
            )));
        }

        let world = self.world();
        world.validate()?;

        let defaults = ForceFactors::auto(vertex_count, edge_count);
        let factors = ForceFactors {
            attraction: self.attraction_factor.unwrap_or(defaults.attraction),
            repulsion: self.repulsion_factor.unwrap_or(defaults.repulsion),
            anchor_mass: self.anchor_mass.unwrap_or(defaults.anchor_mass),
        };
        require_finite("attractionFactor", factors.attraction)?;
        require_finite("repulsionFactor", factors.repulsion)?;
        if !(factors.anchor_mass.is_finite() && factors.anchor_mass > 0.0) {
            return Err(SimulationError::invalid_parameters(format!(
                "anchorMass must be positive and finite, got {}",
                factors.anchor_mass
            )));
        }

        if let Some(region) = &self.region_query {
            region.validate()?;
        }

        Ok(PhysicsParams {
            vertex_count,
            edge_count,
            factors,
            world,
            use_anchor: self.use_anchor,
            use_walls: self.use_walls,
            collide_with_vertices: self.collide_with_vertices,
            collide_with_anchors: self.collide_with_anchors,
        })
    }
}

/// Number of distinct unordered pairs among `vertex_count` vertices.
pub fn max_edge_count(vertex_count: usize) -> u128 {
    let n = vertex_count as u128;
    n * n.saturating_sub(1) / 2
}

fn require_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameters(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Validated, numeric parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Number of free vertices.
    pub vertex_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Effective force factors.
    pub factors: ForceFactors,
    /// Bounding world.
    pub world: World,
    /// Anchor placement.
    pub use_anchor: bool,
    /// Wall reflection.
    pub use_walls: bool,
    /// Vertex pair collisions.
    pub collide_with_vertices: bool,
    /// Anchor push-out collisions.
    pub collide_with_anchors: bool,
}

impl PhysicsParams {
    /// Fixed integration step.
    pub const TIME_STEP: f64 = 1.0;
}
