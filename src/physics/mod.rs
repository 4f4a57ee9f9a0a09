//! Physics of the layout: parameters, force law, collisions and the
//! integrator that advances the graph one tick at a time.

pub mod collision;
pub mod force;
pub mod integrator;
pub mod params;

pub use collision::{CollisionPhase, CollisionPolicy, CollisionResponse, CollisionSet};
pub use integrator::friction_divisor;
pub use params::{ForceFactors, PhysicsParams, SimulationParameters, World};
