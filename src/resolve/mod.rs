//! Entity resolution and deduplication
//!
//! The [`Resolver`] owns one content-key registry and ID counter per entity
//! kind, seeded from durable storage at startup, and is passed explicitly to
//! everything that needs an ID.

mod location;
mod registry;
mod resolver;

pub use location::{parse_place, region_for, LocationResolver};
pub use registry::{KindRegistry, Resolved};
pub use resolver::{KindCounts, ResolutionStats, Resolver};
