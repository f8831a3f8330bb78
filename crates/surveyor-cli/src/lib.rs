//! Surveyor CLI support: coordinate loading, configuration layering and
//! result export for the `surveyor` binary.

pub mod export;
pub mod loader;
pub mod settings;

pub use export::Exporter;
pub use loader::{close_route, load_coordinates, read_coordinates};
pub use settings::{EnvOverrides, FlagOverrides};
