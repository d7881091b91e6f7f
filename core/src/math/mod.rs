pub mod bearing;
pub mod geo;

pub use bearing::BearingHelper;
pub use geo::GeoHelper;
