pub mod contact;
pub mod report;
pub mod visual_field;

pub use contact::{Contact, NOT_AVAILABLE};
pub use report::SensorReport;
pub use visual_field::{VisualField, CLEAR_DISTANCE};
