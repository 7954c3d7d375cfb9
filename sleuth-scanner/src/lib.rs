pub mod error;
pub mod prober;
pub mod result;
pub mod shape;

pub use error::ProbeError;
pub use prober::Prober;
pub use result::{DataFormat, ProbeResult};
pub use shape::ShapeSummary;
