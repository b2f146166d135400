pub mod config;
pub mod dataset;
pub mod error;
pub mod load;
pub mod period;
pub mod region;
pub mod render;
pub mod session;
pub mod validate;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::DashboardConfig;
pub use dataset::{Dataset, PopulationRecord};
pub use error::DashboardError;
pub use load::{load, DataSource, LoadError};
pub use period::{is_after, to_ordinal, ParseError, Period, PeriodSelection, Quarter};
pub use region::Region;
pub use render::{render, Dashboard, PercentChange, RenderError};
pub use session::{Session, Submission};
pub use validate::{validate, validate_labels, ValidationError};
