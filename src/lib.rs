//! Offering aggregation and semester code engine for the course planner API.
//!
//! The crate answers read-only catalog queries by merging three independent
//! collaborators: the course catalog, live section enrollment, and historical
//! grade statistics. Module layout follows the Explicit Module Boundary
//! Pattern (EMBP): siblings reach each other through the re-exports below.
//!
//! - `semester` – semester code codec
//! - `aggregator` – offering list and detail views
//! - `history` – enrollment history reducer
//! - `sources` – collaborator traits and their implementations
//! - `routes` – axum router gateway

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod routes;
pub mod schema;
pub mod semester;
pub mod sources;

pub use aggregator::{AggregatorSettings, OfferingAggregator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{EngineError, SourceError};
pub use history::HistoryRange;
pub use models::{
    AboutInfo, Count, Course, CourseOffering, Department, GradeDistribution, GradeStats,
    GraphDataPoint, OfferingDetail, SectionRecord,
};
pub use semester::{decode, encode, Semester, SemesterCode, Term};
