//! Least-squares ideal function matching.
//!
//! Given training series and a catalog of ideal functions sampled on the same
//! x values, pick the best-fitting ideal function for each training series,
//! then map test points to a selected function when they lie within
//! `max deviation × √2` of it.
//!
//! ```text
//!  DataSource ──► Dataset ──► Process::run ──► Outcome ──► Sink
//!                                 │                  └───► viewer (binary)
//!                                 ├─ select_best_matches
//!                                 └─ map_observations
//! ```

pub mod config;
pub mod data;
pub mod matching;
pub mod pipeline;
pub mod sink;

pub use data::loader::{DataSource, Dataset, FileSource};
pub use data::model::{
    Catalog, Frame, MappingRecord, ObservedPoint, RaggedColumn, Series, SeriesSet, Table,
    TrainingSet, UnmappedPoint,
};
pub use matching::{
    map_observations, map_observations_with, select_best_matches, Classification,
    DeviationScope, MatchConfig, MatchError, Selection, SelectionResult,
};
pub use pipeline::{persist, Outcome, Process};
pub use sink::{OutputFormat, PersistenceError, Sink};
