// Domain layer - period model, alignment engine and graph metadata
pub mod alignment;
pub mod calendar;
pub mod error;
pub mod graph;
pub mod measurement;
pub mod period;
