// Application layer - use cases over the measurement store
pub mod measurement_repository;
pub mod period_service;
