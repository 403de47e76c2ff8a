pub mod auditor;
pub mod coordinator;
pub mod model;
pub mod service;

pub use service::MetricsService;
