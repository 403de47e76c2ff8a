pub mod asset_repo;
pub mod metric_repo;
pub mod price_repo;

pub use asset_repo::AssetRepository;
pub use metric_repo::{MetricRepository, NullCountRow};
pub use price_repo::PriceRepository;
