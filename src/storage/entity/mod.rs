pub mod asset;
pub mod daily_metric;
pub mod daily_price;
