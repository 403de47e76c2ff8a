pub mod calculator;
pub mod window;

pub use calculator::{compute_series, MetricRow, PriceBar, LONG_WINDOW, SHORT_WINDOW, VOLUME_WINDOW};
