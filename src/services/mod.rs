//! Business logic services

pub mod aggregator;
pub mod charts;
pub mod data_loader;
pub mod filters;
pub mod normalizer;

pub use aggregator::Aggregator;
pub use charts::{category_totals, class_distribution, monthly_trends, CategoryTotal, ChartMetric, MonthlyTrend};
pub use data_loader::{DataLoader, LoadResult};
pub use filters::{available_formats, available_trainers, resolve_location, SessionFilter, KNOWN_LOCATIONS};
pub use normalizer::clean_class_name;
