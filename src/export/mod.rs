//! Data export for external analysis tools.

pub mod metrics_csv;

pub use metrics_csv::CsvMetricsObserver;
