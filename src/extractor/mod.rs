pub mod series_extractor;
pub mod time_series;

pub use series_extractor::SeriesExtractor;
pub use time_series::{Sample, TimeAxis, TimeSeries};
