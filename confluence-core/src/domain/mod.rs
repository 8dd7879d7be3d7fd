//! Domain types

pub mod candle;
pub mod series;

pub use candle::Candle;
pub use series::{DataSource, Series, SeriesError};
