pub mod synthetic_series;
