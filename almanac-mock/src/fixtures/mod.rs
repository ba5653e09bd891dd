pub mod companies;
pub mod macro_series;
