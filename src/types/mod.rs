pub mod date_key;
pub mod location;
pub mod per_variable;
pub mod period;
pub mod raw_series;
pub mod variable;
