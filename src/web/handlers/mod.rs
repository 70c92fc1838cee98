pub mod analyze;
pub mod results;
pub mod status;
