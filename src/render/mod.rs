pub mod axis;
pub mod chart;
