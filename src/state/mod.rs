pub mod app_state;
pub mod chart_registry;
pub mod highlights;
pub mod projection;
pub mod range;
pub mod table_state;
pub mod theme;
