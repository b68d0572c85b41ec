pub mod calculator;
pub mod chart_panel;
pub mod highlights;
pub mod table_view;
