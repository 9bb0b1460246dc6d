pub mod game_intel;
pub mod group_select;
pub mod menu;
pub mod quiz_area;
pub mod stats_dashboard;
