pub mod chart;
pub mod github;
pub mod render;
pub mod search;
