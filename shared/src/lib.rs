mod activity;

pub mod github;

pub use activity::*;
