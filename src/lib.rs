pub mod animation;
pub mod app;
pub mod diff;
pub mod fetch;
pub mod git;
pub mod highlight;
pub mod input;
pub mod logging;
pub mod modal;
pub mod ops;
pub mod search;
pub mod snapshot;
pub mod staging;
pub mod types;
pub mod ui;
