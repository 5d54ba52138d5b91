pub mod config;
pub mod model;

// Remote service access
pub mod client;

// Rolling windows for the metric charts
pub mod metrics;

// Log views: rendering, live/override state, stored-log mutation
pub mod mutation;
pub mod notice;
pub mod render;
pub mod view;

// Periodic refresh
pub mod poll;

// Wiring for a whole dashboard session
pub mod dashboard;
