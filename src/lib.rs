// Library exports for inboxmetrics crate
// This allows tests and the CLI binary to use the modules

pub mod config;
pub mod report;

// Dashboard aggregation core
pub mod dashboard;
