// Library root for the bestball binary: configuration, CLI definitions,
// rendering and command execution, exposed for the integration tests.

pub mod app;
pub mod cli;
pub mod config;
pub mod report;
