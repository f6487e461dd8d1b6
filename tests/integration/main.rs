//! Integration tests for Review-Sweep
//!
//! `crawl_tests` drives full sweeps over HTTP against wiremock servers;
//! `resume_tests` uses scripted in-memory sessions to check what survives
//! between runs; `cli_tests` runs the binary itself.

mod cli_tests;
mod common;
mod crawl_tests;
mod resume_tests;
