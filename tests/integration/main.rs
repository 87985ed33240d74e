//! Integration tests for Catalog-Crawler
//!
//! These tests use wiremock to stand in for the catalog origin.

mod common;
mod crawl_tests;
mod transport_tests;
