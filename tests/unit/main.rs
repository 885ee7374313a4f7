#[path = "../common/mod.rs"]
mod common;

mod claims_tests;
