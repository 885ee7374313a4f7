#[path = "../common/mod.rs"]
mod common;

mod renewal_endpoint;
