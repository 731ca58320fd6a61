pub mod config;
pub mod logging;

pub mod aria2;
pub mod checksum;
pub mod daemon;
pub mod fetch;
pub mod progress;
pub mod reporter;
pub mod rpc;
pub mod url_model;
pub mod waiter;

#[cfg(test)]
mod testing;
