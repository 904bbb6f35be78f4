pub use crate::{
    client::Eth1Client,
    config::{Config, TraceProvider},
    error::Error,
    eth1_api::Eth1Api,
};

mod block_assembly;
mod client;
mod config;
mod containers;
mod error;
mod eth1_api;
mod signer;
mod traces;
