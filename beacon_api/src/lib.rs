pub use crate::{
    api::{connect, BeaconApi},
    backend::{Backend, ParticipationBalances},
    client::Client,
    config::{BackendKind, Config},
    error::Error,
    grpc::backend::GrpcBackend,
    rest::backend::RestBackend,
};

pub mod attestation_resolution;
pub mod block_synthesis;
pub mod participation;

mod api;
mod assignment_cache;
mod backend;
mod client;
mod config;
mod error;

mod grpc {
    pub mod backend;

    mod conversions;

    #[allow(
        clippy::all,
        clippy::nursery,
        clippy::pedantic,
        unused_qualifications,
        reason = "generated by tonic-build"
    )]
    pub mod proto {
        tonic::include_proto!("ethereum.eth.v1alpha1");
    }
}

mod rest {
    pub mod backend;

    mod containers;
}
