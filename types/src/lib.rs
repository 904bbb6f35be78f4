pub mod assignments;
pub mod config;
pub mod consensus;
pub mod consts;
pub mod execution;
pub mod preset;
pub mod primitives;
pub mod redacting_url;
