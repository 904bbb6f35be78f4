use std::{env, io::Result};

fn main() -> Result<()> {
    let protos = &["proto/beacon_chain.proto"];

    for proto in protos {
        println!("cargo:rerun-if-changed={proto}");
    }

    if env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path().map_err(std::io::Error::other)?;
        env::set_var("PROTOC", protoc);
    }

    tonic_build::configure()
        .build_server(false)
        .compile_protos(protos, &["proto"])
}
