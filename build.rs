fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/logger.proto");
    println!("cargo:rerun-if-env-changed=REGENERATE_PROTO");

    // The generated code is checked in under src/proto so builds do not need
    // protoc. Set REGENERATE_PROTO=1 after editing the .proto file.
    if std::env::var_os("REGENERATE_PROTO").is_none() {
        return Ok(());
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir("src/proto")
        .compile_protos(&["proto/logger.proto"], &["proto"])?;

    Ok(())
}
