fn main() {
    use vergen::{BuildBuilder, Emitter};

    // Build metadata for `trips --version`; missing metadata is non-fatal.
    let mut emitter = Emitter::default();
    if let Ok(build) = BuildBuilder::all_build() {
        let _ = emitter.add_instructions(&build);
    }
    if emitter.emit().is_err() {
        println!("cargo:warning=build metadata unavailable");
    }
}
