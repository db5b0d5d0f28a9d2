/// Rebuild when the embedded provisioning templates change.
///
/// `include_dir!()` does not register its files with cargo on stable, so the
/// directory is tracked here instead.
fn main() {
    println!("cargo::rerun-if-changed=templates");
}
