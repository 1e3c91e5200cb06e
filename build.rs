use std::env;
use std::path::Path;
fn main() {
  println!("cargo::rerun-if-changed=src/c_api.rs");
  let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
  let output_dir = env::var("OUT_DIR").unwrap();
  let header = Path::new(&output_dir).join("announcer.h");
  match cbindgen::Builder::new()
    .with_crate(&crate_dir)
    .with_language(cbindgen::Language::C)
    .with_include_guard("ANNOUNCER_RS_H")
    .with_parse_deps(false)
    .generate()
  {
    Ok(bindings) => {
      bindings.write_to_file(&header);
    }
    Err(error) => println!("cargo::warning=Failed to generate the C header: {error}"),
  }
}
