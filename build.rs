// Copies the static page (and the `pkg/` bundle wasm-pack writes into it)
// to `dist/`.
use std::{fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }
    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }
    fs::create_dir_all(out_dir).ok();

    let mut options = CopyOptions::new();
    options.content_only = true;
    options.overwrite = true;
    if let Err(err) = copy(static_dir, out_dir, &options) {
        println!("cargo:warning=could not copy static/ to dist/: {err}");
    }
}
