use std::env;

fn main() {
    // Linker scripts only matter for the firmware image; host builds (tests) skip them.
    let firmware = env::var("CARGO_FEATURE_FIRMWARE").is_ok();
    let bare_metal = env::var("CARGO_CFG_TARGET_OS").map_or(false, |os| os == "none");

    if firmware && bare_metal {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
