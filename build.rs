use std::env;
use std::path::PathBuf;

// ffmpeg-sys-next finds FFmpeg through pkg-config on Unix. On Windows it needs
// FFMPEG_DIR; point users at a vcpkg install when one is present.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!("cargo:warning=stillclip: set FFMPEG_DIR to an FFmpeg install (e.g. from vcpkg)");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.exists() {
        println!(
            "cargo:warning=stillclip: found FFmpeg at {0}; set FFMPEG_DIR={0}",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=stillclip: no vcpkg FFmpeg install at {}",
            candidate.display()
        );
    }
}
