// build.rs
fn main() {
    #[cfg(target_os = "windows")]
    println!("cargo:rustc-link-arg-bin=bytelox=/STACK:16777216"); // 16 MB

    #[cfg(not(target_os = "windows"))]
    println!("cargo:rustc-link-arg-bin=bytelox=-Wl,-z,stack-size=16777216"); // 16 MB
}
