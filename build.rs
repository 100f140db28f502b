fn main() {
    println!("cargo:rerun-if-env-changed=RTM_API_BASE_URL");

    #[cfg(feature = "desktop")]
    tauri_build::build();
}
