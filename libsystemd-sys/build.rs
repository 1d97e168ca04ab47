use std::path::Path;

// Linking is configured through `SYSTEMD_LIB_DIR` + `SYSTEMD_LIBS` (colon separated), or falls
// back to pkg-config for `libsystemd` (override the package with `SYSTEMD_PKG_NAME`, for example
// `libelogind`).
fn main() {
    let name = "systemd";
    let prefix = name.to_ascii_uppercase();
    let mut be = build_env::BuildEnv::from_env().unwrap();

    let lib_dir_var = format!("{prefix}_LIB_DIR");
    let libs = be.var(format!("{prefix}_LIBS"));

    let lib_dir = match be.var(lib_dir_var.clone()) {
        Some(lib_dir) => lib_dir,
        None => {
            let pkg_var = format!("{prefix}_PKG_NAME");
            let pkg_name = be
                .var(&pkg_var)
                .map(|v| {
                    v.into_string()
                        .unwrap_or_else(|e| panic!("{pkg_var} is not valid unicode: {e:?}"))
                })
                .unwrap_or_else(|| format!("lib{name}"));

            if let Err(error) = pkg_config::find_library(&pkg_name) {
                eprintln!("pkg_config could not find {pkg_name:?}: {error}");
                std::process::exit(1);
            }
            return;
        }
    };

    assert!(
        Path::new(&lib_dir).exists(),
        "{lib_dir_var} refers to {lib_dir:?}, which does not exist"
    );
    println!(
        "cargo:rustc-link-search=native={}",
        lib_dir.to_string_lossy()
    );

    match libs {
        Some(libs) => {
            let libs = libs
                .into_string()
                .unwrap_or_else(|e| panic!("{prefix}_LIBS is not valid unicode: {e:?}"));
            for lib in libs.split(':') {
                println!("cargo:rustc-link-lib={lib}");
            }
        }
        None => println!("cargo:rustc-link-lib={name}"),
    }
}
