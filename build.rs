use chrono::Local;

fn main() {
    // export timestamp of compile time, shown in `infocode --version`
    let now = Local::now();
    let formatted_time = now.format("%Y_%m_%d_%H_%M_%S").to_string();
    println!("cargo:rustc-env=INFOCODE_BUILD_RS_TIMESTAMP={formatted_time}");
    println!("cargo:rerun-if-changed=build.rs");
}
