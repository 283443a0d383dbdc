static GIT_COMMIT: &str = include_str!(concat!(env!("OUT_DIR"), "/git-commit"));
static COMPILE_DATE: &str = include_str!(concat!(env!("OUT_DIR"), "/compile-date"));

pub fn print_version_info() {
    println!("skelskin {}", env!("CARGO_PKG_VERSION"));
    println!("build commit: {}", GIT_COMMIT);
    println!("compile date: {}", COMPILE_DATE);
}
