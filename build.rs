fn main() {
    // Build date stamp exposed through platekit::compilation_date(),
    // fixed "Mmm dd yyyy" layout with a space-padded day.
    let date = chrono::Local::now().format("%b %e %Y").to_string();
    println!("cargo:rustc-env=PLATEKIT_BUILD_DATE={date}");
}
