fn main() {
    if let Err(err) = glucotrack_lib::run() {
        eprintln!("glucotrack: {err:#}");
        std::process::exit(1);
    }
}
