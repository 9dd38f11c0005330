fn main() {
    if let Err(err) = node_wiring::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
