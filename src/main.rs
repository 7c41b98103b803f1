fn main() {
    if let Err(err) = tabchart::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
