fn main() {
    if let Err(err) = scanprep::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
