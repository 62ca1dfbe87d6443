fn main() {
    if let Err(err) = chartflow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
