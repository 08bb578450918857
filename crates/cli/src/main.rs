fn main() {
    if let Err(err) = methodscope_cli::run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
