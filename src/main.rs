fn main() {
    if let Err(e) = sram_forge::cli::run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
