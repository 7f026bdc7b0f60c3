fn main() {
    if let Err(error) = simplepres::run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
