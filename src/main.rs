fn main() {
    if let Err(err) = prompt_grove::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
