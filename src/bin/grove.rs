//! Short binary name (`grove`) that forwards to the `prompt_grove` library.

fn main() {
    if let Err(err) = prompt_grove::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
