use std::process;

fn main() {
    if let Err(e) = cmdtree::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
