use psicosystem::{cli::run_cli, init};

fn main() {
    init();
    if let Err(err) = run_cli(std::env::args().skip(1)) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
