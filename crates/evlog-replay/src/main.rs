#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = evlog_replay::run_from_env() {
        eprintln!("evlog-replay: {error}");
        std::process::exit(error.exit_code());
    }
}
