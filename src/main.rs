use std::process::ExitCode;

fn main() -> ExitCode {
    match shipwright::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
