use std::process::ExitCode;

fn main() -> ExitCode {
    match pandemic::runner::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
