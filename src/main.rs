use std::process::ExitCode;

fn main() -> ExitCode {
    match confrev::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            confrev::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
