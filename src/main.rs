use std::process::ExitCode;

fn main() -> ExitCode {
    match candle_seeder_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
