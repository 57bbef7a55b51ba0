use std::process::ExitCode;

use mpyc_drv::{Config, Session};

fn main() -> ExitCode {
    let args = std::env::args().skip(1);
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match Session::new(config).compile() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
