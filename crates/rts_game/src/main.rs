use std::env;
use std::process::ExitCode;

use rts_game::app;
use tracing::error;

fn main() -> ExitCode {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match app::build_app(&args) {
        Ok(wiring) => app::run(wiring),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
