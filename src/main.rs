use std::process::ExitCode;

fn main() -> ExitCode {
    roster_dist::run()
}
