use std::process::ExitCode;

fn main() -> ExitCode {
    lorebook_cli::run()
}
