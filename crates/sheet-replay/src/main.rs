#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = sheet_replay::run_from_env() {
        eprintln!(
            "{}",
            serde_json::json!({
                "status": "error",
                "error": error.to_string(),
                "exit_code": error.exit_code(),
            })
        );
        std::process::exit(error.exit_code());
    }
}
