pub fn get_version() -> String {
    match option_env!("VERGEN_GIT_SHA") {
        // vergen falls back to this marker when git is unavailable at build time.
        Some(sha) if sha != "VERGEN_IDEMPOTENT_OUTPUT" => {
            format!("{} ({})", env!("CARGO_PKG_VERSION"), &sha[..sha.len().min(7)])
        }
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
}
