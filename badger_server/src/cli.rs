use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "BM_HOST",
        "BM_PORT",
        "BM_DATABASE_URL",
        "BM_DAILY_SPEND_LIMIT",
        "BM_CURRENCY",
        "BM_SUCCESS_URL",
        "BM_CANCEL_URL",
        "BM_HTTP_TIMEOUT_SECS",
        "BM_STRIPE_WEBHOOK_TOLERANCE",
        "BM_STRIPE_TRANSFER_DESTINATION",
        "BM_PRINTFUL_API_URL",
        "BM_PRINTFUL_DEFAULT_COUNTRY",
        "BM_MAIL_RELAY_URL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
