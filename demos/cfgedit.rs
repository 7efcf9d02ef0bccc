// Command-line viewer for user-config files
//
// Run with: cargo run --example cfgedit -- <which-config> [list]

use user_config::UserConfig;

const APP_NAME: &str = "cfgedit";

fn print_help() {
    println!("Usage: {APP_NAME} <which-config> <operation>");
    println!("  <which-config> is ~/.config/<which-config>");
    println!("  <operation> can just be 'list' right now");
}

/// Sorted keys in the `[a b c]` form
fn format_keys(mut keys: Vec<String>) -> String {
    keys.sort();
    format!("[{}]", keys.join(" "))
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(which_config) = args.next() else {
        print_help();
        std::process::exit(1);
    };

    let config = match UserConfig::new(which_config.as_str()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Couldn't open config directory {which_config}: {e}");
            std::process::exit(1);
        }
    };

    match args.next().as_deref().unwrap_or("list") {
        "list" => {
            println!("{}", format_keys(config.get_key_list()));
        }
        other => {
            eprintln!("Unknown operation: {other}");
            print_help();
            std::process::exit(1);
        }
    }
}
