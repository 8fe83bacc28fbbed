//! List configured accounts.

use crate::config::CliConfig;

/// Run the accounts command.
pub fn run(config: &CliConfig) {
    let accounts = &config.accounts;
    if accounts.known.is_empty() {
        println!("No accounts configured.");
        println!();
        println!("Add them to the config file:");
        println!("  [accounts.known]");
        println!("  alice = \"tz1...\"");
        return;
    }

    for (alias, id) in &accounts.known {
        let marker = if accounts.default.as_deref() == Some(alias.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {:<12} {}", marker, alias, id);
    }
}
