//! Print a payload without submitting it.

use dungeon_sync_types::{Command, WirePayload};

use crate::config::NamedAccount;

/// Run the encode command.
pub fn run(account: &NamedAccount, command: &Command) {
    println!("{}", WirePayload::encode(&account.id, command));
}
