//! Signing identities.

use dungeon_sync_types::AccountId;

/// Anything that can name the account commands are sent for.
///
/// The identifier must be stable: it keys the player's subtree in the
/// state tree and prefixes every submitted operation.
pub trait Identity {
    /// The account identifier.
    fn account_id(&self) -> AccountId;
}

impl Identity for AccountId {
    fn account_id(&self) -> AccountId {
        self.clone()
    }
}

impl<I: Identity + ?Sized> Identity for &I {
    fn account_id(&self) -> AccountId {
        (**self).account_id()
    }
}
