//! WirePayload - the hex-encoded operation submitted to the inbox.
//!
//! The inbox receives `"<account>-<command code>"` as UTF-8, hex-encoded:
//!
//! ```text
//! tz1abc-0603  →  747a316162632d30363033
//! ```
//!
//! The kernel recovers the signer by splitting on the first separator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::{AccountId, Command, FormatError};

/// Separator between the account identifier and the command code.
pub const SEPARATOR: char = '-';

/// Hex text of one encoded operation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WirePayload(String);

impl WirePayload {
    /// Encode a command on behalf of an account.
    pub fn encode(account: &AccountId, command: &Command) -> Self {
        let text = format!("{}{}{}", account, SEPARATOR, command.code());
        Self(codec::encode_bytes(text.as_bytes()))
    }

    /// Wrap hex text received from elsewhere (validated on decode).
    pub fn from_hex(hex: &str) -> Self {
        Self(hex.to_string())
    }

    /// Recover the account and command, as the receiving side does.
    pub fn decode(&self) -> Result<(AccountId, Command), FormatError> {
        let bytes = codec::decode_bytes(&self.0)?;
        let text =
            String::from_utf8(bytes).map_err(|_| FormatError::InvalidHex(self.0.clone()))?;
        let (account, code) = text
            .split_once(SEPARATOR)
            .ok_or(FormatError::MissingSeparator)?;
        Ok((AccountId::parse(account)?, Command::parse(code)?))
    }

    /// The hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WirePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for WirePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WirePayload({})", self.0)
    }
}

/// JSON body of `POST /operations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBody {
    /// Hex payload
    pub data: String,
}

impl From<&WirePayload> for OperationBody {
    fn from(payload: &WirePayload) -> Self {
        Self {
            data: payload.0.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemCode;

    fn account() -> AccountId {
        AccountId::parse("tz1abc").unwrap()
    }

    #[test]
    fn encode_hexes_account_separator_and_code() {
        let payload = WirePayload::encode(&account(), &Command::MoveUp);
        assert_eq!(payload.as_str(), codec::encode_bytes(b"tz1abc-01"));
        assert_eq!(payload.as_str(), "747a316162632d3031");
    }

    #[test]
    fn drop_slot_three_decodes_as_padded_argument() {
        let payload = WirePayload::encode(&account(), &Command::Drop { slot: 3 });
        let text = String::from_utf8(::hex::decode(payload.as_str()).unwrap()).unwrap();
        assert_eq!(text, "tz1abc-0603");

        let (decoded_account, command) = payload.decode().unwrap();
        assert_eq!(decoded_account, account());
        assert_eq!(command, Command::Drop { slot: 3 });
    }

    #[test]
    fn buy_roundtrip_keeps_full_seller() {
        let command = Command::Buy {
            item: ItemCode::POTION,
            seller: AccountId::parse("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb").unwrap(),
        };
        let (_, decoded) = WirePayload::encode(&account(), &command).decode().unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn decode_without_separator_fails() {
        let payload = WirePayload::from_hex(&codec::encode_bytes(b"tz1abc01"));
        assert!(matches!(payload.decode(), Err(FormatError::MissingSeparator)));
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = WirePayload::encode(&account(), &Command::Sell { slot: 1 });
        let b = WirePayload::encode(&account(), &Command::Sell { slot: 1 });
        assert_eq!(a, b);
    }

    #[test]
    fn operation_body_json_shape() {
        let payload = WirePayload::encode(&account(), &Command::PickUp);
        let body = OperationBody::from(&payload);
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, format!("{{\"data\":\"{}\"}}", payload));
    }
}
