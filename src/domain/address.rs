//! Address parsing and display
//!
//! Wallets and token contracts are both 20-byte EVM accounts written as
//! `0x` + 40 hex characters. The text is kept exactly as the user typed it
//! (that is what gets rendered) while equality and hashing ignore case.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// Length of a canonical `0x`-prefixed address string
pub const ADDRESS_LEN: usize = 42;

/// A `0x`-prefixed, 40-hex-digit account address.
///
/// Construct through [`HexAddress::parse`]; the inner text is guaranteed to
/// satisfy [`is_address`].
#[derive(Debug, Clone, Eq)]
pub struct HexAddress(String);

/// Wallet whose balances are being read
pub type WalletAddress = HexAddress;

/// Fungible-token contract
pub type TokenAddress = HexAddress;

impl HexAddress {
    /// Parse a trimmed address string, returning `None` when it is not a valid address
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        is_address(s).then(|| Self(s.to_string()))
    }

    /// Address exactly as entered
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form, used as the key for price lookups
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// `0x1234…abcd` display form
    pub fn short(&self) -> String {
        shorten_address(&self.0)
    }
}

impl PartialEq for HexAddress {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for HexAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for HexAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for HexAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// True iff `s` is exactly `0x` followed by 40 hex digits (either case).
///
/// No checksum validation is performed.
pub fn is_address(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == ADDRESS_LEN
        && s.starts_with("0x")
        && bytes[2..].iter().all(u8::is_ascii_hexdigit)
}

/// Split free text on newlines and commas, trim each piece and keep the valid addresses.
///
/// Order of first occurrence is preserved and duplicates are kept.
pub fn parse_token_list(text: &str) -> Vec<TokenAddress> {
    text.split(['\n', ','])
        .filter_map(HexAddress::parse)
        .collect()
}

/// First 6 characters, an ellipsis, then the last 4 characters.
///
/// Strings too short to shorten are returned unchanged.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
