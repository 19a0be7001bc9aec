//! SS58 address decoding, encoding and comparison.
//!
//! Indexer payloads carry addresses in whatever format the indexer chose
//! (network prefix, generic prefix, or a raw hex public key). Accounts are
//! therefore compared by their 32-byte id, never by string.

use std::fmt;

use thiserror::Error;

const SS58_PREFIX: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;

/// Raw 32-byte account id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex of the public key.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_hex())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid base58: {0}")]
    Base58(String),

    #[error("Invalid hex: {0}")]
    Hex(String),

    #[error("Unexpected address length: {0} bytes")]
    Length(usize),

    #[error("Unsupported SS58 prefix byte: {0:#04x}")]
    Prefix(u8),

    #[error("Checksum mismatch")]
    Checksum,
}

fn ss58_checksum(payload: &[u8]) -> [u8; 64] {
    let mut input = Vec::with_capacity(SS58_PREFIX.len() + payload.len());
    input.extend_from_slice(SS58_PREFIX);
    input.extend_from_slice(payload);
    sp_crypto_hashing::blake2_512(&input)
}

/// Encode an account id with a specific SS58 prefix.
pub fn encode_ss58(account: &AccountId, prefix: u16) -> String {
    let mut payload = Vec::with_capacity(2 + 32 + CHECKSUM_LEN);

    if prefix < 64 {
        payload.push(prefix as u8);
    } else if prefix < 16384 {
        // Two-byte encoding for larger prefixes
        let first = ((prefix & 0x00FC) >> 2) as u8 | 0x40;
        let second = ((prefix >> 8) as u8) | ((prefix & 0x03) << 6) as u8;
        payload.push(first);
        payload.push(second);
    } else {
        // Unsupported prefix, fall back to generic
        payload.push(42);
    }

    payload.extend_from_slice(account.as_bytes());

    let hash = ss58_checksum(&payload);
    payload.extend_from_slice(&hash[..CHECKSUM_LEN]);

    bs58::encode(payload).into_string()
}

/// Decode an SS58 address into its account id and network prefix.
pub fn decode_ss58(address: &str) -> Result<(AccountId, u16), AddressError> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|e| AddressError::Base58(e.to_string()))?;

    let (prefix, prefix_len) = match data.first() {
        Some(&b) if b < 64 => (b as u16, 1),
        Some(&b) if b < 128 => {
            let second = *data.get(1).ok_or(AddressError::Length(data.len()))?;
            let lower = ((b & 0b0011_1111) << 2) | (second >> 6);
            let upper = second & 0b0011_1111;
            ((lower as u16) | ((upper as u16) << 8), 2)
        }
        Some(&b) => return Err(AddressError::Prefix(b)),
        None => return Err(AddressError::Length(0)),
    };

    if data.len() != prefix_len + 32 + CHECKSUM_LEN {
        return Err(AddressError::Length(data.len()));
    }

    let (payload, checksum) = data.split_at(data.len() - CHECKSUM_LEN);
    let hash = ss58_checksum(payload);
    if checksum != &hash[..CHECKSUM_LEN] {
        return Err(AddressError::Checksum);
    }

    let mut account = [0u8; 32];
    account.copy_from_slice(&payload[prefix_len..]);
    Ok((AccountId(account), prefix))
}

/// Parse a `0x`-prefixed 32-byte public key.
pub fn decode_hex_account(value: &str) -> Result<AccountId, AddressError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| AddressError::Hex(value.to_string()))?;
    let bytes = hex::decode(digits).map_err(|e| AddressError::Hex(e.to_string()))?;
    let account: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| AddressError::Length(bytes.len()))?;
    Ok(AccountId(account))
}

/// Normalize an address in any supported form to its account id.
///
/// Returns `None` for anything that is not a valid chain address.
pub fn normalize_address(address: &str) -> Option<AccountId> {
    let address = address.trim();
    if address.starts_with("0x") || address.starts_with("0X") {
        return decode_hex_account(address).ok();
    }
    decode_ss58(address).ok().map(|(account, _)| account)
}

/// True when both strings are valid addresses of the same account.
pub fn same_account(a: &str, b: &str) -> bool {
    match (normalize_address(a), normalize_address(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Re-encode an address for a network prefix.
pub fn reencode(address: &str, prefix: u16) -> Option<String> {
    normalize_address(address).map(|account| encode_ss58(&account, prefix))
}

/// Shorten a hash or address to `first6...last6`.
pub fn shorten(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 12 {
        return value.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}
