//! The withdrawal token handed to a depositor, and its codec
//!
//! A token has the wire form `hei-<amountTier>-<ringIndex>-<secretHex>`

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use constants::{FIELD_BYTE_LENGTH, TOKEN_DELIMITER, TOKEN_FIELD_COUNT, TOKEN_MARKER};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use util::hex::{bytes_from_hex_string, bytes_to_hex_string, left_pad_bytes};

// ----------
// | Errors |
// ----------

/// The reasons a withdrawal token may fail to parse
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TokenParseError {
    /// The token does not start with the expected marker
    #[error("token does not begin with the `hei` marker")]
    MissingMarker,
    /// The token has the wrong number of delimited fields
    #[error("expected 3 fields after the marker, found {0}")]
    FieldCount(usize),
    /// The amount field is not a supported tier
    #[error("invalid amount tier: {0}")]
    AmountTier(String),
    /// The ring index field is not a non-negative integer
    #[error("invalid ring index: {0}")]
    RingIndex(String),
    /// The secret field is not valid hex of an acceptable width
    #[error("invalid secret: {0}")]
    Secret(String),
}

// ---------------
// | Amount Tier |
// ---------------

/// The deposit denominations supported by the pool, in whole ether
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AmountTier {
    /// 1 ether
    One,
    /// 2 ether
    Two,
    /// 4 ether
    Four,
    /// 8 ether
    Eight,
    /// 16 ether
    Sixteen,
    /// 32 ether
    ThirtyTwo,
}

impl AmountTier {
    /// All supported tiers, smallest first
    pub const ALL: [AmountTier; 6] = [
        AmountTier::One,
        AmountTier::Two,
        AmountTier::Four,
        AmountTier::Eight,
        AmountTier::Sixteen,
        AmountTier::ThirtyTwo,
    ];

    /// The denomination of the tier in whole ether
    pub fn ether(&self) -> u64 {
        match self {
            AmountTier::One => 1,
            AmountTier::Two => 2,
            AmountTier::Four => 4,
            AmountTier::Eight => 8,
            AmountTier::Sixteen => 16,
            AmountTier::ThirtyTwo => 32,
        }
    }

    /// The tier with the given denomination in whole ether, if supported
    pub fn from_ether(ether: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.ether() == ether)
    }
}

impl Display for AmountTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.ether())
    }
}

impl FromStr for AmountTier {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ether = parse_digits(s).ok_or_else(|| TokenParseError::AmountTier(s.to_string()))?;
        Self::from_ether(ether).ok_or_else(|| TokenParseError::AmountTier(s.to_string()))
    }
}

// ----------
// | Secret |
// ----------

/// The one-time withdrawal secret, stored as its 32-byte big-endian encoding
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct WithdrawalSecret([u8; FIELD_BYTE_LENGTH]);

impl WithdrawalSecret {
    /// Construct a secret from its padded byte encoding
    pub fn new(bytes: [u8; FIELD_BYTE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The padded big-endian bytes of the secret
    pub fn as_bytes(&self) -> &[u8; FIELD_BYTE_LENGTH] {
        &self.0
    }
}

impl Debug for WithdrawalSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "WithdrawalSecret(<redacted>)")
    }
}

impl FromStr for WithdrawalSecret {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bytes_from_hex_string(s).map_err(TokenParseError::Secret)?;
        if bytes.is_empty() {
            return Err(TokenParseError::Secret("empty secret".to_string()));
        }

        let padded = left_pad_bytes(&bytes, FIELD_BYTE_LENGTH).ok_or_else(|| {
            TokenParseError::Secret(format!("secret exceeds {FIELD_BYTE_LENGTH} bytes"))
        })?;

        let mut buf = [0u8; FIELD_BYTE_LENGTH];
        buf.copy_from_slice(&padded);
        Ok(Self(buf))
    }
}

// ---------
// | Token |
// ---------

/// A parsed withdrawal token
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalToken {
    /// The denomination of the deposit
    pub amount_tier: AmountTier,
    /// The index of the ring the deposit was placed in
    pub ring_index: u64,
    /// The secret the stealth keypair is derived from
    pub secret: WithdrawalSecret,
}

impl WithdrawalToken {
    /// Parse a token from its wire form
    pub fn parse(token: &str) -> Result<Self, TokenParseError> {
        token.parse()
    }
}

impl FromStr for WithdrawalToken {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.trim().split(TOKEN_DELIMITER);
        if fields.next() != Some(TOKEN_MARKER) {
            return Err(TokenParseError::MissingMarker);
        }

        let fields: Vec<&str> = fields.collect();
        if fields.len() != TOKEN_FIELD_COUNT {
            return Err(TokenParseError::FieldCount(fields.len()));
        }
        let (amount, ring_index, secret) = (fields[0], fields[1], fields[2]);

        let amount_tier = amount.parse()?;
        let ring_index = parse_digits(ring_index)
            .ok_or_else(|| TokenParseError::RingIndex(ring_index.to_string()))?;
        let secret = secret.parse()?;

        Ok(Self { amount_tier, ring_index, secret })
    }
}

impl Display for WithdrawalToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{TOKEN_MARKER}{TOKEN_DELIMITER}{}{TOKEN_DELIMITER}{}{TOKEN_DELIMITER}{}",
            self.amount_tier,
            self.ring_index,
            hex_encode(self.secret.as_bytes()),
        )
    }
}

/// Parse a decimal field, accepting only ASCII digits
fn parse_digits(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    field.parse().ok()
}

/// Hex encode without a `0x` prefix, the form tokens are issued in
fn hex_encode(bytes: &[u8]) -> String {
    let hex = bytes_to_hex_string(bytes);
    hex.strip_prefix("0x").unwrap_or(&hex).to_string()
}
