//! Types describing a ring's on-chain state and roster

use std::fmt::{Display, Formatter, Result as FmtResult};

use alloy_primitives::{B256, U256};
use constants::MIN_FORCE_CLOSE_PARTICIPANTS;
use serde::{Deserialize, Serialize};

// --------------
// | Public Key |
// --------------

/// A public key in a ring roster, as the raw coordinates the contract stores
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RingPublicKey {
    /// The x coordinate
    pub x: U256,
    /// The y coordinate
    pub y: U256,
}

impl RingPublicKey {
    /// The entry the contract uses for unfilled ring slots
    pub const PLACEHOLDER: RingPublicKey = RingPublicKey { x: U256::ZERO, y: U256::ZERO };

    /// Constructor
    pub fn new(x: U256, y: U256) -> Self {
        Self { x, y }
    }

    /// Whether this entry is a placeholder for an unfilled slot, i.e. `(0, 0)`
    pub fn is_placeholder(&self) -> bool {
        *self == Self::PLACEHOLDER
    }
}

// --------------
// | Ring State |
// --------------

/// A snapshot of a ring's on-chain state, resolved fresh for each attempt
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingState {
    /// The ring hash, present only once the ring is closed
    pub hash: Option<B256>,
    /// The number of blocks until the ring may be closed manually
    pub force_close_blocks_left: u64,
    /// The number of deposits made into the ring
    ///
    /// Only fetched for open rings that are already closable
    pub deposited: u64,
    /// The number of withdrawals made from the ring
    pub withdrawn: u64,
}

impl RingState {
    /// A closed ring with the given hash
    pub fn closed(hash: B256) -> Self {
        Self { hash: Some(hash), ..Default::default() }
    }

    /// An open ring
    pub fn open(force_close_blocks_left: u64, deposited: u64, withdrawn: u64) -> Self {
        Self { hash: None, force_close_blocks_left, deposited, withdrawn }
    }

    /// Whether the ring is closed
    pub fn is_closed(&self) -> bool {
        self.hash.is_some()
    }

    /// Classify whether, and how privately, the caller may close the ring
    pub fn eligibility(&self) -> ForceCloseEligibility {
        if self.is_closed() {
            return ForceCloseEligibility::Closed;
        }

        if self.force_close_blocks_left > 0 {
            return ForceCloseEligibility::Wait { blocks_left: self.force_close_blocks_left };
        }

        if (self.deposited as usize) < MIN_FORCE_CLOSE_PARTICIPANTS {
            return ForceCloseEligibility::TooFewDeposits { deposited: self.deposited };
        }

        let privacy = PrivacyLevel::from_deposits(self.deposited);
        ForceCloseEligibility::Closable { deposited: self.deposited, privacy }
    }
}

// ---------------
// | Eligibility |
// ---------------

/// How private a withdrawal from a ring of a given size is
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivacyLevel {
    /// The withdrawal is linkable to its deposit
    None,
    /// The anonymity set is small
    Partial,
    /// The anonymity set is large enough to be considered private
    Full,
}

impl PrivacyLevel {
    /// The privacy afforded by a ring with the given number of deposits
    pub fn from_deposits(deposited: u64) -> Self {
        match deposited {
            0..=1 => PrivacyLevel::None,
            2..=3 => PrivacyLevel::Partial,
            _ => PrivacyLevel::Full,
        }
    }
}

/// The display branch for a ring that is not yet closed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceCloseEligibility {
    /// The ring is already closed; withdrawals may proceed
    Closed,
    /// The ring cannot be closed manually for this many more blocks
    Wait {
        /// Blocks remaining before a manual close is allowed
        blocks_left: u64,
    },
    /// The ring may be closed, but holds too few deposits to hide anyone
    TooFewDeposits {
        /// The number of deposits in the ring
        deposited: u64,
    },
    /// The ring may be closed now
    Closable {
        /// The number of deposits in the ring
        deposited: u64,
        /// The privacy a withdrawal would have after closing now
        privacy: PrivacyLevel,
    },
}

impl Display for ForceCloseEligibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ForceCloseEligibility::Closed => write!(f, "ring closed"),
            ForceCloseEligibility::Wait { blocks_left } => write!(f, "wait {blocks_left} blocks"),
            ForceCloseEligibility::TooFewDeposits { deposited } => {
                write!(f, "only {deposited} deposit(s), too few to close privately")
            },
            ForceCloseEligibility::Closable { deposited, privacy } => {
                write!(f, "closable with {deposited} deposit(s), privacy: {privacy:?}")
            },
        }
    }
}
