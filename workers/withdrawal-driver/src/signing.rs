//! Builds the messages signed for withdrawal and forced ring-closure, and
//! the signed contract calls carrying them

use alloy_primitives::{Address, Bytes};
use common::types::token::WithdrawalToken;
use pool_client::conversion::{encode_force_close_call, encode_withdraw_call};
use ring_crypto::{RingSignature, RingSigner};

use crate::{error::WithdrawalTaskError, membership::MembershipMatch};

// ------------
// | Messages |
// ------------

/// The message signed to withdraw: the ring hash followed by the receiving
/// address, so the signature cannot be replayed to pay another address
pub fn withdrawal_message(ring_hash: &[u8], address: &[u8]) -> Vec<u8> {
    [ring_hash, address].concat()
}

/// The message signed to close a ring: the ring hash alone
pub fn close_ring_message(ring_hash: &[u8]) -> Vec<u8> {
    ring_hash.to_vec()
}

// ------------
// | Requests |
// ------------

/// A signed call ready for dispatch
#[derive(Clone, Debug)]
pub struct SignedCall {
    /// The signature carried by the call
    pub signature: RingSignature,
    /// The ABI encoded call
    pub calldata: Bytes,
}

/// Sign and encode a withdrawal paying `receiver`
pub fn sign_withdrawal(
    signer: &dyn RingSigner,
    token: &WithdrawalToken,
    ring_hash: &[u8],
    receiver: Address,
    member: &MembershipMatch,
) -> Result<SignedCall, WithdrawalTaskError> {
    let message = withdrawal_message(ring_hash, receiver.as_slice());
    let signature = sign(signer, &message, member)?;
    let calldata =
        encode_withdraw_call(receiver, token.amount_tier, token.ring_index, &signature);

    Ok(SignedCall { signature, calldata })
}

/// Sign and encode a forced close of the token's ring
pub fn sign_force_close(
    signer: &dyn RingSigner,
    token: &WithdrawalToken,
    ring_hash: &[u8],
    member: &MembershipMatch,
) -> Result<SignedCall, WithdrawalTaskError> {
    let message = close_ring_message(ring_hash);
    let signature = sign(signer, &message, member)?;
    let calldata = encode_force_close_call(token.amount_tier, token.ring_index, &signature);

    Ok(SignedCall { signature, calldata })
}

/// Sign a message as the matched ring member
fn sign(
    signer: &dyn RingSigner,
    message: &[u8],
    member: &MembershipMatch,
) -> Result<RingSignature, WithdrawalTaskError> {
    signer
        .ring_sign(message, &member.ring, &member.keypair.secret_scalar, member.index)
        .map_err(WithdrawalTaskError::from)
}
