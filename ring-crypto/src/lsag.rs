//! A linkable spontaneous anonymous group (LSAG) signature over alt_bn128
//!
//! The signature proves that the signer holds the secret key of one member of
//! a ring without revealing which. The key image `I = x · H_p(ring)` is
//! deterministic in the signer's key and the ring, so a second signature by
//! the same member over the same ring is linkable, which the contract uses to
//! reject replays.

use alloy_primitives::U256;
use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ff::{UniformRand, Zero};
use constants::{CurvePoint, Scalar, SystemCurveGroup};
use itertools::Itertools;
use rand::{CryptoRng, RngCore};

use crate::{
    conversion::{point_to_coordinates, scalar_to_u256},
    error::CryptoError,
    hash::{h1, hash_to_point, point_to_bytes, points_to_bytes},
};

/// A ring signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingSignature {
    /// The challenge at ring position zero, which seeds verification
    pub challenge: Scalar,
    /// One response per ring member, in ring order
    pub responses: Vec<Scalar>,
    /// The key image linking signatures by the same member
    pub key_image: CurvePoint,
}

impl RingSignature {
    /// The challenge as the contract's `c0` argument
    pub fn challenge_u256(&self) -> U256 {
        scalar_to_u256(&self.challenge)
    }

    /// The key image as the contract's `keyImage` argument
    pub fn key_image_u256(&self) -> [U256; 2] {
        let (x, y) = point_to_coordinates(&self.key_image);
        [x, y]
    }

    /// The responses as the contract's `s` argument
    pub fn responses_u256(&self) -> Vec<U256> {
        self.responses.iter().map(scalar_to_u256).collect_vec()
    }
}

/// Compute the key image of a secret key with respect to a ring
pub fn key_image(ring: &[CurvePoint], secret_key: &Scalar) -> CurvePoint {
    let h = hash_to_point(&points_to_bytes(ring));
    (h * secret_key).into_affine()
}

/// Sign a message on behalf of the ring member at `index`
pub fn sign<R: RngCore + CryptoRng>(
    message: &[u8],
    ring: &[CurvePoint],
    secret_key: &Scalar,
    index: usize,
    rng: &mut R,
) -> Result<RingSignature, CryptoError> {
    let n = ring.len();
    if n == 0 {
        return Err(CryptoError::EmptyRing);
    }
    if index >= n {
        return Err(CryptoError::IndexOutOfBounds { index, size: n });
    }

    let generator = SystemCurveGroup::generator();
    if (generator * secret_key).into_affine() != ring[index] {
        return Err(CryptoError::KeyMismatch(index));
    }

    let ring_bytes = points_to_bytes(ring);
    let h = hash_to_point(&ring_bytes);
    let key_image = (h * secret_key).into_affine();

    let mut challenges = vec![Scalar::zero(); n];
    let mut responses = vec![Scalar::zero(); n];

    // Commit to a random nonce at the signer's position
    let nonce = Scalar::rand(rng);
    let next = (index + 1) % n;
    challenges[next] =
        challenge(&ring_bytes, &key_image, message, generator * nonce, h * nonce);

    // Walk the ring from the signer's successor back around to the signer,
    // simulating every other member's response
    let mut i = next;
    while i != index {
        responses[i] = Scalar::rand(rng);
        let (z1, z2) = commitments(generator, h, ring[i], key_image, responses[i], challenges[i]);
        challenges[(i + 1) % n] = challenge(&ring_bytes, &key_image, message, z1, z2);
        i = (i + 1) % n;
    }

    // Close the ring
    responses[index] = nonce - *secret_key * challenges[index];
    Ok(RingSignature { challenge: challenges[0], responses, key_image })
}

/// Verify a ring signature over a message
pub fn verify(message: &[u8], ring: &[CurvePoint], signature: &RingSignature) -> bool {
    let n = ring.len();
    if n == 0 || signature.responses.len() != n {
        return false;
    }

    let key_image = signature.key_image;
    if key_image.is_zero() || !key_image.is_on_curve() {
        return false;
    }

    let generator = SystemCurveGroup::generator();
    let ring_bytes = points_to_bytes(ring);
    let h = hash_to_point(&ring_bytes);

    let mut c = signature.challenge;
    for (member, response) in ring.iter().zip(signature.responses.iter()) {
        let (z1, z2) = commitments(generator, h, *member, key_image, *response, c);
        c = challenge(&ring_bytes, &key_image, message, z1, z2);
    }

    c == signature.challenge
}

/// Compute the commitments `z1 = s·G + c·P` and `z2 = s·H + c·I` for one
/// ring position
fn commitments(
    generator: SystemCurveGroup,
    h: CurvePoint,
    member: CurvePoint,
    key_image: CurvePoint,
    response: Scalar,
    challenge: Scalar,
) -> (SystemCurveGroup, SystemCurveGroup) {
    let z1 = generator * response + member * challenge;
    let z2 = h * response + key_image * challenge;
    (z1, z2)
}

/// Hash the transcript of one ring position into the next challenge
fn challenge(
    ring_bytes: &[u8],
    key_image: &CurvePoint,
    message: &[u8],
    z1: SystemCurveGroup,
    z2: SystemCurveGroup,
) -> Scalar {
    let mut transcript = Vec::with_capacity(ring_bytes.len() + message.len() + 3 * 64);
    transcript.extend_from_slice(ring_bytes);
    transcript.extend_from_slice(&point_to_bytes(key_image));
    transcript.extend_from_slice(message);
    transcript.extend_from_slice(&point_to_bytes(&z1.into_affine()));
    transcript.extend_from_slice(&point_to_bytes(&z2.into_affine()));

    h1(&transcript)
}

#[cfg(test)]
mod tests {
    use rand::thread_rng;

    use super::*;

    /// Generate a random ring of the given size, returning the ring and the
    /// secret keys of its members
    fn random_ring(size: usize) -> (Vec<CurvePoint>, Vec<Scalar>) {
        let mut rng = thread_rng();
        let secrets = (0..size).map(|_| Scalar::rand(&mut rng)).collect_vec();
        let ring = secrets
            .iter()
            .map(|sk| (SystemCurveGroup::generator() * sk).into_affine())
            .collect_vec();

        (ring, secrets)
    }

    #[test]
    fn test_sign_verify_every_position() {
        let mut rng = thread_rng();
        let (ring, secrets) = random_ring(5);

        for (idx, sk) in secrets.iter().enumerate() {
            let sig = sign(b"withdraw", &ring, sk, idx, &mut rng).unwrap();
            assert_eq!(sig.responses.len(), ring.len());
            assert!(verify(b"withdraw", &ring, &sig));
        }
    }

    #[test]
    fn test_single_member_ring() {
        let mut rng = thread_rng();
        let (ring, secrets) = random_ring(1);

        let sig = sign(b"msg", &ring, &secrets[0], 0, &mut rng).unwrap();
        assert!(verify(b"msg", &ring, &sig));
    }

    #[test]
    fn test_tampered_message_fails() {
        let mut rng = thread_rng();
        let (ring, secrets) = random_ring(3);

        let sig = sign(b"msg", &ring, &secrets[1], 1, &mut rng).unwrap();
        assert!(!verify(b"other msg", &ring, &sig));

        let mut tampered = sig.clone();
        tampered.responses[0] += Scalar::from(1u64);
        assert!(!verify(b"msg", &ring, &tampered));
    }

    #[test]
    fn test_key_image_links_signatures() {
        let mut rng = thread_rng();
        let (ring, secrets) = random_ring(4);

        let sig1 = sign(b"first", &ring, &secrets[2], 2, &mut rng).unwrap();
        let sig2 = sign(b"second", &ring, &secrets[2], 2, &mut rng).unwrap();
        let sig3 = sign(b"first", &ring, &secrets[3], 3, &mut rng).unwrap();

        assert_eq!(sig1.key_image, sig2.key_image);
        assert_ne!(sig1.key_image, sig3.key_image);
        assert_eq!(sig1.key_image, key_image(&ring, &secrets[2]));
    }

    #[test]
    fn test_sign_errors() {
        let mut rng = thread_rng();
        let (ring, secrets) = random_ring(2);

        assert_eq!(sign(b"m", &[], &secrets[0], 0, &mut rng), Err(CryptoError::EmptyRing));
        assert_eq!(
            sign(b"m", &ring, &secrets[0], 2, &mut rng),
            Err(CryptoError::IndexOutOfBounds { index: 2, size: 2 })
        );
        assert_eq!(sign(b"m", &ring, &secrets[0], 1, &mut rng), Err(CryptoError::KeyMismatch(1)));
    }

    #[test]
    fn test_wrong_ring_fails() {
        let mut rng = thread_rng();
        let (ring, secrets) = random_ring(3);
        let (other_ring, _) = random_ring(3);

        let sig = sign(b"msg", &ring, &secrets[0], 0, &mut rng).unwrap();
        assert!(!verify(b"msg", &other_ring, &sig));
        assert!(!verify(b"msg", &ring[..2], &sig));
    }
}
