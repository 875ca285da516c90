//! Commit-reveal engine for lottery tickets.
//!
//! ## Commit-Reveal Flow
//!
//! 1. **Generate** - Draw a fresh 32-byte seed from a secure random source
//! 2. **Commit** - Publish `sha256(seed || participant || round_id)` with the ticket purchase
//! 3. **Reveal** - After sales close, disclose the seed
//! 4. **Verify** - The contract recomputes the digest and compares it to the commit
//!
//! ## Byte Layout
//!
//! ```text
//! preimage = seed bytes
//!         || UTF-8 bytes of the participant address string
//!         || round_id as 8-byte big-endian u64
//! ```
//!
//! The seed and round id are fixed width, so the address occupies exactly the
//! bytes between offset 32 and `len - 8`. The layout must match the verifying
//! contract byte for byte.

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use lottery_types::{Commitment, Error, Result, Seed, SEED_LEN};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use subtle::ConstantTimeEq;

/// Draw a seed from the provided secure random source.
pub fn generate_seed<R: RngCore + CryptoRng>(rng: &mut R) -> Seed {
    let mut bytes = [0u8; SEED_LEN];
    rng.fill_bytes(&mut bytes);
    Seed::from_bytes(bytes)
}

/// Draw a seed from the operating system's random source.
pub fn fresh_seed() -> Seed {
    generate_seed(&mut OsRng)
}

/// Assemble the exact bytes that are hashed into a commitment.
///
/// `seed` is taken as raw bytes because the contract accepts reveals of any
/// length; seeds produced here are always [SEED_LEN] bytes.
pub fn commitment_preimage(seed: &[u8], participant: &str, round_id: u64) -> Result<Vec<u8>> {
    if participant.is_empty() {
        return Err(Error::Encoding("participant address is empty"));
    }
    if round_id == 0 {
        return Err(Error::Encoding("round id must be positive"));
    }
    let address = participant.as_bytes();
    let mut preimage = Vec::with_capacity(seed.len() + address.len() + 8);
    preimage.extend_from_slice(seed);
    preimage.extend_from_slice(address);
    preimage.extend_from_slice(&round_id.to_be_bytes());
    Ok(preimage)
}

/// Compute the commitment over arbitrary revealed bytes.
pub fn commit_bytes(seed: &[u8], participant: &str, round_id: u64) -> Result<Commitment> {
    let preimage = commitment_preimage(seed, participant, round_id)?;
    Ok(Commitment::from_bytes(Sha256::hash(&preimage).0))
}

/// Compute `sha256(seed || participant || round_id)`.
pub fn compute_commitment(seed: &Seed, participant: &str, round_id: u64) -> Result<Commitment> {
    commit_bytes(seed.as_bytes(), participant, round_id)
}

/// Recompute the commitment and compare it without early exit.
///
/// Arguments that cannot form a commitment verify as `false`.
pub fn verify_commitment(
    seed: &Seed,
    participant: &str,
    round_id: u64,
    expected: &Commitment,
) -> bool {
    verify_bytes(seed.as_bytes(), participant, round_id, expected)
}

/// [verify_commitment] over arbitrary revealed bytes.
pub fn verify_bytes(seed: &[u8], participant: &str, round_id: u64, expected: &Commitment) -> bool {
    match commit_bytes(seed, participant, round_id) {
        Ok(computed) => computed.as_bytes().ct_eq(expected.as_bytes()).into(),
        Err(_) => false,
    }
}

/// A freshly drawn seed together with the commitment published for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub round_id: u64,
    pub participant: String,
    pub seed: Seed,
    pub commitment: Commitment,
}

impl Ticket {
    /// Draw a seed and bind it to `participant` and `round_id`.
    pub fn draw<R: RngCore + CryptoRng>(
        rng: &mut R,
        participant: &str,
        round_id: u64,
    ) -> Result<Self> {
        let seed = generate_seed(rng);
        let commitment = compute_commitment(&seed, participant, round_id)?;
        Ok(Self {
            round_id,
            participant: participant.to_string(),
            seed,
            commitment,
        })
    }

    /// [Ticket::draw] from the operating system's random source.
    pub fn fresh(participant: &str, round_id: u64) -> Result<Self> {
        Self::draw(&mut OsRng, participant, round_id)
    }

    /// Verify that the commitment still matches the seed.
    pub fn verify(&self) -> bool {
        verify_commitment(&self.seed, &self.participant, self.round_id, &self.commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{counting_seed, test_rng, PARTICIPANT};
    use lottery_types::ErrorKind;
    use std::collections::HashSet;

    #[test]
    fn test_preimage_layout() {
        let seed = counting_seed();
        let preimage = commitment_preimage(seed.as_bytes(), "GABC", 7).unwrap();
        assert_eq!(preimage.len(), 32 + 4 + 8);
        assert_eq!(&preimage[..32], seed.as_bytes());
        assert_eq!(&preimage[32..36], b"GABC");
        assert_eq!(&preimage[36..], &[0, 0, 0, 0, 0, 0, 0, 7]);
    }

    #[test]
    fn test_known_commitment_vector() {
        let commitment = compute_commitment(&counting_seed(), "GABC", 7).unwrap();
        assert_eq!(
            commitment.to_hex(),
            "727bda531762fa33dc4feb489a5ed34754c5c98a5661253974685aab7c4aaaf6"
        );

        let commitment = compute_commitment(&counting_seed(), PARTICIPANT, 1).unwrap();
        assert_eq!(
            commitment.to_hex(),
            "80fd9d337e5b5834b91f62707a608432c3a9c5a36d6d53b14952f1da03b50529"
        );
    }

    #[test]
    fn test_compute_commitment_deterministic() {
        let seed = generate_seed(&mut test_rng());
        let first = compute_commitment(&seed, PARTICIPANT, 42).unwrap();
        let second = compute_commitment(&seed, PARTICIPANT, 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_commitment_rejects_bad_arguments() {
        let seed = counting_seed();
        assert_eq!(
            compute_commitment(&seed, "", 1).unwrap_err().kind(),
            ErrorKind::Encoding
        );
        assert_eq!(
            compute_commitment(&seed, PARTICIPANT, 0).unwrap_err().kind(),
            ErrorKind::Encoding
        );
    }

    #[test]
    fn test_verify_commitment_success() {
        let seed = generate_seed(&mut test_rng());
        let commitment = compute_commitment(&seed, PARTICIPANT, 9).unwrap();
        assert!(verify_commitment(&seed, PARTICIPANT, 9, &commitment));
    }

    #[test]
    fn test_verify_commitment_binds_every_input() {
        let mut rng = test_rng();
        let seed = generate_seed(&mut rng);
        let commitment = compute_commitment(&seed, PARTICIPANT, 9).unwrap();

        let other_seed = generate_seed(&mut rng);
        assert!(!verify_commitment(&other_seed, PARTICIPANT, 9, &commitment));
        assert!(!verify_commitment(&seed, "GOTHER", 9, &commitment));
        assert!(!verify_commitment(&seed, PARTICIPANT, 10, &commitment));

        // Tamper with a single bit of the seed
        let mut flipped = *seed.as_bytes();
        flipped[31] ^= 0x01;
        assert!(!verify_commitment(
            &Seed::from_bytes(flipped),
            PARTICIPANT,
            9,
            &commitment
        ));
    }

    #[test]
    fn test_verify_with_invalid_arguments_is_false() {
        let seed = counting_seed();
        let commitment = compute_commitment(&seed, PARTICIPANT, 1).unwrap();
        assert!(!verify_commitment(&seed, "", 1, &commitment));
        assert!(!verify_commitment(&seed, PARTICIPANT, 0, &commitment));
    }

    #[test]
    fn test_verify_bytes_accepts_short_reveals() {
        let commitment = commit_bytes(&[1, 2, 3], PARTICIPANT, 5).unwrap();
        assert!(verify_bytes(&[1, 2, 3], PARTICIPANT, 5, &commitment));
        assert!(!verify_bytes(&[1, 2], PARTICIPANT, 5, &commitment));
    }

    #[test]
    fn test_ticket_draw_verifies() {
        let ticket = Ticket::draw(&mut test_rng(), PARTICIPANT, 3).unwrap();
        assert!(ticket.verify());
        assert_eq!(ticket.round_id, 3);

        let fresh = Ticket::fresh(PARTICIPANT, 3).unwrap();
        assert!(fresh.verify());
        assert_ne!(fresh.seed, ticket.seed);

        let mut tampered = fresh.clone();
        tampered.round_id = 4;
        assert!(!tampered.verify());
        assert!(Ticket::fresh("", 3).is_err());
    }

    #[test]
    fn test_fresh_seeds_do_not_repeat() {
        // 2^-256 collision odds per pair; any repeat means a broken source
        let seeds: HashSet<[u8; SEED_LEN]> = (0..1000).map(|_| *fresh_seed().as_bytes()).collect();
        assert_eq!(seeds.len(), 1000);
    }

    #[test]
    fn test_fresh_seed_byte_distribution() {
        let mut byte_counts = [0u64; 256];
        let samples = 1000;
        for _ in 0..samples {
            for byte in fresh_seed().as_bytes() {
                byte_counts[*byte as usize] += 1;
            }
        }

        // Expected per bucket: 32000 / 256 = 125
        let expected = (samples * SEED_LEN) as f64 / 256.0;
        let chi_square: f64 = byte_counts
            .iter()
            .map(|&count| {
                let diff = count as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // Chi-square critical value for 255 df at p=0.001 is ~330
        assert!(
            chi_square < 400.0,
            "Byte distribution seems non-uniform, chi-square = {}",
            chi_square
        );
    }
}
