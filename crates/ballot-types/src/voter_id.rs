use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// 20-byte principal identifying a voter.
///
/// Display format is `0x`-prefixed lowercase hex, matching the account
/// strings wallet clients hand over. Bech32m with the "voter" prefix is
/// accepted on input and available through [`VoterId::to_bech32`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VoterId([u8; 20]);

impl VoterId {
    pub const ZERO: Self = Self([0u8; 20]);
    pub const LEN: usize = 20;

    /// Bech32m human-readable prefix
    pub const BECH32_HRP: &'static str = "voter";

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Create from a byte slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        if slice.len() != Self::LEN {
            return Err(TypesError::InvalidVoterIdLength(slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Short test/demo ids: the last byte carries `n`.
    pub fn from_index(n: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }

    /// Hex string without 0x prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Bech32m encoding with the "voter" prefix.
    pub fn to_bech32(&self) -> Result<String, TypesError> {
        let hrp = bech32::Hrp::parse_unchecked(Self::BECH32_HRP);
        bech32::encode::<bech32::Bech32m>(hrp, &self.0)
            .map_err(|e| TypesError::Bech32Error(e.to_string()))
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoterId(0x{})", hex::encode(self.0))
    }
}

impl fmt::LowerHex for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for VoterId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex_part) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let bytes = hex::decode(hex_part)?;
            return Self::from_slice(&bytes);
        }

        if s.starts_with("voter1") {
            let (hrp, data) = bech32::decode(s)
                .map_err(|e| TypesError::Bech32Error(e.to_string()))?;

            let expected_hrp = bech32::Hrp::parse_unchecked(Self::BECH32_HRP);
            if hrp != expected_hrp {
                return Err(TypesError::InvalidVoterIdFormat(format!(
                    "Invalid HRP: expected '{}', got '{}'",
                    Self::BECH32_HRP,
                    hrp
                )));
            }
            return Self::from_slice(&data);
        }

        Err(TypesError::InvalidVoterIdFormat(s.to_string()))
    }
}

impl AsRef<[u8]> for VoterId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voter_id_zero() {
        assert_eq!(VoterId::ZERO.as_bytes(), &[0u8; 20]);
        assert!(VoterId::ZERO.is_zero());
        assert!(!VoterId::from_index(1).is_zero());
    }

    #[test]
    fn test_voter_id_hex_roundtrip() {
        let id = VoterId::from_bytes([0xabu8; 20]);
        let text = id.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<VoterId>().unwrap(), id);
    }

    #[test]
    fn test_voter_id_accepts_checksummed_wallet_address() {
        // Mixed-case account strings as handed over by wallet providers
        let id: VoterId = "0xB17C5D561926D0eD32C4c7232b39cA9aE8e325B2".parse().unwrap();
        assert_eq!(id.as_bytes()[0], 0xb1);
        assert_eq!(id.as_bytes()[19], 0xb2);
    }

    #[test]
    fn test_voter_id_bech32m() {
        let bytes: [u8; 20] = (0..20).map(|i| i as u8).collect::<Vec<_>>().try_into().unwrap();
        let id = VoterId::from_bytes(bytes);

        let encoded = id.to_bech32().unwrap();
        assert!(encoded.starts_with("voter1"));
        assert_eq!(encoded.parse::<VoterId>().unwrap(), id);
    }

    #[test]
    fn test_voter_id_from_str_invalid() {
        assert!(VoterId::from_str("invalid").is_err());
        assert!(VoterId::from_str("0x1234").is_err());
        assert!(VoterId::from_str("0xzz").is_err());
        assert!(VoterId::from_str("voter1notbech32").is_err());
    }

    #[test]
    fn test_from_slice_length() {
        assert!(matches!(
            VoterId::from_slice(&[1u8; 19]),
            Err(TypesError::InvalidVoterIdLength(19))
        ));
        assert!(VoterId::from_slice(&[1u8; 20]).is_ok());
    }
}
