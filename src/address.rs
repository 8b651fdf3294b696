// SS58 Address Transcoder
//
// Converts hex-encoded substrate public keys (as carried by extrinsic
// signatures) into SS58 display addresses.

use crate::error::AddressError;
use blake2::{Blake2b512, Digest};
use tracing::warn;

/// Sentinel used when an address is absent or cannot be transcoded.
pub const UNKNOWN_ADDRESS: &str = "0x";

/// Generic substrate network prefix (the "substrate" codec).
pub const SUBSTRATE_PREFIX: u16 = 42;

const CHECKSUM_PREIMAGE_PREFIX: &[u8] = b"SS58PRE";

/// SS58 codec bound to one network prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ss58Codec {
    prefix: u16,
}

impl Default for Ss58Codec {
    fn default() -> Self {
        Self {
            prefix: SUBSTRATE_PREFIX,
        }
    }
}

impl Ss58Codec {
    /// Prefixes above 16383 cannot be represented in the two-byte form.
    pub fn new(prefix: u16) -> Result<Self, AddressError> {
        if prefix > 16_383 {
            return Err(AddressError::InvalidPrefix(prefix));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    /// Encode raw public key bytes as an SS58 string.
    pub fn encode(&self, public_key: &[u8]) -> Result<String, AddressError> {
        let checksum_len = match public_key.len() {
            1 | 2 | 4 | 8 => 1,
            32 | 33 => 2,
            len => return Err(AddressError::InvalidLength(len)),
        };

        let mut payload = match self.prefix {
            0..=63 => vec![self.prefix as u8],
            _ => {
                // Two-byte form: lower six bits of the first byte, then the rest.
                let first = ((self.prefix & 0b0000_0000_1111_1100) as u8) >> 2;
                let second =
                    ((self.prefix >> 8) as u8) | (((self.prefix & 0b0000_0000_0000_0011) as u8) << 6);
                vec![first | 0b0100_0000, second]
            }
        };
        payload.extend_from_slice(public_key);

        let mut hasher = Blake2b512::new();
        hasher.update(CHECKSUM_PREIMAGE_PREFIX);
        hasher.update(&payload);
        let checksum = hasher.finalize();

        payload.extend_from_slice(&checksum[..checksum_len]);
        Ok(bs58::encode(payload).into_string())
    }

    /// Decode a `0x`-prefixed hex public key and encode it as SS58.
    pub fn encode_hex(&self, hex_key: &str) -> Result<String, AddressError> {
        let payload = hex_key
            .strip_prefix("0x")
            .ok_or(AddressError::MissingPrefix)?;
        let bytes = hex::decode(payload)?;
        self.encode(&bytes)
    }

    /// Fail-soft conversion used during record construction.
    ///
    /// Absent or empty input yields [`UNKNOWN_ADDRESS`]. Malformed input is
    /// logged and also yields the sentinel, never an error.
    pub fn to_native_address(&self, hex_key: Option<&str>) -> String {
        let Some(hex_key) = hex_key.filter(|key| !key.is_empty()) else {
            return UNKNOWN_ADDRESS.to_string();
        };

        match self.encode_hex(hex_key) {
            Ok(address) => address,
            Err(e) => {
                warn!("Error converting hex value {} to native address: {}", hex_key, e);
                UNKNOWN_ADDRESS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    #[test]
    fn test_encode_substrate_generic() {
        let codec = Ss58Codec::default();
        assert_eq!(codec.prefix(), SUBSTRATE_PREFIX);
        assert_eq!(
            codec.to_native_address(Some(ALICE)),
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        );
    }

    #[test]
    fn test_encode_polkadot_prefix() {
        let codec = Ss58Codec::new(0).unwrap();
        assert_eq!(codec.prefix(), 0);
        assert_eq!(
            codec.encode_hex(ALICE).unwrap(),
            "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5"
        );
    }

    #[test]
    fn test_absent_address_yields_sentinel() {
        let codec = Ss58Codec::default();
        assert_eq!(codec.to_native_address(None), UNKNOWN_ADDRESS);
        assert_eq!(codec.to_native_address(Some("")), UNKNOWN_ADDRESS);
    }

    #[test]
    fn test_malformed_address_yields_sentinel() {
        let codec = Ss58Codec::default();

        // No 0x prefix
        assert_eq!(
            codec.to_native_address(Some(&ALICE[2..])),
            UNKNOWN_ADDRESS
        );
        // Not hex
        assert_eq!(codec.to_native_address(Some("0xzzzz")), UNKNOWN_ADDRESS);
        // Odd length
        assert_eq!(codec.to_native_address(Some("0xabc")), UNKNOWN_ADDRESS);
        // 20-byte EVM address is not a valid public key length
        assert_eq!(
            codec.to_native_address(Some("0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640")),
            UNKNOWN_ADDRESS
        );
    }

    #[test]
    fn test_encode_errors() {
        let codec = Ss58Codec::default();
        assert!(matches!(
            codec.encode_hex("d435"),
            Err(AddressError::MissingPrefix)
        ));
        assert!(matches!(
            codec.encode(&[0u8; 20]),
            Err(AddressError::InvalidLength(20))
        ));
        assert!(matches!(
            Ss58Codec::new(16_384),
            Err(AddressError::InvalidPrefix(16_384))
        ));
    }

    #[test]
    fn test_two_byte_prefix_encodes() {
        let codec = Ss58Codec::new(2_000).unwrap();
        let public_key = hex::decode(&ALICE[2..]).unwrap();

        let address = codec.encode(&public_key).unwrap();
        let raw = bs58::decode(&address).into_vec().unwrap();

        // 2 prefix bytes + 32 key bytes + 2 checksum bytes
        assert_eq!(raw.len(), 36);
        assert_eq!(raw[0] & 0b1100_0000, 0b0100_0000);
        assert_eq!(&raw[2..34], public_key.as_slice());
    }
}
