//! Recipient Address Encoding
//!
//! NTT routes recipients as 32-byte Wormhole universal addresses. EVM
//! addresses are left-padded with zeros:
//!
//! ```text
//! | Zero padding (12 bytes) | Raw EVM address (20 bytes) |
//! ```
//!
//! Destination addresses typed by the user are validated here, before any
//! transaction is built.

use alloy::primitives::{Address, B256};
use std::fmt;

use crate::error::{TransferError, TransferResult};

/// Validated destination address with its universal encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecipientAddress(Address);

impl RecipientAddress {
    /// Parse a user-entered address
    ///
    /// Accepts `0x` followed by 40 hex characters. All-lowercase and
    /// all-uppercase input is accepted as-is; mixed case must be a valid
    /// EIP-55 checksum.
    pub fn parse(input: &str) -> TransferResult<Self> {
        let trimmed = input.trim();
        let invalid = |reason: &str| TransferError::InvalidAddress(format!("{}: {}", trimmed, reason));

        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| invalid("missing 0x prefix"))?;

        if hex_part.len() != 40 {
            return Err(invalid(&format!(
                "expected 40 hex characters, got {}",
                hex_part.len()
            )));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("contains non-hex characters"));
        }

        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());

        let address = if has_lower && has_upper {
            Address::parse_checksummed(format!("0x{}", hex_part), None)
                .map_err(|_| invalid("checksum mismatch"))?
        } else {
            let bytes = hex::decode(hex_part).map_err(|_| invalid("invalid hex"))?;
            Address::from_slice(&bytes)
        };

        Self::from_address(address)
    }

    /// Wrap an already-typed address
    pub fn from_address(address: Address) -> TransferResult<Self> {
        if address == Address::ZERO {
            return Err(TransferError::InvalidAddress(
                "the zero address cannot receive tokens".to_string(),
            ));
        }
        Ok(Self(address))
    }

    /// Use `input` when given, otherwise the connected wallet address
    pub fn resolve(input: Option<&str>, connected: Address) -> TransferResult<Self> {
        match input.map(str::trim) {
            Some(s) if !s.is_empty() => Self::parse(s),
            _ => Self::from_address(connected),
        }
    }

    pub fn address(&self) -> Address {
        self.0
    }

    /// 32-byte universal encoding used by the NTT manager
    pub fn to_universal(&self) -> B256 {
        to_universal_address(self.0)
    }
}

impl fmt::Display for RecipientAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_checksum(None))
    }
}

/// Left-pad an EVM address to 32 bytes
pub fn to_universal_address(address: Address) -> B256 {
    address.into_word()
}

/// Recover an EVM address from its universal encoding
///
/// Fails if the 12 padding bytes are not zero.
pub fn from_universal_address(word: &B256) -> TransferResult<Address> {
    if word[..12].iter().any(|&b| b != 0) {
        return Err(TransferError::InvalidAddress(format!(
            "{} is not a padded EVM address",
            word
        )));
    }
    Ok(Address::from_slice(&word[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_checksummed_address_accepted() {
        let recipient = RecipientAddress::parse(CHECKSUMMED).unwrap();
        assert_eq!(recipient.to_string(), CHECKSUMMED);
    }

    #[test]
    fn test_single_case_address_accepted() {
        let lower = RecipientAddress::parse(&CHECKSUMMED.to_lowercase()).unwrap();
        let upper = RecipientAddress::parse(&format!("0x{}", CHECKSUMMED[2..].to_uppercase()))
            .unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // Flip the case of one letter; the rest stays mixed case
        let tampered = CHECKSUMMED.replacen("Fd6", "fd6", 1);
        let err = RecipientAddress::parse(&tampered).unwrap_err();
        assert!(matches!(err, TransferError::InvalidAddress(_)));
    }

    #[test]
    fn test_malformed_addresses_rejected() {
        let cases = [
            "",
            "f39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb9226",
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb922666",
            "0xg39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "terra1x46rqay4d3cssq8gxxvqz8xt6nwlz4td20k38v",
            "0x0000000000000000000000000000000000000000",
        ];
        for case in cases {
            let err = RecipientAddress::parse(case).unwrap_err();
            assert_eq!(err.user_message(), "Invalid address format", "case {:?}", case);
        }
    }

    #[test]
    fn test_resolve_defaults_to_connected() {
        let connected = Address::repeat_byte(0x11);
        assert_eq!(
            RecipientAddress::resolve(None, connected).unwrap().address(),
            connected
        );
        assert_eq!(
            RecipientAddress::resolve(Some("   "), connected)
                .unwrap()
                .address(),
            connected
        );

        let explicit = RecipientAddress::resolve(Some(CHECKSUMMED), connected).unwrap();
        assert_ne!(explicit.address(), connected);
    }

    #[test]
    fn test_universal_encoding() {
        let recipient = RecipientAddress::parse(CHECKSUMMED).unwrap();
        let word = recipient.to_universal();

        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], recipient.address().as_slice());
        assert_eq!(from_universal_address(&word).unwrap(), recipient.address());
    }

    #[test]
    fn test_universal_with_dirty_padding_rejected() {
        let mut word = B256::ZERO;
        word[0] = 1;
        word[31] = 1;
        assert!(from_universal_address(&word).is_err());
    }
}
