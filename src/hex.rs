//! Hex strings, the form in which PDUs travel over the AT interface.
use std::fmt;

use crate::{PduError, PduResult};

/// Wrapper that displays a byte slice as an uppercase hex string, the way a
/// modem expects a PDU on the wire.
#[derive(Debug)]
pub struct HexData<'a>(pub &'a [u8]);

impl<'a> fmt::Display for HexData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl<'a> HexData<'a> {
    /// Parse a hex string into octets. Whitespace is ignored, so the spaced
    /// notation used in documentation ("00 04 0B ...") parses as-is.
    pub fn decode(data: &str) -> PduResult<Vec<u8>> {
        let digits: Vec<u8> = data
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_digit(16).map(|d| d as u8).ok_or(PduError::InvalidHex))
            .collect::<PduResult<_>>()?;
        if digits.len() % 2 != 0 {
            return Err(PduError::InvalidHex);
        }
        Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trip() {
        let bytes = [0x00, 0x04, 0x0B, 0x91, 0xF0];
        let hex = HexData(&bytes).to_string();
        assert_eq!(hex, "00040B91F0");
        assert_eq!(HexData::decode(&hex).unwrap(), bytes);
    }

    #[test]
    fn decode_ignores_whitespace() {
        assert_eq!(HexData::decode("00 04 d4 F2").unwrap(), [0x00, 0x04, 0xD4, 0xF2]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(HexData::decode("0g"), Err(PduError::InvalidHex));
        assert_eq!(HexData::decode("abc"), Err(PduError::InvalidHex));
    }
}
