//! The user data header: a TLV list carried at the front of the user data
//! field, flagged by the UDHI bit of the first TPDU octet.
use std::convert::TryFrom;

use crate::{PduError, PduResult};

/// One information element: identifier octet plus its data. Element 0x00 is
/// the concatenation reference; reassembly of multipart messages is the
/// caller's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    pub id: u8,
    pub data: Vec<u8>,
}

/// An ordered list of information elements. Serializes as a UDHL octet
/// (total length of what follows) and then an (IEI, IEDL, IED) triple per
/// element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataHeader {
    pub elements: Vec<InformationElement>,
}

impl UserDataHeader {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialized form including the leading UDHL octet. An empty element
    /// list produces no bytes at all (and the frame's UDHI bit stays clear).
    pub fn as_bytes(&self) -> Vec<u8> {
        if self.elements.is_empty() {
            return Vec::new();
        }
        let mut ret = vec![0];
        for element in self.elements.iter() {
            ret.push(element.id);
            ret.push(element.data.len() as u8);
            ret.extend_from_slice(&element.data);
        }
        ret[0] = (ret.len() - 1) as u8;
        ret
    }

    /// Number of octets the serialized header occupies, UDHL octet included.
    pub fn encoded_len(&self) -> usize {
        if self.elements.is_empty() {
            return 0;
        }
        1 + self.elements.iter().map(|e| 2 + e.data.len()).sum::<usize>()
    }

    /// Fill bits between the header and the first text septet, so 7-bit user
    /// data resumes on a septet boundary.
    pub fn fill_bits(&self) -> usize {
        (7 - (self.encoded_len() * 8) % 7) % 7
    }

    /// Number of septets the header (with its fill bits) occupies inside a
    /// 7-bit user data length.
    pub fn septet_len(&self) -> usize {
        (self.encoded_len() * 8 + 6) / 7
    }
}

impl<'a> TryFrom<&'a [u8]> for UserDataHeader {
    type Error = PduError;

    /// Parses from the start of a user data field, UDHL octet first.
    fn try_from(b: &[u8]) -> PduResult<Self> {
        let udhl = *b.first().ok_or(PduError::IncorrectUdhLength)? as usize;
        if udhl + 1 > b.len() {
            return Err(PduError::IncorrectUdhLength);
        }
        let mut elements = vec![];
        let mut offset = 1;
        while offset < udhl + 1 {
            if offset + 2 > udhl + 1 {
                return Err(PduError::IncorrectUdhLength);
            }
            let id = b[offset];
            let len = b[offset + 1] as usize;
            let end = offset + 2 + len;
            if end > udhl + 1 {
                return Err(PduError::IncorrectUdhLength);
            }
            elements.push(InformationElement {
                id,
                data: b[offset + 2..end].to_vec(),
            });
            offset = end;
        }
        Ok(UserDataHeader { elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat_header() -> UserDataHeader {
        UserDataHeader {
            elements: vec![InformationElement {
                id: 0x00,
                data: vec![0xC2, 0x02, 0x01],
            }],
        }
    }

    #[test]
    fn serializes_with_udhl_prefix() {
        assert_eq!(concat_header().as_bytes(), [0x05, 0x00, 0x03, 0xC2, 0x02, 0x01]);
    }

    #[test]
    fn empty_header_is_invisible() {
        let udh = UserDataHeader::default();
        assert!(udh.as_bytes().is_empty());
        assert_eq!(udh.encoded_len(), 0);
    }

    #[test]
    fn round_trip() {
        let udh = UserDataHeader {
            elements: vec![
                InformationElement { id: 0x00, data: vec![0xC2, 0x02, 0x01] },
                InformationElement { id: 0x08, data: vec![0x12, 0x34, 0x02, 0x01] },
            ],
        };
        let bytes = udh.as_bytes();
        assert_eq!(UserDataHeader::try_from(&bytes[..]).unwrap(), udh);
    }

    #[test]
    fn parse_ignores_trailing_user_data() {
        // Header followed by packed text; only UDHL octets belong to it.
        let mut bytes = concat_header().as_bytes();
        bytes.extend_from_slice(&[0xA0, 0x61, 0x39, 0x3D, 0x06]);
        assert_eq!(UserDataHeader::try_from(&bytes[..]).unwrap(), concat_header());
    }

    #[test]
    fn septet_arithmetic() {
        let udh = concat_header();
        // 6 octets = 48 bits: one fill bit, seven septets.
        assert_eq!(udh.encoded_len(), 6);
        assert_eq!(udh.fill_bits(), 1);
        assert_eq!(udh.septet_len(), 7);
    }

    #[test]
    fn udhl_overrunning_buffer_fails() {
        assert_eq!(
            UserDataHeader::try_from(&[0x05, 0x00, 0x03][..]),
            Err(PduError::IncorrectUdhLength)
        );
    }

    #[test]
    fn element_overrunning_udhl_fails() {
        // UDHL says 4, but the element wants 5 octets.
        assert_eq!(
            UserDataHeader::try_from(&[0x04, 0x00, 0x03, 0xC2, 0x02, 0x01][..]),
            Err(PduError::IncorrectUdhLength)
        );
    }

    #[test]
    fn empty_buffer_fails() {
        assert_eq!(UserDataHeader::try_from(&[][..]), Err(PduError::IncorrectUdhLength));
    }
}
