//! Encoding and decoding of SMS PDUs as specified in 3GPP TS 23.040.
//!
//! The entry point is [`pdu::Message`], a high-level representation of a
//! short message. [`pdu::Message::encode`] turns it into the octet sequence a
//! GSM modem expects (SMSC prefix followed by the TPDU), and
//! [`pdu::Message::decode`] parses such a sequence back. SMS-DELIVER,
//! SMS-SUBMIT and SMS-STATUS-REPORT frames are supported, in the GSM 7-bit
//! default alphabet and UCS-2 encodings.
//!
//! The codec is pure: octets in, structured value out, and vice versa. Modem
//! I/O, AT-command framing and multipart reassembly are up to the caller (the
//! user-data-header fields are exposed for the latter).
use std::fmt::Formatter;

pub mod gsm_encoding;
pub mod hex;
pub mod pdu;
pub mod udh;

#[macro_export]
macro_rules! check_offset {
    ($b:ident, $offset:ident, $field:expr) => {
        if $b.get($offset).is_none() {
            return Err(PduError::IncorrectSize($field));
        }
    };
}

pub type PduResult<T> = Result<T, PduError>;

/// Everything that can go wrong encoding or decoding a PDU.
///
/// All errors are fatal to the call that produced them; there are no partial
/// results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PduError {
    /// The data coding scheme octet selects an encoding this codec does not
    /// speak (anything outside the GSM 7-bit default alphabet and UCS-2).
    UnsupportedEncoding(u8),
    /// The MTI bits of the first TPDU octet do not name a supported frame.
    UnknownMessageType(u8),
    /// A field claimed more octets than the buffer holds, the SMSC prefix
    /// exceeds 16 octets, or a UCS-2 payload has odd length. Carries the name
    /// of the field that fell short.
    IncorrectSize(&'static str),
    /// Absolute and enhanced validity periods are recognized but not codable.
    NonRelativeNotImplemented,
    /// The user data header length field overruns the user data.
    IncorrectUdhLength,
    /// A character with no GSM 7-bit representation was encoded in strict
    /// mode.
    UnsupportedChar(char),
    /// Input to the hex parser was not a hex string.
    InvalidHex,
}

impl std::fmt::Display for PduError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PduError::UnsupportedEncoding(dcs) => write!(f, "unsupported data coding scheme: {:#04x}", dcs),
            PduError::UnknownMessageType(mti) => write!(f, "unsupported message type: {:#04b}", mti),
            PduError::IncorrectSize(field) => write!(f, "incorrect size of field: {}", field),
            PduError::NonRelativeNotImplemented => write!(f, "non-relative validity period support is not implemented"),
            PduError::IncorrectUdhLength => write!(f, "incorrect user data header length"),
            PduError::UnsupportedChar(c) => write!(f, "character {:?} is not representable in the GSM 7-bit alphabet", c),
            PduError::InvalidHex => write!(f, "invalid hex string"),
        }
    }
}

impl std::error::Error for PduError {}
