//! The PDU layer of 3GPP TS 23.040: addresses, timestamps, validity periods,
//! the three supported frame layouts and the [`Message`] façade on top of
//! them.
//!
//! A PDU as handed to (or by) a modem is an SMSC address prefix followed by
//! the TPDU proper. [`Message::encode`] and [`Message::decode`] work on that
//! full form; the frame types ([`DeliverPdu`], [`SubmitPdu`],
//! [`StatusReportPdu`]) work on the TPDU alone and are what you want when the
//! SMSC prefix is handled elsewhere.
use std::convert::{Infallible, TryFrom};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::gsm_encoding;
use crate::udh::UserDataHeader;
use crate::{check_offset, PduError, PduResult};

/// Type of number value - the top three payload bits of the type-of-address
/// octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum TypeOfNumber {
    /// Unknown number type (the network figures it out).
    Unknown = 0b0_000_0000,
    /// International (i.e. starting with +).
    International = 0b0_001_0000,
    /// National number - no prefix or suffix added.
    National = 0b0_010_0000,
    /// Network-specific number.
    Special = 0b0_011_0000,
    /// Alphanumeric sender - packed GSM 7-bit text instead of digits, the
    /// kind banks use. Decode-only; you can't send to one of these.
    Gsm = 0b0_101_0000,
    /// Abbreviated number.
    Short = 0b0_110_0000,
    /// Reserved for future use.
    Reserved = 0b0_111_0000,
}

/// Numbering plan identification value - the low nibble of the
/// type-of-address octet. `IsdnTelephone` is what phone numbers use.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum NumberingPlanIdentification {
    NetworkDetermined = 0b0_000_0000,
    IsdnTelephone = 0b0_000_0001,
    Data = 0b0_000_0011,
    Telex = 0b0_000_0100,
    National = 0b0_000_1000,
    Private = 0b0_000_1001,
    Ermes = 0b0_000_1010,
}

/// The type-of-address octet, decomposed. The wire form always has the top
/// bit set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AddressType {
    pub type_of_number: TypeOfNumber,
    pub numbering_plan_identification: NumberingPlanIdentification,
}

impl Default for AddressType {
    fn default() -> Self {
        AddressType {
            type_of_number: TypeOfNumber::International,
            numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone,
        }
    }
}

impl TryFrom<u8> for AddressType {
    type Error = PduError;
    fn try_from(b: u8) -> PduResult<Self> {
        let ton = TypeOfNumber::from_u8(b & 0b0_111_0000)
            .ok_or(PduError::IncorrectSize("type-of-address octet"))?;
        let npi = NumberingPlanIdentification::from_u8(b & 0b0_000_1111)
            .ok_or(PduError::IncorrectSize("type-of-address octet"))?;
        Ok(Self {
            type_of_number: ton,
            numbering_plan_identification: npi,
        })
    }
}

impl From<AddressType> for u8 {
    fn from(at: AddressType) -> u8 {
        0b1_000_0000 | at.type_of_number as u8 | at.numbering_plan_identification as u8
    }
}

fn digit_to_char(d: u8) -> char {
    match d {
        0..=9 => (b'0' + d) as char,
        10 => '*',
        11 => '#',
        12 => 'a',
        13 => 'b',
        14 => 'c',
        _ => '?',
    }
}

fn char_to_digit(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        '*' => Some(10),
        '#' => Some(11),
        'a' => Some(12),
        'b' => Some(13),
        'c' => Some(14),
        _ => None,
    }
}

/// A phone number as a list of digit values (0-9, plus 10-14 for `*`, `#`,
/// `a`-`c`), encoded on the wire as swapped-nibble semi-octets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PhoneNumber(pub Vec<u8>);

impl<'a> From<&'a [u8]> for PhoneNumber {
    /// Reads semi-octets; a 0xF filler nibble ends an odd-length number.
    fn from(b: &[u8]) -> Self {
        let mut digits = Vec::with_capacity(b.len() * 2);
        for octet in b.iter() {
            digits.push(octet & 0b0000_1111);
            let second = (octet & 0b1111_0000) >> 4;
            if second != 0b0000_1111 {
                digits.push(second);
            }
        }
        PhoneNumber(digits)
    }
}

impl PhoneNumber {
    /// Make a `PhoneNumber` holding an alphanumeric sender: `septets` unpacked
    /// GSM 7-bit values rather than digits.
    pub fn from_gsm(b: &[u8], septets: usize) -> Self {
        let mut unpacked = gsm_encoding::unpack_septets(b, 0);
        unpacked.truncate(septets);
        PhoneNumber(unpacked)
    }

    /// Semi-octet wire form; an odd digit count gets a 0xF filler in the
    /// final high nibble.
    pub fn as_semi_octets(&self) -> Vec<u8> {
        let mut ret = Vec::with_capacity((self.0.len() + 1) / 2);
        for pair in self.0.chunks(2) {
            let low = pair[0] & 0b0000_1111;
            let high = pair.get(1).copied().unwrap_or(0b0000_1111);
            ret.push((high << 4) | low);
        }
        ret
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A PDU address: phone number plus number type.
///
/// The `FromStr` implementation converts ordinary string phone numbers
/// (digits, `*#abc`, optional leading `+`) into this form; `Display` goes the
/// other way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PduAddress {
    pub type_addr: AddressType,
    pub number: PhoneNumber,
}

impl fmt::Display for PduAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.type_addr.type_of_number == TypeOfNumber::Gsm {
            return write!(f, "{}", gsm_encoding::gsm_decode_string(&self.number.0));
        }
        if self.type_addr.type_of_number == TypeOfNumber::International {
            write!(f, "+")?;
        }
        for d in self.number.0.iter() {
            write!(f, "{}", digit_to_char(*d))?;
        }
        Ok(())
    }
}

impl FromStr for PduAddress {
    type Err = Infallible;
    fn from_str(st: &str) -> Result<Self, Infallible> {
        let mut international = false;
        let digits = st
            .chars()
            .filter_map(|c| {
                if c == '+' {
                    international = true;
                    None
                } else {
                    char_to_digit(c)
                }
            })
            .collect::<Vec<_>>();
        let type_of_number = if international {
            TypeOfNumber::International
        } else {
            TypeOfNumber::Unknown
        };
        Ok(PduAddress {
            type_addr: AddressType {
                type_of_number,
                numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone,
            },
            number: PhoneNumber(digits),
        })
    }
}

impl<'a> TryFrom<&'a [u8]> for PduAddress {
    type Error = PduError;
    /// Expects `[length, TOA, semi-octets...]`. The caller sizes the slice;
    /// the length octet is only consulted for alphanumeric senders, where it
    /// counts nibbles of packed text.
    fn try_from(b: &[u8]) -> PduResult<Self> {
        if b.len() < 2 {
            return Err(PduError::IncorrectSize("address"));
        }
        let len = b[0] as usize;
        let type_addr = AddressType::try_from(b[1])?;
        let number = if type_addr.type_of_number == TypeOfNumber::Gsm {
            PhoneNumber::from_gsm(&b[2..], len * 4 / 7)
        } else {
            PhoneNumber::from(&b[2..])
        };
        Ok(PduAddress { type_addr, number })
    }
}

impl PduAddress {
    fn encoded(&self) -> Vec<u8> {
        let mut ret = vec![self.type_addr.into()];
        ret.extend(self.number.as_semi_octets());
        ret
    }

    /// Wire form for the TP-OA/TP-DA/TP-RA fields, where the length octet
    /// counts **digits** (semi-octets), not bytes.
    pub fn as_bytes_tp(&self) -> Vec<u8> {
        let mut ret = self.encoded();
        ret.insert(0, self.number.0.len() as u8);
        ret
    }

    /// Wire form for the SMSC prefix, where the length octet counts
    /// **octets including the TOA**. An empty address is the single octet
    /// 0x00.
    pub fn as_bytes_smsc(&self) -> Vec<u8> {
        if self.number.is_empty() {
            return vec![0x00];
        }
        let mut ret = self.encoded();
        ret.insert(0, ret.len() as u8);
        ret
    }
}

/// SMS PDU message type, as found in the MTI bits of the first TPDU octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum MessageType {
    /// SMS-DELIVER (SC to MS).
    Deliver = 0b00,
    /// SMS-SUBMIT (MS to SC).
    Submit = 0b01,
    /// SMS-STATUS-REPORT (SC to MS).
    StatusReport = 0b10,
}

/// Message encoding, stored verbatim as the TP-DCS octet.
///
/// The two 7-bit variants are distinct DCS values that both select the
/// default alphabet; anything else surfaces as
/// [`PduError::UnsupportedEncoding`] on decode.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum MessageEncoding {
    /// GSM 7-bit default alphabet.
    Gsm7Bit = 0x00,
    /// UCS-2 (UTF-16BE).
    Ucs2 = 0x08,
    /// Default alphabet again, via the message-class form of the DCS.
    Gsm7BitAlt = 0x11,
}

impl MessageEncoding {
    fn is_gsm_7bit(self) -> bool {
        matches!(self, MessageEncoding::Gsm7Bit | MessageEncoding::Gsm7BitAlt)
    }
}

/// Validity period format, the two VPF bits of the SMS-SUBMIT first octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum ValidityPeriodFormat {
    FieldNotPresent = 0b00,
    Enhanced = 0b01,
    Relative = 0b10,
    Absolute = 0b11,
}

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// A message validity period. Only the relative format is codable: a single
/// octet on a piecewise scale from 5 minutes to 63 weeks.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidityPeriod(pub Duration);

impl ValidityPeriod {
    /// The relative-format octet closest to (and not above) this duration.
    pub fn octet(&self) -> u8 {
        let mins = self.0.as_secs() / MINUTE;
        if mins <= 12 * 60 {
            (mins / 5).saturating_sub(1) as u8
        } else if mins <= 24 * 60 {
            (143 + (mins - 12 * 60) / 30) as u8
        } else {
            let days = self.0.as_secs() / DAY;
            if days <= 30 {
                (166 + days) as u8
            } else {
                (192 + days / 7).min(255) as u8
            }
        }
    }

    pub fn from_octet(value: u8) -> Self {
        let v = value as u64;
        let secs = match value {
            0..=143 => (v + 1) * 5 * MINUTE,
            144..=167 => 12 * HOUR + (v - 143) * 30 * MINUTE,
            168..=196 => (v - 166) * DAY,
            197..=255 => (v - 192) * WEEK,
        };
        ValidityPeriod(Duration::from_secs(secs))
    }
}

fn swap_semi(v: u8) -> u8 {
    ((v % 10) << 4) | (v / 10)
}

fn unswap_semi(b: u8) -> u8 {
    (b & 0b0000_1111) * 10 + (b >> 4)
}

/// A service centre timestamp: seven swapped-nibble BCD octets.
///
/// The timezone is in quarter-hours east of GMT; its sign lives in bit 3 of
/// the tens nibble on the wire. Decoding and re-encoding reproduces the same
/// seven octets.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Quarter-hours between local time and GMT, signed.
    pub timezone: i8,
}

impl<'a> TryFrom<&'a [u8]> for Timestamp {
    type Error = PduError;
    fn try_from(b: &[u8]) -> PduResult<Self> {
        if b.len() != 7 {
            return Err(PduError::IncorrectSize("timestamp"));
        }
        let negative = b[6] & 0b0000_1000 > 0;
        let quarters = unswap_semi(b[6] & !0b0000_1000) as i8;
        Ok(Timestamp {
            year: unswap_semi(b[0]),
            month: unswap_semi(b[1]),
            day: unswap_semi(b[2]),
            hour: unswap_semi(b[3]),
            minute: unswap_semi(b[4]),
            second: unswap_semi(b[5]),
            timezone: if negative { -quarters } else { quarters },
        })
    }
}

impl Timestamp {
    pub fn as_bytes(&self) -> [u8; 7] {
        let mut tz = swap_semi(self.timezone.unsigned_abs());
        if self.timezone < 0 {
            tz |= 0b0000_1000;
        }
        [
            swap_semi(self.year % 100),
            swap_semi(self.month),
            swap_semi(self.day),
            swap_semi(self.hour),
            swap_semi(self.minute),
            swap_semi(self.second),
            tz,
        ]
    }
}

/// SMS delivery status codes for STATUS-REPORT PDUs.
///
/// The raw TP-ST octet is kept on [`Message::status`] so reserved values pass
/// through unchanged; this enum is a classification of the codes TS 23.040
/// names.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageStatus {
    // Short message transaction completed
    /// Short message received by the SME
    ReceivedBySme = 0x00,
    /// Short message forwarded by the SC to the SME but the SC is unable to confirm delivery
    ForwardedUnconfirmed = 0x01,
    /// Short message replaced by the SC
    ReplacedBySc = 0x02,

    // Temporary error, SC still trying to transfer SM
    /// Congestion
    Congestion = 0x20,
    /// SME busy
    SmeBusy = 0x21,
    /// No response from SME
    NoResponseFromSme = 0x22,
    /// Service rejected
    ServiceRejected = 0x23,
    /// Quality of service not available
    QualityOfServiceNotAvailable = 0x24,
    /// Error in SME
    ErrorInSme = 0x25,

    // Permanent error, SC is not making any more transfer attempts
    /// Remote procedure error
    RemoteProcedureError = 0x40,
    /// Incompatible destination
    IncompatibleDestination = 0x41,
    /// Connection rejected by SME
    ConnectionRejectedBySme = 0x42,
    /// Not obtainable
    NotObtainable = 0x43,
    /// Quality of service not available
    QualityOfServiceNotAvailablePermanent = 0x44,
    /// No interworking available
    NoInterworkingAvailable = 0x45,
    /// SM validity period expired
    SmValidityPeriodExpired = 0x46,
    /// SM deleted by originating SME
    SmDeletedByOriginatingSme = 0x47,
    /// SM deleted by SC administration
    SmDeletedByScAdministration = 0x48,
    /// SM does not exist
    SmDoesNotExist = 0x49,

    // Temporary error, SC is not making any more transfer attempts
    /// Congestion
    CongestionNoMoreAttempts = 0x60,
    /// SME busy
    SmeBusyNoMoreAttempts = 0x61,
    /// No response from SME
    NoResponseFromSmeNoMoreAttempts = 0x62,
    /// Service rejected
    ServiceRejectedNoMoreAttempts = 0x63,
    /// Quality of service not available
    QualityOfServiceNotAvailableNoMoreAttempts = 0x64,
    /// Error in SME
    ErrorInSmeNoMoreAttempts = 0x65,
}

impl MessageStatus {
    /// Returns true if this status indicates successful delivery.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            MessageStatus::ReceivedBySme | MessageStatus::ForwardedUnconfirmed | MessageStatus::ReplacedBySc
        )
    }

    /// Returns true if this is a temporary error (SC still trying).
    pub fn is_temporary_error(&self) -> bool {
        (0x20..=0x3F).contains(&(*self as u8))
    }

    /// Returns true if this is a permanent error (SC gave up).
    /// More delivery reports will not be received for the message.
    pub fn is_permanent_error(&self) -> bool {
        (0x40..=0x6F).contains(&(*self as u8))
    }
}

/// The first octet of an SMS-DELIVER TPDU.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DeliverFirstOctet {
    /// More messages are waiting at the SC. Stored inverted on the wire: the
    /// bit set means "no more".
    pub more_messages_to_send: bool,
    /// Loop prevention flag.
    pub loop_prevention: bool,
    /// A status report will be returned to the SME.
    pub status_report_indication: bool,
    /// Does the user data segment start with a header?
    pub user_data_header_indicator: bool,
    /// Do replies to this message use the same settings as this message?
    pub reply_path: bool,
}

impl From<u8> for DeliverFirstOctet {
    fn from(b: u8) -> Self {
        DeliverFirstOctet {
            more_messages_to_send: (b & 0b0000_0100) == 0,
            loop_prevention: (b & 0b0000_1000) > 0,
            status_report_indication: (b & 0b0010_0000) > 0,
            user_data_header_indicator: (b & 0b0100_0000) > 0,
            reply_path: (b & 0b1000_0000) > 0,
        }
    }
}

impl From<DeliverFirstOctet> for u8 {
    fn from(fo: DeliverFirstOctet) -> u8 {
        let mut ret = MessageType::Deliver as u8;
        if !fo.more_messages_to_send {
            ret |= 0b0000_0100;
        }
        if fo.loop_prevention {
            ret |= 0b0000_1000;
        }
        if fo.status_report_indication {
            ret |= 0b0010_0000;
        }
        if fo.user_data_header_indicator {
            ret |= 0b0100_0000;
        }
        if fo.reply_path {
            ret |= 0b1000_0000;
        }
        ret
    }
}

/// The first octet of an SMS-SUBMIT TPDU.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubmitFirstOctet {
    /// Reject the message if the SC still holds one with the same reference.
    pub reject_duplicates: bool,
    /// Format of the validity period field.
    pub validity_period_format: ValidityPeriodFormat,
    /// Whether to request a status report for this message.
    pub status_report_request: bool,
    /// Does the user data segment start with a header?
    pub user_data_header_indicator: bool,
    /// Do replies to this message use the same settings as this message?
    pub reply_path: bool,
}

impl From<u8> for SubmitFirstOctet {
    fn from(b: u8) -> Self {
        let validity_period_format = ValidityPeriodFormat::from_u8((b & 0b0001_1000) >> 3)
            .expect("two VPF bits cover every format");
        SubmitFirstOctet {
            reject_duplicates: (b & 0b0000_0100) > 0,
            validity_period_format,
            status_report_request: (b & 0b0010_0000) > 0,
            user_data_header_indicator: (b & 0b0100_0000) > 0,
            reply_path: (b & 0b1000_0000) > 0,
        }
    }
}

impl From<SubmitFirstOctet> for u8 {
    fn from(fo: SubmitFirstOctet) -> u8 {
        let mut ret = MessageType::Submit as u8;
        ret |= (fo.validity_period_format as u8) << 3;
        if fo.reject_duplicates {
            ret |= 0b0000_0100;
        }
        if fo.status_report_request {
            ret |= 0b0010_0000;
        }
        if fo.user_data_header_indicator {
            ret |= 0b0100_0000;
        }
        if fo.reply_path {
            ret |= 0b1000_0000;
        }
        ret
    }
}

/// The first octet of an SMS-STATUS-REPORT TPDU.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StatusReportFirstOctet {
    /// More messages are waiting at the SC. Stored inverted on the wire.
    pub more_messages_to_send: bool,
    /// Loop prevention flag.
    pub loop_prevention: bool,
    /// Status report qualifier: clear for the result of an SMS-SUBMIT, set
    /// for the result of an SMS-COMMAND.
    pub status_report_qualificator: bool,
    /// Does the user data segment start with a header?
    pub user_data_header_indicator: bool,
}

impl From<u8> for StatusReportFirstOctet {
    fn from(b: u8) -> Self {
        StatusReportFirstOctet {
            more_messages_to_send: (b & 0b0000_0100) == 0,
            loop_prevention: (b & 0b0000_1000) > 0,
            status_report_qualificator: (b & 0b0010_0000) > 0,
            user_data_header_indicator: (b & 0b0100_0000) > 0,
        }
    }
}

impl From<StatusReportFirstOctet> for u8 {
    fn from(fo: StatusReportFirstOctet) -> u8 {
        let mut ret = MessageType::StatusReport as u8;
        if !fo.more_messages_to_send {
            ret |= 0b0000_0100;
        }
        if fo.loop_prevention {
            ret |= 0b0000_1000;
        }
        if fo.status_report_qualificator {
            ret |= 0b0010_0000;
        }
        if fo.user_data_header_indicator {
            ret |= 0b0100_0000;
        }
        ret
    }
}

/// Reads a TP address field at `offset`: length octet (counting digits), TOA,
/// semi-octets. Returns the address and the offset past it.
fn read_address(b: &[u8], offset: usize, field: &'static str) -> PduResult<(PduAddress, usize)> {
    check_offset!(b, offset, field);
    let len_digits = b[offset] as usize;
    let len_octets = len_digits / 2 + len_digits % 2;
    let end = offset + 2 + len_octets;
    let last = end - 1;
    check_offset!(b, last, field);
    let addr = PduAddress::try_from(&b[offset..end])?;
    Ok((addr, end))
}

fn read_timestamp(b: &[u8], offset: usize, field: &'static str) -> PduResult<(Timestamp, usize)> {
    let end = offset + 7;
    let last = end - 1;
    check_offset!(b, last, field);
    let ts = Timestamp::try_from(&b[offset..end])?;
    Ok((ts, end))
}

/// An SMS-DELIVER TPDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverPdu {
    pub first_octet: DeliverFirstOctet,
    pub originating_address: PduAddress,
    pub protocol_identifier: u8,
    pub data_coding_scheme: u8,
    pub service_centre_timestamp: Timestamp,
    /// In septets for 7-bit data, octets otherwise.
    pub user_data_len: u8,
    pub user_data: Vec<u8>,
}

impl DeliverPdu {
    pub fn from_bytes(b: &[u8]) -> PduResult<(usize, Self)> {
        let mut offset = 0usize;
        check_offset!(b, offset, "first TPDU octet");
        let first_octet = DeliverFirstOctet::from(b[offset]);
        offset += 1;
        let (originating_address, next) = read_address(b, offset, "originating address")?;
        offset = next;
        check_offset!(b, offset, "protocol identifier");
        let protocol_identifier = b[offset];
        offset += 1;
        check_offset!(b, offset, "data coding scheme");
        let data_coding_scheme = b[offset];
        offset += 1;
        let (service_centre_timestamp, next) = read_timestamp(b, offset, "service centre timestamp")?;
        offset = next;
        check_offset!(b, offset, "user data length");
        let user_data_len = b[offset];
        offset += 1;
        let user_data = b[offset..].to_vec();
        offset += user_data.len();
        Ok((
            offset,
            DeliverPdu {
                first_octet,
                originating_address,
                protocol_identifier,
                data_coding_scheme,
                service_centre_timestamp,
                user_data_len,
                user_data,
            },
        ))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut ret = vec![self.first_octet.into()];
        ret.extend(self.originating_address.as_bytes_tp());
        ret.push(self.protocol_identifier);
        ret.push(self.data_coding_scheme);
        ret.extend_from_slice(&self.service_centre_timestamp.as_bytes());
        ret.push(self.user_data_len);
        ret.extend_from_slice(&self.user_data);
        ret
    }
}

/// An SMS-SUBMIT TPDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPdu {
    pub first_octet: SubmitFirstOctet,
    pub message_reference: u8,
    pub destination_address: PduAddress,
    pub protocol_identifier: u8,
    pub data_coding_scheme: u8,
    /// Present iff the first octet's VPF says relative.
    pub validity_period: Option<u8>,
    /// In septets for 7-bit data, octets otherwise.
    pub user_data_len: u8,
    pub user_data: Vec<u8>,
}

impl SubmitPdu {
    pub fn from_bytes(b: &[u8]) -> PduResult<(usize, Self)> {
        let mut offset = 0usize;
        check_offset!(b, offset, "first TPDU octet");
        let first_octet = SubmitFirstOctet::from(b[offset]);
        offset += 1;
        check_offset!(b, offset, "message reference");
        let message_reference = b[offset];
        offset += 1;
        let (destination_address, next) = read_address(b, offset, "destination address")?;
        offset = next;
        check_offset!(b, offset, "protocol identifier");
        let protocol_identifier = b[offset];
        offset += 1;
        check_offset!(b, offset, "data coding scheme");
        let data_coding_scheme = b[offset];
        offset += 1;
        let validity_period = match first_octet.validity_period_format {
            ValidityPeriodFormat::FieldNotPresent => None,
            ValidityPeriodFormat::Relative => {
                check_offset!(b, offset, "validity period");
                let vp = b[offset];
                offset += 1;
                Some(vp)
            }
            ValidityPeriodFormat::Enhanced | ValidityPeriodFormat::Absolute => {
                return Err(PduError::NonRelativeNotImplemented)
            }
        };
        check_offset!(b, offset, "user data length");
        let user_data_len = b[offset];
        offset += 1;
        let user_data = b[offset..].to_vec();
        offset += user_data.len();
        Ok((
            offset,
            SubmitPdu {
                first_octet,
                message_reference,
                destination_address,
                protocol_identifier,
                data_coding_scheme,
                validity_period,
                user_data_len,
                user_data,
            },
        ))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut ret = vec![self.first_octet.into()];
        ret.push(self.message_reference);
        ret.extend(self.destination_address.as_bytes_tp());
        ret.push(self.protocol_identifier);
        ret.push(self.data_coding_scheme);
        if let Some(vp) = self.validity_period {
            ret.push(vp);
        }
        ret.push(self.user_data_len);
        ret.extend_from_slice(&self.user_data);
        ret
    }
}

/// An SMS-STATUS-REPORT TPDU.
///
/// Everything after TP-ST is optional, gated by a parameter-indicator octet:
/// bit 0 adds a protocol identifier, bit 1 a data coding scheme, bit 2 a user
/// data length and user data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReportPdu {
    pub first_octet: StatusReportFirstOctet,
    pub message_reference: u8,
    pub recipient_address: PduAddress,
    pub service_centre_timestamp: Timestamp,
    pub discharge_timestamp: Timestamp,
    pub status: u8,
    pub parameter_indicator: Option<u8>,
    pub protocol_identifier: u8,
    pub data_coding_scheme: Option<u8>,
    pub user_data_len: u8,
    pub user_data: Vec<u8>,
}

impl StatusReportPdu {
    pub fn from_bytes(b: &[u8]) -> PduResult<(usize, Self)> {
        let mut offset = 0usize;
        check_offset!(b, offset, "first TPDU octet");
        let first_octet = StatusReportFirstOctet::from(b[offset]);
        offset += 1;
        check_offset!(b, offset, "message reference");
        let message_reference = b[offset];
        offset += 1;
        let (recipient_address, next) = read_address(b, offset, "recipient address")?;
        offset = next;
        let (service_centre_timestamp, next) = read_timestamp(b, offset, "service centre timestamp")?;
        offset = next;
        let (discharge_timestamp, next) = read_timestamp(b, offset, "discharge timestamp")?;
        offset = next;
        check_offset!(b, offset, "status");
        let status = b[offset];
        offset += 1;

        let mut parameter_indicator = None;
        let mut protocol_identifier = 0;
        let mut data_coding_scheme = None;
        let mut user_data_len = 0;
        let mut user_data = vec![];
        if offset < b.len() {
            let pi = b[offset];
            parameter_indicator = Some(pi);
            offset += 1;
            if pi & 0b0000_0001 > 0 {
                check_offset!(b, offset, "protocol identifier");
                protocol_identifier = b[offset];
                offset += 1;
            }
            if pi & 0b0000_0010 > 0 {
                check_offset!(b, offset, "data coding scheme");
                data_coding_scheme = Some(b[offset]);
                offset += 1;
            }
            if pi & 0b0000_0100 > 0 {
                check_offset!(b, offset, "user data length");
                user_data_len = b[offset];
                offset += 1;
                user_data = b[offset..].to_vec();
                offset += user_data.len();
            }
        }
        Ok((
            offset,
            StatusReportPdu {
                first_octet,
                message_reference,
                recipient_address,
                service_centre_timestamp,
                discharge_timestamp,
                status,
                parameter_indicator,
                protocol_identifier,
                data_coding_scheme,
                user_data_len,
                user_data,
            },
        ))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut ret = vec![self.first_octet.into()];
        ret.push(self.message_reference);
        ret.extend(self.recipient_address.as_bytes_tp());
        ret.extend_from_slice(&self.service_centre_timestamp.as_bytes());
        ret.extend_from_slice(&self.discharge_timestamp.as_bytes());
        ret.push(self.status);
        if let Some(pi) = self.parameter_indicator {
            ret.push(pi);
            if pi & 0b0000_0001 > 0 {
                ret.push(self.protocol_identifier);
            }
            if pi & 0b0000_0010 > 0 {
                ret.push(self.data_coding_scheme.unwrap_or(0));
            }
            if pi & 0b0000_0100 > 0 {
                ret.push(self.user_data_len);
                ret.extend_from_slice(&self.user_data);
            }
        }
        ret
    }
}

fn cut_str(text: String, n: usize) -> String {
    if text.chars().count() > n {
        text.chars().take(n).collect()
    } else {
        text
    }
}

/// An SMS message: the user-friendly, high-level representation that should
/// be passed around.
///
/// `encode` produces the octet sequence a modem transmits (SMSC prefix plus
/// TPDU); `decode` parses one. Which fields are meaningful depends on
/// `message_type`: a Deliver has `service_center_time`, a Submit has the
/// validity period, a StatusReport has `discharge_time` and `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_type: MessageType,
    pub encoding: MessageEncoding,
    pub validity_period: ValidityPeriod,
    pub validity_period_format: ValidityPeriodFormat,
    pub service_center_time: Timestamp,
    pub discharge_time: Timestamp,
    pub service_center_address: PduAddress,
    pub address: PduAddress,
    pub text: String,
    pub user_data_header: UserDataHeader,

    // Advanced
    pub message_reference: u8,
    /// Raw TP-ST octet; see [`Message::delivery_status`].
    pub status: u8,
    pub reply_path_exists: bool,
    pub user_data_starts_with_header: bool,
    pub status_report_indication: bool,
    pub status_report_request: bool,
    pub status_report_qualificator: bool,
    pub more_messages_to_send: bool,
    pub loop_prevention: bool,
    pub reject_duplicates: bool,
}

impl Default for Message {
    fn default() -> Self {
        Message {
            message_type: MessageType::Deliver,
            encoding: MessageEncoding::Gsm7Bit,
            validity_period: ValidityPeriod::default(),
            validity_period_format: ValidityPeriodFormat::FieldNotPresent,
            service_center_time: Timestamp::default(),
            discharge_time: Timestamp::default(),
            service_center_address: PduAddress::default(),
            address: PduAddress::default(),
            text: String::new(),
            user_data_header: UserDataHeader::default(),
            message_reference: 0,
            status: 0,
            reply_path_exists: false,
            user_data_starts_with_header: false,
            status_report_indication: false,
            status_report_request: false,
            status_report_qualificator: false,
            more_messages_to_send: false,
            loop_prevention: false,
            reject_duplicates: false,
        }
    }
}

impl Message {
    /// Serialize into octets ready to be transferred: SMSC prefix first, then
    /// the TPDU. Returns the TPDU octet count (what `AT+CMGS` wants) along
    /// with the full sequence.
    pub fn encode(&self) -> PduResult<(usize, Vec<u8>)> {
        let mut buf = self.service_center_address.as_bytes_smsc();
        let tpdu = match self.message_type {
            MessageType::Deliver => {
                let (user_data_len, user_data, udhi) = self.encode_user_data()?;
                DeliverPdu {
                    first_octet: DeliverFirstOctet {
                        more_messages_to_send: self.more_messages_to_send,
                        loop_prevention: self.loop_prevention,
                        status_report_indication: self.status_report_indication,
                        user_data_header_indicator: udhi,
                        reply_path: self.reply_path_exists,
                    },
                    originating_address: self.address.clone(),
                    protocol_identifier: 0x00,
                    data_coding_scheme: self.encoding as u8,
                    service_centre_timestamp: self.service_center_time,
                    user_data_len,
                    user_data,
                }
                .as_bytes()
            }
            MessageType::Submit => {
                let validity_period = match self.validity_period_format {
                    ValidityPeriodFormat::FieldNotPresent => None,
                    ValidityPeriodFormat::Relative => Some(self.validity_period.octet()),
                    ValidityPeriodFormat::Enhanced | ValidityPeriodFormat::Absolute => {
                        return Err(PduError::NonRelativeNotImplemented)
                    }
                };
                let (user_data_len, user_data, udhi) = self.encode_user_data()?;
                SubmitPdu {
                    first_octet: SubmitFirstOctet {
                        reject_duplicates: self.reject_duplicates,
                        validity_period_format: self.validity_period_format,
                        status_report_request: self.status_report_request,
                        user_data_header_indicator: udhi,
                        reply_path: self.reply_path_exists,
                    },
                    message_reference: self.message_reference,
                    destination_address: self.address.clone(),
                    protocol_identifier: 0x00,
                    data_coding_scheme: self.encoding as u8,
                    validity_period,
                    user_data_len,
                    user_data,
                }
                .as_bytes()
            }
            MessageType::StatusReport => {
                let (user_data_len, user_data, udhi) = self.encode_user_data()?;
                let (parameter_indicator, data_coding_scheme) = if user_data_len > 0 {
                    (Some(0b0000_0110), Some(self.encoding as u8))
                } else {
                    (None, None)
                };
                StatusReportPdu {
                    first_octet: StatusReportFirstOctet {
                        more_messages_to_send: self.more_messages_to_send,
                        loop_prevention: self.loop_prevention,
                        status_report_qualificator: self.status_report_qualificator,
                        user_data_header_indicator: udhi,
                    },
                    message_reference: self.message_reference,
                    recipient_address: self.address.clone(),
                    service_centre_timestamp: self.service_center_time,
                    discharge_timestamp: self.discharge_time,
                    status: self.status,
                    parameter_indicator,
                    protocol_identifier: 0x00,
                    data_coding_scheme,
                    user_data_len,
                    user_data,
                }
                .as_bytes()
            }
        };
        buf.extend_from_slice(&tpdu);
        Ok((tpdu.len(), buf))
    }

    /// Construct a message from PDU octets. Returns the number of octets
    /// consumed alongside the message.
    pub fn decode(octets: &[u8]) -> PduResult<(usize, Message)> {
        let mut msg = Message::default();
        let sc_len = *octets.first().ok_or(PduError::IncorrectSize("SMSC length"))? as usize;
        if sc_len > 16 {
            return Err(PduError::IncorrectSize("SMSC address"));
        }
        let tpdu_start = 1 + sc_len;
        if octets.len() < tpdu_start {
            return Err(PduError::IncorrectSize("SMSC address"));
        }
        if sc_len > 0 {
            msg.service_center_address = PduAddress::try_from(&octets[..tpdu_start])?;
        }
        let first = *octets.get(tpdu_start).ok_or(PduError::IncorrectSize("first TPDU octet"))?;
        let mti = first & 0b0000_0011;
        msg.message_type = MessageType::from_u8(mti).ok_or(PduError::UnknownMessageType(mti))?;
        let tpdu = &octets[tpdu_start..];

        let consumed = match msg.message_type {
            MessageType::Deliver => {
                let (off, sms) = DeliverPdu::from_bytes(tpdu)?;
                let fo = sms.first_octet;
                msg.more_messages_to_send = fo.more_messages_to_send;
                msg.loop_prevention = fo.loop_prevention;
                msg.reply_path_exists = fo.reply_path;
                msg.status_report_indication = fo.status_report_indication;
                msg.user_data_starts_with_header = fo.user_data_header_indicator;
                msg.address = sms.originating_address;
                msg.encoding = MessageEncoding::from_u8(sms.data_coding_scheme)
                    .ok_or(PduError::UnsupportedEncoding(sms.data_coding_scheme))?;
                msg.service_center_time = sms.service_centre_timestamp;
                let (text, udh) = decode_user_data(
                    msg.encoding,
                    fo.user_data_header_indicator,
                    &sms.user_data,
                    sms.user_data_len,
                )?;
                msg.text = text;
                msg.user_data_header = udh;
                off
            }
            MessageType::Submit => {
                let (off, sms) = SubmitPdu::from_bytes(tpdu)?;
                let fo = sms.first_octet;
                msg.reject_duplicates = fo.reject_duplicates;
                msg.reply_path_exists = fo.reply_path;
                msg.status_report_request = fo.status_report_request;
                msg.user_data_starts_with_header = fo.user_data_header_indicator;
                msg.message_reference = sms.message_reference;
                msg.address = sms.destination_address;
                msg.encoding = MessageEncoding::from_u8(sms.data_coding_scheme)
                    .ok_or(PduError::UnsupportedEncoding(sms.data_coding_scheme))?;
                msg.validity_period_format = fo.validity_period_format;
                if let Some(vp) = sms.validity_period {
                    msg.validity_period = ValidityPeriod::from_octet(vp);
                }
                let (text, udh) = decode_user_data(
                    msg.encoding,
                    fo.user_data_header_indicator,
                    &sms.user_data,
                    sms.user_data_len,
                )?;
                msg.text = text;
                msg.user_data_header = udh;
                off
            }
            MessageType::StatusReport => {
                let (off, sms) = StatusReportPdu::from_bytes(tpdu)?;
                let fo = sms.first_octet;
                msg.more_messages_to_send = fo.more_messages_to_send;
                msg.loop_prevention = fo.loop_prevention;
                msg.status_report_qualificator = fo.status_report_qualificator;
                msg.user_data_starts_with_header = fo.user_data_header_indicator;
                msg.message_reference = sms.message_reference;
                msg.address = sms.recipient_address;
                msg.service_center_time = sms.service_centre_timestamp;
                msg.discharge_time = sms.discharge_timestamp;
                msg.status = sms.status;
                if let Some(dcs) = sms.data_coding_scheme {
                    msg.encoding =
                        MessageEncoding::from_u8(dcs).ok_or(PduError::UnsupportedEncoding(dcs))?;
                }
                let (text, udh) = decode_user_data(
                    msg.encoding,
                    fo.user_data_header_indicator,
                    &sms.user_data,
                    sms.user_data_len,
                )?;
                msg.text = text;
                msg.user_data_header = udh;
                off
            }
        };
        Ok((tpdu_start + consumed, msg))
    }

    /// Classify the raw status octet, if TS 23.040 names it.
    pub fn delivery_status(&self) -> Option<MessageStatus> {
        MessageStatus::from_u8(self.status)
    }

    /// Builds the user data field: serialized header (if any), fill bits for
    /// 7-bit data, then the encoded text. Returns the UDL, the octets, and
    /// whether the UDHI bit must be set.
    fn encode_user_data(&self) -> PduResult<(u8, Vec<u8>, bool)> {
        let header = &self.user_data_header;
        if self.encoding.is_gsm_7bit() {
            if header.is_empty() {
                let (septets, packed) = gsm_encoding::encode_7bit(&self.text, 0)?;
                Ok((septets as u8, packed, false))
            } else {
                let (septets, packed) = gsm_encoding::encode_7bit(&self.text, header.fill_bits())?;
                let mut user_data = header.as_bytes();
                user_data.extend_from_slice(&packed);
                Ok(((header.septet_len() + septets) as u8, user_data, true))
            }
        } else {
            let mut user_data = header.as_bytes();
            user_data.extend_from_slice(&gsm_encoding::encode_ucs2(&self.text));
            Ok((user_data.len() as u8, user_data, !header.is_empty()))
        }
    }
}

/// Splits a user data field into its header and text. For 7-bit data the
/// user data length is in septets and the decoded text is trimmed to the
/// septets that belong to it; see the packing notes in [`gsm_encoding`].
fn decode_user_data(
    encoding: MessageEncoding,
    udhi: bool,
    user_data: &[u8],
    user_data_len: u8,
) -> PduResult<(String, UserDataHeader)> {
    let (header, skip) = if udhi {
        let udhl = *user_data.first().ok_or(PduError::IncorrectUdhLength)? as usize;
        let header = UserDataHeader::try_from(user_data)?;
        (header, udhl + 1)
    } else {
        (UserDataHeader::default(), 0)
    };
    if encoding.is_gsm_7bit() {
        let fill_bits = (7 - (skip * 8) % 7) % 7;
        let header_septets = (skip * 8 + 6) / 7;
        let text = gsm_encoding::decode_7bit(&user_data[skip..], fill_bits);
        let text_septets = (user_data_len as usize).saturating_sub(header_septets);
        Ok((cut_str(text, text_septets), header))
    } else {
        Ok((gsm_encoding::decode_ucs2(&user_data[skip..])?, header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexData;
    use crate::udh::InformationElement;

    fn addr(s: &str) -> PduAddress {
        s.parse().unwrap()
    }

    fn scts() -> Timestamp {
        Timestamp {
            year: 11,
            month: 1,
            day: 12,
            hour: 4,
            minute: 5,
            second: 6,
            timezone: 0,
        }
    }

    #[test]
    fn deliver_decodes_and_reencodes() {
        let octets =
            HexData::decode("00 04 0B 91 1234567890F0 00 00 11 10 21 40 50 60 00 04 D4F29C0E")
                .unwrap();
        let (consumed, msg) = Message::decode(&octets).unwrap();
        assert_eq!(consumed, octets.len());
        assert_eq!(msg.message_type, MessageType::Deliver);
        assert_eq!(msg.encoding, MessageEncoding::Gsm7Bit);
        assert_eq!(msg.address.to_string(), "+21436587090");
        assert!(msg.service_center_address.number.is_empty());
        assert_eq!(msg.text, "Test");
        assert_eq!(msg.service_center_time, scts());
        // The wire bit is inverted: 0x04 set means no more messages.
        assert!(!msg.more_messages_to_send);
        assert!(!msg.user_data_starts_with_header);

        let (tpdu_len, reencoded) = msg.encode().unwrap();
        assert_eq!(reencoded, octets);
        assert_eq!(tpdu_len, octets.len() - 1);
    }

    #[test]
    fn submit_encodes_field_by_field() {
        let msg = Message {
            message_type: MessageType::Submit,
            address: addr("+15551234"),
            text: "hi".into(),
            validity_period_format: ValidityPeriodFormat::Relative,
            validity_period: ValidityPeriod(Duration::from_secs(10 * 60)),
            ..Message::default()
        };
        let (tpdu_len, octets) = msg.encode().unwrap();
        let expected = HexData::decode("00 11 00 08 91 5155 2143 00 00 01 02 E834").unwrap();
        assert_eq!(octets, expected);
        assert_eq!(tpdu_len, expected.len() - 1);

        let (consumed, decoded) = Message::decode(&octets).unwrap();
        assert_eq!(consumed, octets.len());
        assert_eq!(decoded.address.to_string(), "+15551234");
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.validity_period_format, ValidityPeriodFormat::Relative);
        assert_eq!(decoded.validity_period.0, Duration::from_secs(10 * 60));
    }

    #[test]
    fn submit_with_smsc_prefix() {
        let msg = Message {
            message_type: MessageType::Submit,
            service_center_address: addr("+491710760000"),
            address: addr("+15551234"),
            text: "hi".into(),
            ..Message::default()
        };
        let (tpdu_len, octets) = msg.encode().unwrap();
        // 12 digits + TOA = 7 octets of SMSC data; the prefix length counts
        // octets, the destination length counts digits.
        assert_eq!(octets[0], 0x07);
        assert_eq!(octets[1], 0x91);
        assert_eq!(tpdu_len, octets.len() - 8);
        let (consumed, decoded) = Message::decode(&octets).unwrap();
        assert_eq!(consumed, octets.len());
        assert_eq!(decoded.service_center_address.to_string(), "+491710760000");
    }

    #[test]
    fn status_report_round_trip() {
        let octets = HexData::decode(
            "00 06 2A 08 91 5155 2143 11 10 21 40 50 60 00 11 10 21 40 50 80 00 00",
        )
        .unwrap();
        let (consumed, msg) = Message::decode(&octets).unwrap();
        assert_eq!(consumed, octets.len());
        assert_eq!(msg.message_type, MessageType::StatusReport);
        assert_eq!(msg.message_reference, 0x2A);
        assert_eq!(msg.address.to_string(), "+15551234");
        assert_eq!(msg.status, 0);
        assert_eq!(msg.delivery_status(), Some(MessageStatus::ReceivedBySme));
        assert_eq!(msg.text, "");
        assert_eq!(msg.service_center_time, scts());
        assert_eq!(msg.discharge_time.second, 8);
        assert!(!msg.more_messages_to_send);

        let (_, reencoded) = msg.encode().unwrap();
        assert_eq!(reencoded, octets);
    }

    #[test]
    fn status_report_with_empty_user_data_tail() {
        let mut octets = HexData::decode(
            "00 06 2A 08 91 5155 2143 11 10 21 40 50 60 00 11 10 21 40 50 80 00 00",
        )
        .unwrap();
        octets.extend_from_slice(&[0x04, 0x00]);
        let (consumed, msg) = Message::decode(&octets).unwrap();
        assert_eq!(consumed, octets.len());
        assert_eq!(msg.text, "");
        assert_eq!(msg.status, 0);
    }

    #[test]
    fn status_report_with_text() {
        let msg = Message {
            message_type: MessageType::StatusReport,
            address: addr("+15551234"),
            message_reference: 7,
            status: 0x46,
            service_center_time: scts(),
            discharge_time: scts(),
            text: "Test".into(),
            ..Message::default()
        };
        let (_, octets) = msg.encode().unwrap();
        let (consumed, decoded) = Message::decode(&octets).unwrap();
        assert_eq!(consumed, octets.len());
        assert_eq!(decoded.text, "Test");
        assert_eq!(decoded.status, 0x46);
        assert!(decoded.delivery_status().unwrap().is_permanent_error());
    }

    #[test]
    fn ucs2_user_data() {
        let msg = Message {
            message_type: MessageType::Deliver,
            encoding: MessageEncoding::Ucs2,
            address: addr("+15551234"),
            service_center_time: scts(),
            text: "héllo".into(),
            ..Message::default()
        };
        let (_, octets) = msg.encode().unwrap();
        // UDL is in octets for UCS-2.
        let udl_at = octets.len() - 11;
        assert_eq!(octets[udl_at], 10);
        assert_eq!(
            &octets[udl_at + 1..],
            &[0x00, 0x68, 0x00, 0xE9, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F]
        );
        let (_, decoded) = Message::decode(&octets).unwrap();
        assert_eq!(decoded.encoding, MessageEncoding::Ucs2);
        assert_eq!(decoded.text, "héllo");
    }

    #[test]
    fn udh_precedes_7bit_text_on_a_septet_boundary() {
        let header = UserDataHeader {
            elements: vec![InformationElement {
                id: 0x00,
                data: vec![0xC2, 0x02, 0x01],
            }],
        };
        let msg = Message {
            message_type: MessageType::Deliver,
            address: addr("+15551234"),
            service_center_time: scts(),
            text: "Part1".into(),
            user_data_header: header.clone(),
            ..Message::default()
        };
        let (_, octets) = msg.encode().unwrap();
        // smsc(1) fo(1) oa(2+4) pid(1) dcs(1) scts(7) puts the UDL at 17.
        assert_eq!(octets[1] & 0b0100_0000, 0b0100_0000);
        assert_eq!(octets[17], 12);
        assert_eq!(&octets[18..24], &[0x05, 0x00, 0x03, 0xC2, 0x02, 0x01]);
        assert_eq!(&octets[24..], &[0xA0, 0x61, 0x39, 0x3D, 0x06]);

        let (_, decoded) = Message::decode(&octets).unwrap();
        assert_eq!(decoded.text, "Part1");
        assert_eq!(decoded.user_data_header, header);
        assert!(decoded.user_data_starts_with_header);
    }

    #[test]
    fn udh_with_ucs2_counts_octets() {
        let header = UserDataHeader {
            elements: vec![InformationElement {
                id: 0x08,
                data: vec![0x12, 0x34, 0x02, 0x02],
            }],
        };
        let msg = Message {
            message_type: MessageType::Submit,
            encoding: MessageEncoding::Ucs2,
            address: addr("+15551234"),
            text: "héllo".into(),
            user_data_header: header.clone(),
            ..Message::default()
        };
        let (_, octets) = msg.encode().unwrap();
        let (_, decoded) = Message::decode(&octets).unwrap();
        assert_eq!(decoded.text, "héllo");
        assert_eq!(decoded.user_data_header, header);
    }

    #[test]
    fn smsc_longer_than_16_octets_is_rejected() {
        let octets = [0x11, 0x91, 0x21, 0x43];
        assert_eq!(
            Message::decode(&octets),
            Err(PduError::IncorrectSize("SMSC address"))
        );
    }

    #[test]
    fn truncated_deliver_is_rejected() {
        let octets = HexData::decode("00 04 0B 91 1234567890F0 00 00 11 10").unwrap();
        assert_eq!(
            Message::decode(&octets),
            Err(PduError::IncorrectSize("service centre timestamp"))
        );
    }

    #[test]
    fn unknown_mti_is_rejected() {
        assert_eq!(Message::decode(&[0x00, 0x03]), Err(PduError::UnknownMessageType(3)));
    }

    #[test]
    fn unknown_dcs_is_rejected() {
        let octets =
            HexData::decode("00 04 0B 91 1234567890F0 00 04 11 10 21 40 50 60 00 04 D4F29C0E")
                .unwrap();
        assert_eq!(Message::decode(&octets), Err(PduError::UnsupportedEncoding(0x04)));
    }

    #[test]
    fn submit_with_enhanced_vp_fails_both_ways() {
        let msg = Message {
            message_type: MessageType::Submit,
            address: addr("+15551234"),
            validity_period_format: ValidityPeriodFormat::Enhanced,
            ..Message::default()
        };
        assert_eq!(msg.encode(), Err(PduError::NonRelativeNotImplemented));

        // VPF bits 0b01 in the first octet select the enhanced format.
        let octets = HexData::decode("00 09 00 08 91 5155 2143 00 00 00").unwrap();
        assert_eq!(Message::decode(&octets), Err(PduError::NonRelativeNotImplemented));
    }

    #[test]
    fn more_messages_bit_is_inverted_on_the_wire() {
        let fo = DeliverFirstOctet::from(0x00);
        assert!(fo.more_messages_to_send);
        let fo = DeliverFirstOctet::from(0x04);
        assert!(!fo.more_messages_to_send);

        let msg = Message {
            message_type: MessageType::Deliver,
            address: addr("+15551234"),
            more_messages_to_send: true,
            ..Message::default()
        };
        let (_, octets) = msg.encode().unwrap();
        assert_eq!(octets[1] & 0b0000_0100, 0);
    }

    #[test]
    fn seven_bit_text_is_cut_to_the_septet_count() {
        // 7 septets pack into 7 octets, which unpack into 8 septets; without
        // the UDL trim the decoded text would grow a trailing '@'.
        let msg = Message {
            message_type: MessageType::Deliver,
            address: addr("+15551234"),
            text: "ABCDEFG".into(),
            ..Message::default()
        };
        let (_, octets) = msg.encode().unwrap();
        let (_, decoded) = Message::decode(&octets).unwrap();
        assert_eq!(decoded.text, "ABCDEFG");
    }

    #[test]
    fn address_length_counts_digits_not_octets() {
        let bytes = addr("+21436587090").as_bytes_tp();
        assert_eq!(bytes[0], 11);
        assert_eq!(bytes[1], 0x91);
        assert_eq!(&bytes[2..], &[0x12, 0x34, 0x56, 0x78, 0x90, 0xF0]);

        let smsc = addr("+21436587090").as_bytes_smsc();
        assert_eq!(smsc[0], 7);
        assert_eq!(&smsc[1..], &bytes[1..]);
    }

    #[test]
    fn address_round_trips_through_wire_form() {
        for number in ["+15551234", "15551234", "*21#", "+447700900123"] {
            let a = addr(number);
            let bytes = a.as_bytes_tp();
            let parsed = PduAddress::try_from(&bytes[..]).unwrap();
            assert_eq!(parsed, a, "number = {}", number);
            assert_eq!(parsed.to_string(), number);
        }
    }

    #[test]
    fn alphanumeric_sender_decodes_as_text() {
        // TOA 0xD0: alphanumeric, packed GSM 7-bit. Length is in nibbles.
        let bytes = [0x04, 0xD0, 0xC8, 0x34];
        let a = PduAddress::try_from(&bytes[..]).unwrap();
        assert_eq!(a.type_addr.type_of_number, TypeOfNumber::Gsm);
        assert_eq!(a.to_string(), "Hi");
    }

    #[test]
    fn timestamp_round_trips_with_signed_timezones() {
        for tz in [-48i8, -11, -1, 0, 1, 11, 48] {
            let ts = Timestamp { timezone: tz, ..scts() };
            let bytes = ts.as_bytes();
            assert_eq!(Timestamp::try_from(&bytes[..]).unwrap(), ts, "tz = {}", tz);
        }
    }

    #[test]
    fn timestamp_negative_timezone_sets_the_sign_nibble_bit() {
        let ts = Timestamp { timezone: -48, ..scts() };
        assert_eq!(ts.as_bytes()[6], 0x8C);
        let ts = Timestamp { timezone: 11, ..scts() };
        assert_eq!(ts.as_bytes()[6], 0x11);
    }

    #[test]
    fn validity_period_piecewise_scale() {
        let cases: [(u8, u64); 8] = [
            (0, 5 * MINUTE),
            (1, 10 * MINUTE),
            (143, 12 * HOUR),
            (144, 12 * HOUR + 30 * MINUTE),
            (167, 24 * HOUR),
            (168, 2 * DAY),
            (196, 30 * DAY),
            (197, 5 * WEEK),
        ];
        for (octet, secs) in cases {
            assert_eq!(ValidityPeriod::from_octet(octet).0, Duration::from_secs(secs));
        }
    }

    #[test]
    fn validity_period_octet_round_trips() {
        for v in 0..=255u8 {
            assert_eq!(ValidityPeriod::from_octet(v).octet(), v, "octet = {}", v);
        }
    }

    #[test]
    fn message_status_classification() {
        assert!(MessageStatus::ReceivedBySme.is_success());
        assert!(MessageStatus::SmeBusy.is_temporary_error());
        assert!(MessageStatus::SmValidityPeriodExpired.is_permanent_error());
        assert_eq!(MessageStatus::from_u8(0x1C), None);
    }
}
