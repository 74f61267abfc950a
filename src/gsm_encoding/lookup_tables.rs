//! The GSM 03.38 default alphabet and its single extension table.
use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Septet value that escapes into the extension table.
pub(crate) const ESCAPE: u8 = 0x1B;

/// The default alphabet: septet value -> character. Index 0x1B is the escape
/// and never decodes to a character on its own.
pub(crate) const GSM_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\x1b', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

/// Extension table, reached via [`ESCAPE`]: septet value -> character.
pub(crate) const GSM_EXTENSION: &[(u8, char)] = &[
    (0x0A, '\x0C'),
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];

/// Reverse lookup for encoding, built once at first use.
pub(crate) static GSM_SEPTETS_BY_CHAR: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    GSM_ALPHABET
        .iter()
        .enumerate()
        .filter(|&(value, _)| value != ESCAPE as usize)
        .map(|(value, &ch)| (ch, value as u8))
        .collect()
});

/// Reverse extension lookup for encoding.
pub(crate) static GSM_EXTENSION_BY_CHAR: Lazy<HashMap<char, u8>> =
    Lazy::new(|| GSM_EXTENSION.iter().map(|&(value, ch)| (ch, value)).collect());
