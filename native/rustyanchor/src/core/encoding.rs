//! Input Encoding Detection and Conversion
//!
//! Documents arrive as raw bytes. UTF-16 is detected from the byte order mark
//! or from the `<\0` / `\0<` pattern of a leading tag, and everything is
//! converted to a UTF-8 `String` before the reader sees it.

use crate::error::ParseError;

/// Detected encoding of document input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl InputEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return InputEncoding::Utf8;
        }

        match (input[0], input[1]) {
            (0xFF, 0xFE) => InputEncoding::Utf16Le,
            (0xFE, 0xFF) => InputEncoding::Utf16Be,
            (0x00, b'<') => InputEncoding::Utf16Be,
            (b'<', 0x00) => InputEncoding::Utf16Le,
            _ => InputEncoding::Utf8,
        }
    }

    fn label(self) -> &'static str {
        match self {
            InputEncoding::Utf8 => "UTF-8",
            InputEncoding::Utf16Le => "UTF-16 LE",
            InputEncoding::Utf16Be => "UTF-16 BE",
        }
    }
}

/// Decode raw document bytes into UTF-8 text
pub fn decode_to_string(input: Vec<u8>) -> Result<String, ParseError> {
    let encoding = InputEncoding::detect(&input);

    match encoding {
        InputEncoding::Utf8 => {
            let bytes = if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
                input[3..].to_vec()
            } else {
                input
            };
            String::from_utf8(bytes).map_err(|e| ParseError::Encoding {
                encoding: encoding.label(),
                message: e.to_string(),
            })
        }
        InputEncoding::Utf16Le => decode_utf16(&input, encoding, [0xFF, 0xFE], u16::from_le_bytes),
        InputEncoding::Utf16Be => decode_utf16(&input, encoding, [0xFE, 0xFF], u16::from_be_bytes),
    }
}

fn decode_utf16(
    input: &[u8],
    encoding: InputEncoding,
    bom: [u8; 2],
    unit: fn([u8; 2]) -> u16,
) -> Result<String, ParseError> {
    let bytes = input.strip_prefix(&bom).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(ParseError::Encoding {
            encoding: encoding.label(),
            message: "odd number of bytes".to_string(),
        });
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units).map_err(|e| ParseError::Encoding {
        encoding: encoding.label(),
        message: e.to_string(),
    })
}
