use crate::codec::CodecError;
use base64::{
    Engine as _, alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD,
    },
};

// Standard alphabet, padding optional. URL-safe input is mapped onto it
// before decoding.
const TOLERANT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode standard or URL-safe base64, padded or not.
pub(crate) fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let normalized: String = text
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    TOLERANT
        .decode(normalized)
        .map_err(|_| CodecError::InvalidBase64(text.to_string()))
}

/// Standard alphabet with padding.
pub(crate) fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_both_alphabets_with_and_without_padding() {
        for input in ["+/A=", "-_A=", "+/A", "-_A"] {
            assert_eq!(decode(input).unwrap(), vec![0xFB, 0xF0], "input {input}");
        }
        assert_eq!(encode(&[0xFB, 0xF0]), "+/A=");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            decode("not base64!"),
            Err(CodecError::InvalidBase64("not base64!".into()))
        );
    }

    proptest! {
        #[test]
        fn url_safe_unpadded_decodes_like_standard(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let standard = encode(&bytes);
            let url_safe = standard.replace('+', "-").replace('/', "_");
            let unpadded = url_safe.trim_end_matches('=');

            prop_assert_eq!(decode(&standard).unwrap(), bytes.clone());
            prop_assert_eq!(decode(unpadded).unwrap(), bytes);
        }
    }
}
