//! Decoding text files of unknown encoding.
//!
//! Spreadsheet exports arrive in whatever encoding the exporting machine
//! used. The encoding is taken from a byte order mark when there is one and
//! guessed otherwise; if the bytes are not valid in that encoding, a fixed
//! list of fallbacks is tried in order.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Decodes bytes using a detected encoding and a list of fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDecoder {
    fallbacks: Vec<&'static Encoding>,
    assumed: Option<&'static Encoding>,
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self::new(vec![UTF_8, WINDOWS_1252])
    }
}

impl TextDecoder {
    /// Creates a decoder with the given fallback encodings.
    #[must_use]
    pub const fn new(fallbacks: Vec<&'static Encoding>) -> Self {
        Self {
            fallbacks,
            assumed: None,
        }
    }

    /// Try `encoding` first instead of guessing.
    ///
    /// A byte order mark still takes precedence.
    #[must_use]
    pub const fn assuming(mut self, encoding: &'static Encoding) -> Self {
        self.assumed = Some(encoding);
        self
    }

    /// Creates a decoder from WHATWG encoding labels.
    ///
    /// Unknown labels are logged and skipped.
    #[must_use]
    pub fn from_labels(labels: &[String]) -> Self {
        let fallbacks = labels
            .iter()
            .filter_map(|label| {
                let encoding = Encoding::for_label(label.trim().as_bytes());
                if encoding.is_none() {
                    tracing::warn!("Ignoring unknown fallback encoding '{label}'");
                }
                encoding
            })
            .collect();
        Self::new(fallbacks)
    }

    /// The fallback encodings, in the order they are tried.
    #[must_use]
    pub fn fallbacks(&self) -> &[&'static Encoding] {
        &self.fallbacks
    }

    /// Guess the encoding of `bytes`.
    ///
    /// Returns the encoding and the length of any byte order mark.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> (&'static Encoding, usize) {
        if let Some(found) = Encoding::for_bom(bytes) {
            return found;
        }

        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, true);
        (detector.guess(None, true), 0)
    }

    /// Decode `bytes`, detecting the encoding first.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if neither the detected encoding nor any
    /// fallback decodes the bytes without errors.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
            return self.decode_with(&bytes[bom_length..], encoding);
        }
        let primary = self.assumed.unwrap_or_else(|| Self::detect(bytes).0);
        self.decode_with(bytes, primary)
    }

    /// Decode `bytes` with `primary`, then with each fallback in turn.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if no encoding decodes the bytes cleanly.
    pub fn decode_with(
        &self,
        bytes: &[u8],
        primary: &'static Encoding,
    ) -> Result<String, DecodeError> {
        let mut tried = Vec::with_capacity(self.fallbacks.len() + 1);

        for encoding in std::iter::once(primary).chain(self.fallbacks.iter().copied()) {
            if tried.contains(&encoding.name()) {
                continue;
            }
            tried.push(encoding.name());

            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
            {
                if encoding != primary {
                    tracing::debug!(
                        "Decoded as {} after {} failed",
                        encoding.name(),
                        primary.name()
                    );
                }
                return Ok(text.into_owned());
            }

            tracing::debug!("Text is not valid {}", encoding.name());
        }

        Err(DecodeError {
            tried: tried.join(", "),
        })
    }
}

/// None of the candidate encodings could decode the text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("text could not be decoded as any of: {tried}")]
pub struct DecodeError {
    tried: String,
}

#[cfg(test)]
mod tests {
    use encoding_rs::{SHIFT_JIS, UTF_16LE};

    use super::*;

    #[test]
    fn utf8_is_decoded_directly() {
        let text = TextDecoder::default().decode("Item\nCafé\n".as_bytes()).unwrap();
        assert_eq!(text, "Item\nCafé\n");
    }

    #[test]
    fn bom_selects_encoding_and_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Item\n");
        assert_eq!(TextDecoder::default().decode(&bytes).unwrap(), "Item\n");

        let (encoding, bom) = TextDecoder::detect(&[0xFF, 0xFE, b'A', 0]);
        assert_eq!(encoding, UTF_16LE);
        assert_eq!(bom, 2);
    }

    #[test]
    fn falls_back_when_primary_fails() {
        // 0xE9 is 'é' in windows-1252 and invalid on its own in UTF-8.
        let bytes = b"Item\nCaf\xE9\n";
        let text = TextDecoder::default().decode_with(bytes, UTF_8).unwrap();
        assert_eq!(text, "Item\nCafé\n");
    }

    #[test]
    fn assumed_encoding_replaces_the_guess_but_not_a_bom() {
        let decoder = TextDecoder::new(vec![]).assuming(WINDOWS_1252);
        assert_eq!(decoder.decode(b"Caf\xE9").unwrap(), "Café");

        let utf8_with_bom = b"\xEF\xBB\xBFCaf\xC3\xA9";
        assert_eq!(decoder.decode(utf8_with_bom).unwrap(), "Café");
    }

    #[test]
    fn reports_every_encoding_tried() {
        let decoder = TextDecoder::new(vec![UTF_8]);
        let error = decoder.decode_with(b"\xE9\xE9\xFF", SHIFT_JIS).unwrap_err();
        assert_eq!(error.to_string(), "text could not be decoded as any of: Shift_JIS, UTF-8");
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let decoder =
            TextDecoder::from_labels(&["utf-8".to_string(), "klingon".to_string(), "latin1".to_string()]);
        assert_eq!(decoder.fallbacks(), &[UTF_8, WINDOWS_1252]);
    }
}
