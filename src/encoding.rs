use encoding_rs::{Encoding, BIG5, GB18030, UTF_8};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("input does not decode as any of: {0}")]
    Undetected(String),
}

/// Encodings tried when the input carries no byte order mark, in order.
fn candidates() -> [&'static Encoding; 3] {
    [UTF_8, GB18030, BIG5]
}

/// Finds the first supported encoding that decodes `bytes` without errors.
///
/// A UTF-8 or UTF-16 byte order mark is trusted when the rest of the input
/// decodes cleanly under it.
pub fn identify_encoding(bytes: &[u8]) -> Result<&'static Encoding, EncodingError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        if encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .is_some()
        {
            return Ok(encoding);
        }
    }

    candidates()
        .into_iter()
        .find(|encoding| {
            encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .is_some()
        })
        .ok_or_else(|| {
            let tried: Vec<&str> = std::iter::once("UTF-16")
                .chain(candidates().iter().map(|e| e.name()))
                .collect();
            EncodingError::Undetected(tried.join(", "))
        })
}

/// Decodes raw input to text. Detection failure is reported and the bytes
/// are decoded as lossy UTF-8 so the run can continue.
pub fn decode_input(bytes: &[u8]) -> String {
    match identify_encoding(bytes) {
        Ok(encoding) => {
            info!(
                action = "detect",
                component = "encoding",
                encoding = encoding.name(),
                "Input encoding identified"
            );
            let (text, _, _) = encoding.decode(bytes);
            text.into_owned()
        }
        Err(e) => {
            warn!(action = "detect", component = "encoding", error = %e, "Falling back to lossy UTF-8");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
