//! Human-facing order tracking codes.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

const LETTERS: usize = 4;
const DIGITS: usize = 4;

/// Four uppercase ASCII letters followed by four digits, e.g. `QWER1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackingCode(String);

/// Tracking Code Parse Error
#[derive(Debug, Error, PartialEq, Eq)]
#[error("tracking codes are four letters A-Z followed by four digits")]
pub struct InvalidTrackingCode;

impl TrackingCode {
    /// Draw a fresh code. Uniqueness is enforced by storage, not here.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code: String = (0..LETTERS)
            .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
            .collect();
        code.extend((0..DIGITS).map(|_| char::from(rng.gen_range(b'0'..=b'9'))));

        Self(code)
    }

    /// [`TrackingCode::generate`] with the thread-local generator.
    #[must_use]
    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TrackingCode {
    type Err = InvalidTrackingCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let bytes = value.as_bytes();

        let well_formed = bytes.len() == LETTERS + DIGITS
            && bytes.iter().take(LETTERS).all(u8::is_ascii_uppercase)
            && bytes.iter().skip(LETTERS).all(u8::is_ascii_digit);

        if well_formed {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidTrackingCode)
        }
    }
}

impl Serialize for TrackingCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TrackingCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn generated_codes_match_the_format() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let code = TrackingCode::generate(&mut rng);

            assert_eq!(
                code.as_str().parse::<TrackingCode>(),
                Ok(code.clone()),
                "{code} should be well formed"
            );
        }
    }

    #[test]
    fn rejects_malformed_codes() {
        for bad in ["ABC1234", "ABCD123", "abcd1234", "1234ABCD", "ABCD12345", "ABÇD1234"] {
            assert!(bad.parse::<TrackingCode>().is_err(), "{bad} should be rejected");
        }
    }
}
