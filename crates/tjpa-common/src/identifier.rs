//! CNJ process identifiers
//!
//! A canonical identifier is the 20-digit numeral
//! `NNNNNNN DD AAAA J TR OOOO`: the zero-padded sequential number, two check
//! digits, the filing year, the court segment and the jurisdiction code.
//!
//! Check digits follow ISO 7064 MOD 97-10 over the identifier body with the
//! check digits removed:
//!
//! ```text
//! remainder = body mod 97
//! check     = 98 - ((remainder * 100) mod 97)
//! ```
//!
//! The remainder is accumulated digit by digit so the body never needs to fit
//! in a machine integer.

use crate::error::{Result, TjpaError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifier Constants
// ============================================================================

/// Court segment for the Pará state court: justice branch `8`, tribunal `14`.
pub const COURT_SEGMENT: &str = "814";

/// Width of the zero-padded sequential number.
pub const SEQUENCE_WIDTH: usize = 7;

/// Largest sequential number that fits in [`SEQUENCE_WIDTH`] digits.
pub const MAX_SEQUENCE: u32 = 9_999_999;

/// Width of the filing year.
pub const YEAR_WIDTH: usize = 4;

/// Width of the jurisdiction (comarca) code.
pub const JURISDICTION_WIDTH: usize = 4;

/// Number of digits in a canonical identifier.
pub const IDENTIFIER_WIDTH: usize = SEQUENCE_WIDTH + 2 + YEAR_WIDTH + 3 + JURISDICTION_WIDTH;

/// Year, court segment and jurisdiction shared by every identifier of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContext")]
pub struct JurisdictionContext {
    year: String,
    jurisdiction_code: String,
}

/// Unchecked field layout, validated by [`JurisdictionContext::new`] on deserialize.
#[derive(Deserialize)]
struct RawContext {
    year: String,
    jurisdiction_code: String,
}

impl TryFrom<RawContext> for JurisdictionContext {
    type Error = TjpaError;

    fn try_from(raw: RawContext) -> Result<Self> {
        Self::new(raw.year, raw.jurisdiction_code)
    }
}

impl JurisdictionContext {
    /// Build a context, rejecting anything that is not a fixed-width digit string.
    pub fn new(year: impl Into<String>, jurisdiction_code: impl Into<String>) -> Result<Self> {
        let year = year.into();
        let jurisdiction_code = jurisdiction_code.into();

        if !is_digits(&year, YEAR_WIDTH) {
            return Err(TjpaError::config(format!(
                "year must be {} digits, got {:?}",
                YEAR_WIDTH, year
            )));
        }
        if !is_digits(&jurisdiction_code, JURISDICTION_WIDTH) {
            return Err(TjpaError::config(format!(
                "jurisdiction code must be {} digits, got {:?}",
                JURISDICTION_WIDTH, jurisdiction_code
            )));
        }

        Ok(Self {
            year,
            jurisdiction_code,
        })
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn court_segment(&self) -> &'static str {
        COURT_SEGMENT
    }

    pub fn jurisdiction_code(&self) -> &str {
        &self.jurisdiction_code
    }
}

/// The two check digits of an identifier, always in `01..=98`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckDigits(u8);

impl CheckDigits {
    /// Compute the check digits for `seq` within `ctx`.
    ///
    /// # Panics
    ///
    /// Panics if `seq` exceeds [`MAX_SEQUENCE`].
    pub fn compute(seq: u32, ctx: &JurisdictionContext) -> Self {
        let seq = pad_sequence(seq);
        Self::from_body(&[
            seq.as_str(),
            ctx.year(),
            ctx.court_segment(),
            ctx.jurisdiction_code(),
        ])
    }

    fn from_body(parts: &[&str]) -> Self {
        let remainder = mod97(parts);
        let value = 98 - (remainder * 100) % 97;
        // Holds for every remainder in 0..97; anything else is an arithmetic bug.
        assert!(
            (1..=98).contains(&value),
            "check value {value} out of range for remainder {remainder}"
        );
        Self(value as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for CheckDigits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// A 20-digit process identifier without separators, as the provider expects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalIdentifier(String);

impl CanonicalIdentifier {
    /// Assemble the identifier for `seq` within `ctx`.
    ///
    /// # Panics
    ///
    /// Panics if `seq` exceeds [`MAX_SEQUENCE`].
    pub fn assemble(seq: u32, ctx: &JurisdictionContext) -> Self {
        let check = CheckDigits::compute(seq, ctx);
        Self(format!(
            "{}{}{}{}{}",
            pad_sequence(seq),
            check,
            ctx.year(),
            ctx.court_segment(),
            ctx.jurisdiction_code()
        ))
    }

    /// Parse a bare or formatted identifier and verify its check digits.
    ///
    /// Accepts `08188005320238140040` as well as `0818800-53.2023.8.14.0040`.
    pub fn parse(input: &str) -> Result<Self> {
        let digits: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '.'))
            .collect();

        if !is_digits(&digits, IDENTIFIER_WIDTH) {
            return Err(TjpaError::invalid_identifier(format!(
                "{:?} is not a {}-digit CNJ number",
                input, IDENTIFIER_WIDTH
            )));
        }

        let candidate = Self(digits);
        let expected = CheckDigits::from_body(&[
            candidate.sequence_digits(),
            candidate.year(),
            &candidate.0[13..16],
            candidate.jurisdiction_code(),
        ]);
        if candidate.check_digits() != expected.to_string() {
            return Err(TjpaError::invalid_identifier(format!(
                "{:?} has check digits {}, expected {}",
                input,
                candidate.check_digits(),
                expected
            )));
        }

        Ok(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The sequential number encoded in the first seven digits.
    pub fn sequence(&self) -> u32 {
        // Digits are validated on construction, so this never falls back.
        self.sequence_digits().parse().unwrap_or_default()
    }

    pub fn check_digits(&self) -> &str {
        &self.0[7..9]
    }

    pub fn year(&self) -> &str {
        &self.0[9..13]
    }

    pub fn jurisdiction_code(&self) -> &str {
        &self.0[16..20]
    }

    /// Display form `NNNNNNN-DD.AAAA.J.TR.OOOO`.
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!(
            "{}-{}.{}.{}.{}.{}",
            &d[0..7],
            &d[7..9],
            &d[9..13],
            &d[13..14],
            &d[14..16],
            &d[16..20]
        )
    }

    fn sequence_digits(&self) -> &str {
        &self.0[0..SEQUENCE_WIDTH]
    }
}

impl fmt::Display for CanonicalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CanonicalIdentifier {
    type Err = TjpaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CanonicalIdentifier {
    type Error = TjpaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CanonicalIdentifier> for String {
    fn from(id: CanonicalIdentifier) -> Self {
        id.0
    }
}

fn pad_sequence(seq: u32) -> String {
    assert!(
        seq <= MAX_SEQUENCE,
        "sequential number {seq} does not fit in {SEQUENCE_WIDTH} digits"
    );
    format!("{:0width$}", seq, width = SEQUENCE_WIDTH)
}

fn mod97(parts: &[&str]) -> u32 {
    parts
        .iter()
        .flat_map(|part| part.bytes())
        .fold(0, |acc, b| (acc * 10 + u32::from(b - b'0')) % 97)
}

fn is_digits(s: &str, width: usize) -> bool {
    s.len() == width && s.bytes().all(|b| b.is_ascii_digit())
}
