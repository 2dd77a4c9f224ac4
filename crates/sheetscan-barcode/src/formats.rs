//! Interleaved 2 of 5 symbol decoding
//!
//! Reference: <http://en.wikipedia.org/wiki/Interleaved_2_of_5>
//!
//! The format always encodes an even number of digits. Digits are taken
//! pairwise: the first digit of a pair lives in the five bars, the second
//! in the five interleaved spaces. The start code is four narrow
//! elements; the stop code is wide-narrow-narrow.

use crate::error::{BarcodeError, BarcodeResult};

/// Element patterns for digits 0-9 (1 = narrow, 2 = wide).
const I2OF5_DIGITS: [[u8; 5]; 10] = [
    [1, 1, 2, 2, 1], // 0
    [2, 1, 1, 1, 2], // 1
    [1, 2, 1, 1, 2], // 2
    [2, 2, 1, 1, 1], // 3
    [1, 1, 2, 1, 2], // 4
    [2, 1, 2, 1, 1], // 5
    [1, 2, 2, 1, 1], // 6
    [1, 1, 1, 2, 2], // 7
    [2, 1, 1, 2, 1], // 8
    [1, 2, 1, 2, 1], // 9
];

const START: [u8; 4] = [1, 1, 1, 1];
const STOP: [u8; 3] = [2, 1, 1];

/// Outcome of format verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatVerification {
    /// Whether the width sequence matches the format framing
    pub valid: bool,
    /// Whether it matches only after reversal (upside-down scan)
    pub reversed: bool,
}

/// Check whether a width sequence carries Interleaved 2 of 5 framing,
/// in either reading direction.
pub fn verify_i2of5(widths: &[u8]) -> FormatVerification {
    let len = widths.len();
    if len < 17 {
        return FormatVerification {
            valid: false,
            reversed: false,
        };
    }

    let forward = widths[..4] == START && widths[len - 3..] == STOP;
    if forward {
        return FormatVerification {
            valid: true,
            reversed: false,
        };
    }

    let reversed: Vec<u8> = widths.iter().rev().copied().collect();
    let backward = reversed[..4] == START && reversed[len - 3..] == STOP;
    FormatVerification {
        valid: backward,
        reversed: backward,
    }
}

fn digit_for(pattern: &[u8; 5]) -> Option<u8> {
    I2OF5_DIGITS.iter().position(|p| p == pattern).map(|d| d as u8)
}

/// Decode an Interleaved 2 of 5 width sequence to its digit string.
pub fn decode_i2of5(widths: &[u8]) -> BarcodeResult<String> {
    let verification = verify_i2of5(widths);
    if !verification.valid {
        return Err(BarcodeError::Format(
            "widths not in Interleaved 2 of 5 framing".to_string(),
        ));
    }

    let oriented: Vec<u8> = if verification.reversed {
        widths.iter().rev().copied().collect()
    } else {
        widths.to_vec()
    };

    let len = oriented.len();
    if (len - 7) % 10 != 0 {
        return Err(BarcodeError::Format(format!(
            "element count {len} not 7 + 10n"
        )));
    }

    let npairs = (len - 7) / 10;
    let mut digits = String::with_capacity(2 * npairs);
    for i in 0..npairs {
        let base = 4 + 10 * i;
        let mut bars = [0u8; 5];
        let mut spaces = [0u8; 5];
        for j in 0..5 {
            bars[j] = oriented[base + 2 * j];
            spaces[j] = oriented[base + 2 * j + 1];
        }

        let first = digit_for(&bars).ok_or_else(|| {
            BarcodeError::Format(format!("unrecognized bar pattern {bars:?} in pair {i}"))
        })?;
        let second = digit_for(&spaces).ok_or_else(|| {
            BarcodeError::Format(format!("unrecognized space pattern {spaces:?} in pair {i}"))
        })?;
        digits.push(char::from(b'0' + first));
        digits.push(char::from(b'0' + second));
    }

    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Element widths for the digit string "07", built by hand:
    /// start, interleaved bars of 0 with spaces of 7, stop.
    fn widths_07() -> Vec<u8> {
        let mut w = vec![1, 1, 1, 1];
        let bars = I2OF5_DIGITS[0];
        let spaces = I2OF5_DIGITS[7];
        for j in 0..5 {
            w.push(bars[j]);
            w.push(spaces[j]);
        }
        w.extend_from_slice(&[2, 1, 1]);
        w
    }

    #[test]
    fn test_verify_forward() {
        let v = verify_i2of5(&widths_07());
        assert!(v.valid && !v.reversed);
    }

    #[test]
    fn test_verify_reversed() {
        let reversed: Vec<u8> = widths_07().into_iter().rev().collect();
        let v = verify_i2of5(&reversed);
        assert!(v.valid && v.reversed);
    }

    #[test]
    fn test_decode_pair() {
        assert_eq!(decode_i2of5(&widths_07()).unwrap(), "07");
    }

    #[test]
    fn test_decode_reversed() {
        let reversed: Vec<u8> = widths_07().into_iter().rev().collect();
        assert_eq!(decode_i2of5(&reversed).unwrap(), "07");
    }

    #[test]
    fn test_decode_rejects_bad_framing() {
        let mut w = widths_07();
        w[0] = 2;
        assert!(matches!(decode_i2of5(&w), Err(BarcodeError::Format(_))));
    }

    #[test]
    fn test_decode_rejects_corrupt_pattern() {
        let mut w = widths_07();
        // Make the first pair's bar pattern all-wide: not a digit
        for j in 0..5 {
            w[4 + 2 * j] = 2;
        }
        assert!(matches!(decode_i2of5(&w), Err(BarcodeError::Format(_))));
    }
}
