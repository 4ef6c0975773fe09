use flate2::read::GzDecoder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::Path;

/// Truncate `value` toward zero at `decimals` places. Never rounds up.
pub fn floor_decimal(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
}

/// Lossy conversion for the probability vectors, which only carry estimates.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Read a file into memory, gunzipping it first if it ends in `.gz`.
pub fn read_source(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();

    if path.extension().map_or(false, |ext| ext == "gz") {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        file.read_to_end(&mut bytes)?;
    }

    Ok(bytes)
}

/// Decode report text. Count reports are usually ISO-8859-1, so anything
/// that is not valid UTF-8 is mapped byte-for-byte into Latin-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Hex SHA-1 of the raw source bytes.
pub fn digest(bytes: &[u8]) -> String {
    let hash = Sha1::digest(bytes);
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn write_serialized<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn floor_truncates_instead_of_rounding() {
        assert_eq!(floor_decimal(dec!(0.999999), 5), dec!(0.99999));
        assert_eq!(floor_decimal(dec!(1.0000099999), 5), dec!(1.00000));
        assert_eq!(floor_decimal(dec!(-1.234567), 5), dec!(-1.23456));
    }

    #[test]
    fn floor_keeps_short_values() {
        assert_eq!(floor_decimal(dec!(0.5), 5), dec!(0.5));
        assert_eq!(floor_decimal(dec!(3), 0), dec!(3));
    }

    #[test]
    fn latin1_fallback() {
        // "frá" in ISO-8859-1
        let bytes = vec![b'f', b'r', 0xE1];
        assert_eq!(decode_text(bytes), "frá");
        assert_eq!(decode_text("KJÖRI".as_bytes().to_vec()), "KJÖRI");
    }

    #[test]
    fn digest_is_hex_sha1() {
        assert_eq!(digest(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
