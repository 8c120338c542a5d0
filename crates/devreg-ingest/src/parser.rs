//! Record parser
//!
//! Turns one raw upload line into a [`Device`]. The split is a plain comma
//! split with no quoting rules and no trimming, so `" d2"` keeps its leading
//! space.

use crate::device::Device;
use crate::error::RecordRejected;

/// Field delimiter of the upload format
pub const FIELD_DELIMITER: char = ',';

/// Minimum number of positional fields a line must carry
pub const MIN_FIELDS: usize = 10;

/// Largest price the store can hold (Postgres `BIGINT`)
pub const MAX_PRICE: u64 = i64::MAX as u64;

/// Decode a raw upload line and parse it into a device
///
/// A line that is not valid UTF-8 is rejected on its own; neighbouring lines
/// are unaffected.
pub fn parse_line(raw: &[u8]) -> Result<Device, RecordRejected> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| RecordRejected::InvalidEncoding { offset: e.valid_up_to() })?;
    parse_record(line)
}

/// Parse a text line into a device
///
/// Fields beyond the tenth are ignored. The price (field 9) is parsed as an
/// unsigned integer and silently falls back to 0 when it does not parse or
/// exceeds [`MAX_PRICE`]; garbage prices are accepted rather than rejected.
pub fn parse_record(line: &str) -> Result<Device, RecordRejected> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();

    if fields.len() < MIN_FIELDS {
        return Err(RecordRejected::TooFewFields {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }

    Ok(Device {
        device_name: fields[0].to_string(),
        device_type: fields[1].to_string(),
        brand: fields[2].to_string(),
        model: fields[3].to_string(),
        os: fields[4].to_string(),
        os_version: fields[5].to_string(),
        purchase_date: fields[6].to_string(),
        warranty_end: fields[7].to_string(),
        status: fields[8].to_string(),
        price: parse_price(fields[9]),
    })
}

fn parse_price(raw: &str) -> u64 {
    match raw.parse::<u64>() {
        Ok(price) if price <= MAX_PRICE => price,
        Ok(_) => {
            tracing::debug!(raw = %raw, "Price exceeds storable range, using 0");
            0
        },
        Err(e) => {
            tracing::debug!(raw = %raw, error = %e, "Price is not an unsigned integer, using 0");
            0
        },
    }
}
