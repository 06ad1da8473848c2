//! Canonical record encoding for hashing.
//!
//! The encoding is byte-exact and order-preserving: the same logical
//! fields always produce identical bytes, independent of the in-memory
//! representation.  Variable-length strings are u32-LE length-prefixed,
//! so no two distinct field tuples can concatenate to the same byte
//! sequence.
//!
//! Field layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. event_id as 16 raw UUID bytes
//!   3. identity: u32-LE byte length, then UTF-8 bytes
//!   4. old_score as 1 byte
//!   5. new_score as 1 byte
//!   6. attack_type: u32-LE byte length, then UTF-8 bytes
//!   7. malicious as 1 byte (0 or 1)
//!   8. timestamp as 8-byte little-endian milliseconds since epoch
//!
//! `previous_hash` and `hash` are deliberately excluded — the chain
//! linker binds the encoding to the previous hash separately, and the
//! hash itself is the output.

use chrono::TimeZone;
use uuid::Uuid;

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    record::{LedgerRecord, MAX_SCORE},
};

/// Encode the hashed fields of `record` into canonical bytes.
///
/// Rejects records that violate the field contract before any bytes are
/// produced: empty identity, empty attack type, or a score above
/// `MAX_SCORE` all yield `LedgerError::Validation`.
pub fn encode_record(record: &LedgerRecord) -> LedgerResult<Vec<u8>> {
    if record.identity.is_empty() {
        return Err(LedgerError::Validation {
            reason: "identity must not be empty".to_string(),
        });
    }
    if record.attack_type.is_empty() {
        return Err(LedgerError::Validation {
            reason: "attack_type must not be empty".to_string(),
        });
    }
    if record.old_score > MAX_SCORE || record.new_score > MAX_SCORE {
        return Err(LedgerError::Validation {
            reason: format!(
                "score out of range: old={} new={} (max {})",
                record.old_score, record.new_score, MAX_SCORE
            ),
        });
    }

    let identity = record.identity.as_bytes();
    let attack_type = record.attack_type.as_bytes();

    let mut out = Vec::with_capacity(8 + 16 + 4 + identity.len() + 2 + 4 + attack_type.len() + 1 + 8);
    out.extend_from_slice(&record.sequence.to_le_bytes());
    out.extend_from_slice(record.event_id.as_bytes());
    out.extend_from_slice(&(identity.len() as u32).to_le_bytes());
    out.extend_from_slice(identity);
    out.push(record.old_score);
    out.push(record.new_score);
    out.extend_from_slice(&(attack_type.len() as u32).to_le_bytes());
    out.extend_from_slice(attack_type);
    out.push(u8::from(record.malicious));
    out.extend_from_slice(&record.timestamp.timestamp_millis().to_le_bytes());

    Ok(out)
}

/// Decode canonical bytes back into the hashed fields.
///
/// The inverse of `encode_record` over the fields it covers:
/// `previous_hash` and `hash` are left empty for the caller to fill.
/// Returns `LedgerError::Validation` on truncated or trailing input.
pub fn decode_record(bytes: &[u8]) -> LedgerResult<LedgerRecord> {
    let mut cursor = Cursor { bytes, pos: 0 };

    let sequence = u64::from_le_bytes(cursor.take_array::<8>("sequence")?);
    let event_id = Uuid::from_bytes(cursor.take_array::<16>("event_id")?);
    let identity = cursor.take_string("identity")?;
    let old_score = cursor.take_byte("old_score")?;
    let new_score = cursor.take_byte("new_score")?;
    let attack_type = cursor.take_string("attack_type")?;
    let malicious = match cursor.take_byte("malicious")? {
        0 => false,
        1 => true,
        other => {
            return Err(LedgerError::Validation {
                reason: format!("malicious flag must be 0 or 1, got {}", other),
            })
        }
    };
    let millis = i64::from_le_bytes(cursor.take_array::<8>("timestamp")?);

    if cursor.pos != bytes.len() {
        return Err(LedgerError::Validation {
            reason: format!("{} trailing bytes after record", bytes.len() - cursor.pos),
        });
    }

    let timestamp = chrono::Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| LedgerError::Validation {
            reason: format!("timestamp {} ms out of range", millis),
        })?;

    Ok(LedgerRecord {
        sequence,
        event_id,
        identity,
        old_score,
        new_score,
        attack_type,
        malicious,
        timestamp,
        previous_hash: String::new(),
        hash: String::new(),
    })
}

/// Bounds-checked reader over the canonical byte stream.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn take_array<const N: usize>(&mut self, field: &str) -> LedgerResult<[u8; N]> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| {
            LedgerError::Validation {
                reason: format!("truncated record: missing {}", field),
            }
        })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_byte(&mut self, field: &str) -> LedgerResult<u8> {
        Ok(self.take_array::<1>(field)?[0])
    }

    fn take_string(&mut self, field: &str) -> LedgerResult<String> {
        let len = u32::from_le_bytes(self.take_array::<4>(field)?) as usize;
        let end = self.pos + len;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| {
            LedgerError::Validation {
                reason: format!("truncated record: short {}", field),
            }
        })?;
        self.pos = end;
        String::from_utf8(slice.to_vec()).map_err(|_| LedgerError::Validation {
            reason: format!("{} is not valid UTF-8", field),
        })
    }
}
