//! Composite key encoding for the mapping table.

use crate::error::Error;

/// Maximum byte length of one key part.
pub const MAX_PART_LEN: usize = u16::MAX as usize;

/// The composite key of one identifier mapping.
///
/// Key format: three parts, each as `[len (u16, big-endian)][bytes]`, in
/// the order `job_id`, `object`, `source_id`. Length prefixes keep distinct
/// part boundaries unambiguous, and keys for one job share a byte prefix,
/// so prefix scans group mappings by job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingKey {
    /// Job identifier.
    pub job_id: String,
    /// Object type name.
    pub object: String,
    /// Source-system identifier.
    pub source_id: String,
}

impl MappingKey {
    /// Create a new composite key.
    pub fn new(
        job_id: impl Into<String>,
        object: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            object: object.into(),
            source_id: source_id.into(),
        }
    }

    /// Encode the key to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::with_capacity(6 + self.job_id.len() + self.object.len() + self.source_id.len());
        push_part(&mut buf, &self.job_id)?;
        push_part(&mut buf, &self.object)?;
        push_part(&mut buf, &self.source_id)?;
        Ok(buf)
    }

    /// Decode a key from bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let mut pos = 0;
        let job_id = read_part(bytes, &mut pos)?;
        let object = read_part(bytes, &mut pos)?;
        let source_id = read_part(bytes, &mut pos)?;
        if pos != bytes.len() {
            return None;
        }
        Some(Self {
            job_id,
            object,
            source_id,
        })
    }

    /// Get the prefix for scanning all mappings of a job.
    pub fn job_prefix(job_id: &str) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::with_capacity(2 + job_id.len());
        push_part(&mut buf, job_id)?;
        Ok(buf)
    }
}

fn push_part(buf: &mut Vec<u8>, part: &str) -> Result<(), Error> {
    let len = u16::try_from(part.len()).map_err(|_| Error::InvalidKey)?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(part.as_bytes());
    Ok(())
}

fn read_part(bytes: &[u8], pos: &mut usize) -> Option<String> {
    let end = pos.checked_add(2)?;
    let len_bytes: [u8; 2] = bytes.get(*pos..end)?.try_into().ok()?;
    let len = u16::from_be_bytes(len_bytes) as usize;
    let part_end = end.checked_add(len)?;
    let part = std::str::from_utf8(bytes.get(end..part_end)?).ok()?;
    *pos = part_end;
    Some(part.to_string())
}
