//! Persistent job and identifier-mapping store.
//!
//! Two sled trees back the store: `job` holds one row per migration run and
//! `mapping` holds one append-only row per translated identifier, keyed by
//! the composite (job, object, source id). Rows are never updated or
//! deleted; duplicate writes are integrity violations, not upserts.

mod key;

pub use key::MappingKey;

use std::path::Path;

use rkyv::{Archive, Deserialize, Serialize};

use crate::error::Error;

/// Tree name for migration job rows.
const JOB_TREE: &str = "job";

/// Tree name for identifier mapping rows.
const MAPPING_TREE: &str = "mapping";

/// One migration run between a source and a destination endpoint.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct JobDetail {
    /// Unique job identifier.
    pub job_id: String,
    /// Source endpoint identifier.
    pub source: String,
    /// Destination endpoint identifier.
    pub destination: String,
    /// Creation timestamp in microseconds since Unix epoch.
    pub created_at: u64,
}

impl JobDetail {
    /// Serialize the job row to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a job row from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// One source-to-destination identifier translation.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct IdMapping {
    /// Owning job identifier.
    pub job_id: String,
    /// Object type name.
    pub object: String,
    /// Identifier the record had on the source system.
    pub source_id: String,
    /// Identifier assigned by the destination, set once the insert succeeds.
    pub destination_id: Option<String>,
}

impl IdMapping {
    /// Serialize the mapping row to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a mapping row from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// The persistent identifier-mapping store.
///
/// Writes are single-row atomic; duplicate detection rides on sled's
/// compare-and-swap, so at-most-once insertion holds even if a future
/// orchestrator runs jobs concurrently in one process.
pub struct MappingStore {
    /// The underlying sled database.
    db: sled::Db,

    /// Tree for job rows.
    jobs: sled::Tree,

    /// Tree for mapping rows.
    mappings: sled::Tree,
}

impl MappingStore {
    /// Open or create a mapping store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let db = sled::open(path)?;
        let jobs = db.open_tree(JOB_TREE)?;
        let mappings = db.open_tree(MAPPING_TREE)?;

        Ok(Self { db, jobs, mappings })
    }

    /// Record a new migration job.
    ///
    /// Fails with [`Error::DuplicateJob`] if the job already exists.
    pub fn record_job(&self, job_id: &str, source: &str, destination: &str) -> Result<(), Error> {
        let detail = JobDetail {
            job_id: job_id.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            created_at: current_timestamp(),
        };
        let value = detail.to_bytes()?;

        self.jobs
            .compare_and_swap(job_id.as_bytes(), None as Option<&[u8]>, Some(value))?
            .map_err(|_| Error::DuplicateJob(job_id.to_string()))?;

        Ok(())
    }

    /// Record one source-to-destination identifier translation.
    ///
    /// Fails with [`Error::UnknownJob`] if the job was never recorded and
    /// with [`Error::DuplicateMapping`] if this composite key was already
    /// written; callers must ensure at-most-once insertion per source
    /// record per job.
    pub fn record_mapping(
        &self,
        job_id: &str,
        object: &str,
        source_id: &str,
        destination_id: &str,
    ) -> Result<(), Error> {
        if self.jobs.get(job_id.as_bytes())?.is_none() {
            return Err(Error::UnknownJob(job_id.to_string()));
        }

        let mapping = IdMapping {
            job_id: job_id.to_string(),
            object: object.to_string(),
            source_id: source_id.to_string(),
            destination_id: Some(destination_id.to_string()),
        };
        let key = MappingKey::new(job_id, object, source_id).encode()?;
        let value = mapping.to_bytes()?;

        self.mappings
            .compare_and_swap(key, None as Option<&[u8]>, Some(value))?
            .map_err(|_| Error::DuplicateMapping {
                job_id: job_id.to_string(),
                object: object.to_string(),
                source_id: source_id.to_string(),
            })?;

        Ok(())
    }

    /// Look up the destination identifier for a source identifier.
    ///
    /// Returns `Ok(None)` when no mapping exists; the caller decides
    /// whether that is fatal or expected.
    pub fn resolve(
        &self,
        job_id: &str,
        object: &str,
        source_id: &str,
    ) -> Result<Option<String>, Error> {
        let key = MappingKey::new(job_id, object, source_id).encode()?;
        match self.mappings.get(key)? {
            Some(bytes) => Ok(IdMapping::from_bytes(&bytes)?.destination_id),
            None => Ok(None),
        }
    }

    /// Get one job row.
    pub fn job(&self, job_id: &str) -> Result<Option<JobDetail>, Error> {
        match self.jobs.get(job_id.as_bytes())? {
            Some(bytes) => Ok(Some(JobDetail::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// List all recorded jobs, ordered by job identifier.
    pub fn jobs(&self) -> Result<Vec<JobDetail>, Error> {
        let mut jobs = Vec::new();
        for entry in self.jobs.iter() {
            let (_, value) = entry?;
            jobs.push(JobDetail::from_bytes(&value)?);
        }
        Ok(jobs)
    }

    /// List all mappings recorded for a job.
    pub fn mappings(&self, job_id: &str) -> Result<Vec<IdMapping>, Error> {
        let prefix = MappingKey::job_prefix(job_id)?;
        let mut mappings = Vec::new();
        for entry in self.mappings.scan_prefix(prefix) {
            let (_, value) = entry?;
            mappings.push(IdMapping::from_bytes(&value)?);
        }
        Ok(mappings)
    }

    /// Count the mappings recorded for a job.
    pub fn mapping_count(&self, job_id: &str) -> Result<usize, Error> {
        let prefix = MappingKey::job_prefix(job_id)?;
        let mut count = 0;
        for entry in self.mappings.scan_prefix(prefix) {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }
}

/// Get current timestamp in microseconds since Unix epoch.
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_micros() as u64
}
