//! Subcommand implementations.

use std::fs;
use std::path::Path;

use comfy_table::{Cell, Table};

use ferry_api::ObjectDescribe;
use ferry_core::{classify, migration_order, MappingStore, ObjectClassification};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// List recorded migration jobs with their mapping counts.
pub fn jobs(db: &Path) -> CommandResult {
    let store = MappingStore::open(db)?;
    let jobs = store.jobs()?;
    if jobs.is_empty() {
        println!("No jobs recorded.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Job", "Source", "Destination", "Created", "Mappings"]);
    for job in jobs {
        let count = store.mapping_count(&job.job_id)?;
        table.add_row(vec![
            Cell::new(&job.job_id),
            Cell::new(&job.source),
            Cell::new(&job.destination),
            Cell::new(format_timestamp(job.created_at)),
            Cell::new(count),
        ]);
    }
    println!("{}", table);
    Ok(())
}

/// Print the destination identifier for one mapping, if recorded.
pub fn resolve(db: &Path, job: &str, object: &str, source_id: &str) -> CommandResult {
    let store = MappingStore::open(db)?;
    match store.resolve(job, object, source_id)? {
        Some(destination) => println!("{}", destination),
        None => println!("no mapping for {} {} in job {}", object, source_id, job),
    }
    Ok(())
}

/// Classify one archived describe payload.
pub fn classify_archive(path: &Path) -> CommandResult {
    let describe: ObjectDescribe = serde_json::from_str(&fs::read_to_string(path)?)?;
    let classification = classify(&describe);
    print_classification(&classification);
    Ok(())
}

/// Classify every archived payload and print the dependency-ordered plan.
pub fn plan(dir: &Path) -> CommandResult {
    let mut classifications = Vec::new();
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| entry.path());
    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let describe: ObjectDescribe = serde_json::from_str(&fs::read_to_string(&path)?)?;
        classifications.push(classify(&describe));
    }

    if classifications.is_empty() {
        println!("No describe archives in {}.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Object", "Master-Detail Field", "References"]);
    let mut edges = 0;
    for classification in &classifications {
        for (field, target) in &classification.master_detail {
            table.add_row(vec![
                classification.object.as_str(),
                field.as_str(),
                target.as_str(),
            ]);
            edges += 1;
        }
    }
    if edges > 0 {
        println!("{}", table);
    } else {
        println!("No master-detail relationships.");
    }

    println!("Migration order:");
    for (position, object) in migration_order(&classifications).iter().enumerate() {
        println!("  {}. {}", position + 1, object);
    }
    Ok(())
}

fn print_classification(classification: &ObjectClassification) {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Kind", "References"]);
    for field in &classification.creatable_fields {
        let (kind, target) = if let Some(target) = classification.master_detail.get(field) {
            ("master-detail", target.as_str())
        } else if let Some(target) = classification.lookup.get(field) {
            ("lookup", target.as_str())
        } else {
            ("scalar", "")
        };
        table.add_row(vec![field.as_str(), kind, target]);
    }
    println!("{}", table);
    println!("Query: {}", classification.query);
}

fn format_timestamp(micros: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_micros(micros as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| micros.to_string())
}
