//! `reelchat subjects`: list the subject knowledge table.

use reelchat_config::AppConfig;
use reelchat_core::subject::SubjectRecord;
use reelchat_knowledge::SubjectTable;

fn describe(record: &SubjectRecord) -> String {
    let kind = if record.kind.is_empty() {
        "-"
    } else {
        record.kind.as_str()
    };
    format!("{:<16} {:<8} {}", record.id, kind, record.name)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let path = &config.knowledge.subjects_path;
    let table = SubjectTable::load(path)?;

    println!("Subjects ({} in {})", table.len(), path.display());
    println!();
    for record in table.records() {
        println!("  {}", describe(record));
    }

    Ok(())
}
