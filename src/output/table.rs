//! Plain-text table output.

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::cache::ProjectedFolderRecord;

const NAME_WIDTH: usize = 28;

/// Write one row per record, preceded by a header and followed by a total.
pub fn write_table<W: Write>(records: &[ProjectedFolderRecord], writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "{:<NAME_WIDTH$} {:>6} {:>10}  {:<16}  {:<6}  INTEGRITY",
        "NAME", "EMOTES", "SIZE", "MODIFIED", "README"
    )?;

    for record in records {
        writeln!(
            writer,
            "{:<NAME_WIDTH$} {:>6} {:>10}  {:<16}  {:<6}  {}",
            fit_name(&record.name),
            record.emote_count,
            ByteSize::b(record.size_bytes).to_string(),
            record.last_modified.format("%Y-%m-%d %H:%M").to_string(),
            if record.readme_path.is_some() { "yes" } else { "-" },
            integrity_cell(record),
        )?;
    }

    let total: u64 = records.iter().map(|r| r.size_bytes).sum();
    writeln!(
        writer,
        "\n{} folders, {} total",
        records.len(),
        ByteSize::b(total)
    )
}

fn integrity_cell(record: &ProjectedFolderRecord) -> String {
    if record.integrity_failed {
        format!("FAILED ({})", record.integrity_failure_count)
    } else {
        "ok".to_string()
    }
}

fn fit_name(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_string();
    }
    let kept: String = name.chars().take(NAME_WIDTH - 3).collect();
    format!("{kept}...")
}
