//! Mapping result writers

use anyhow::Result;
use seedmap_core::{MappingRecord, ReadMappings};
use std::io::Write;

const RULE: &str = "-----------------------------------------------------------";

/// Column header of the line-per-hit format
pub const NORMAL_HEADER: &str =
    "# [READ_NAME] score index read_start read_mapped_length matches mismatches insertions deletions";

/// One line per hit, a blank line after each read
pub fn write_normal<W: Write>(out: &mut W, mapped: &[ReadMappings]) -> Result<()> {
    writeln!(out, "{}", NORMAL_HEADER)?;
    for read in mapped {
        for record in &read.records {
            write_record_line(out, record)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_record_line<W: Write>(out: &mut W, r: &MappingRecord) -> Result<()> {
    writeln!(
        out,
        "[{}] {} {} {} {} {} {} {} {}",
        r.read_name,
        r.score,
        r.genome_index,
        r.read_start,
        r.mapped,
        r.matches,
        r.mismatches,
        r.insertions,
        r.deletions
    )?;
    Ok(())
}

/// Banner per read followed by each alignment drawn out
pub fn write_pretty<W: Write>(out: &mut W, mapped: &[ReadMappings]) -> Result<()> {
    for read in mapped {
        writeln!(out, "{}", RULE)?;
        writeln!(out, "READ: [{}]", read.read_name)?;
        writeln!(out, "{}", RULE)?;

        for record in &read.records {
            writeln!(out)?;
            writeln!(
                out,
                "Score:   {}   (read start/end: {}/{})",
                record.score,
                record.read_start,
                record.read_end()
            )?;
            writeln!(out, "Index:   {}", record.genome_index)?;

            if let Some(view) = &record.alignment {
                writeln!(out, "Reftig:  {}", view.reference)?;
                writeln!(out, "Match:   {}", view.markers)?;
                writeln!(out, "Read:    {}", view.read)?;
            }
        }
        writeln!(out)?;
        writeln!(out)?;
    }
    Ok(())
}
