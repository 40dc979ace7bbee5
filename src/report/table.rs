//! Text rendering of a capture.
//!
//! One block per drive with total/free/used and used percentage, followed by
//! the free-space change against the previous capture when there is one.

use crate::capture::Capture;
use crate::store::diff::{compare_snapshots, DiffType, SnapshotDiff};
use crate::util::{format_bytes, format_timestamp};

pub fn render(capture: &Capture) -> String {
    let mut output = String::new();

    if capture.persist_error.is_some() {
        output.push_str("Disk data measured (not saved):\n");
    } else {
        output.push_str("Disk data saved:\n");
    }
    output.push_str(&format!("Time: {}\n", format_timestamp(&capture.snapshot.timestamp)));
    output.push_str(&"-".repeat(40));
    output.push('\n');

    for disk in &capture.snapshot.disks {
        output.push_str(&format!("Drive {}:\n", disk.drive));
        output.push_str(&format!("  Total:     {}\n", format_bytes(disk.total_space)));
        output.push_str(&format!("  Free:      {}\n", format_bytes(disk.free_space)));
        output.push_str(&format!(
            "  Used:      {} ({:.1}%)\n",
            format_bytes(disk.used_space),
            disk.used_percent()
        ));
        output.push('\n');
    }

    if let Some(previous) = &capture.previous {
        output.push_str(&render_diff(&compare_snapshots(previous, &capture.snapshot)));
    }

    output
}

fn render_diff(diff: &SnapshotDiff) -> String {
    let mut output = format!("Since last capture ({}):\n", format_timestamp(&diff.from_timestamp));

    if diff.entries.is_empty() {
        output.push_str("  no change\n");
        return output;
    }

    for entry in &diff.entries {
        let line = match entry.diff_type {
            DiffType::Grew => format!(
                "  [+] {} free {} -> {} (+{})",
                entry.drive,
                format_bytes(entry.old_free),
                format_bytes(entry.new_free),
                format_bytes(entry.delta.unsigned_abs())
            ),
            DiffType::Shrank => format!(
                "  [-] {} free {} -> {} (-{})",
                entry.drive,
                format_bytes(entry.old_free),
                format_bytes(entry.new_free),
                format_bytes(entry.delta.unsigned_abs())
            ),
            DiffType::New => format!(
                "  [new] {} appeared ({} free)",
                entry.drive,
                format_bytes(entry.new_free)
            ),
            DiffType::Gone => format!(
                "  [gone] {} not measured (was {} free)",
                entry.drive,
                format_bytes(entry.old_free)
            ),
        };
        output.push_str(&line);
        output.push('\n');
    }

    let sign = if diff.net_change >= 0 { '+' } else { '-' };
    output.push_str(&format!(
        "Net change: {sign}{} free\n",
        format_bytes(diff.net_change.unsigned_abs())
    ));

    output
}
