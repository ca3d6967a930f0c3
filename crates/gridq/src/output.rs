//! Rendering of job records for the terminal.

use chrono::{DateTime, Utc};
use gridq_parsers::format_duration;
use gridq_sge::JobRecord;

const HEADER: [&str; 8] = [
    "ID", "STATUS", "OWNER", "NAME", "PROJECT", "QUEUE", "SLOTS", "WALLCLOCK",
];

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn format_time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn row(job: &JobRecord) -> [String; 8] {
    let wallclock = match (job.wallclock_time, job.wallclock_limit) {
        (Some(used), Some(limit)) => {
            format!("{}/{}", format_duration(used), format_duration(limit))
        }
        (Some(used), None) => format_duration(used),
        (None, _) => "-".to_string(),
    };
    [
        job.id.clone(),
        job.status.to_string(),
        or_dash(job.owner.as_deref()),
        or_dash(job.name.as_deref()),
        or_dash(job.accounting_id.as_deref()),
        or_dash(job.queue_name.as_deref()),
        job.allocated_procs
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string()),
        wallclock,
    ]
}

/// Column-aligned table, one job per line.
pub fn render_table(jobs: &[JobRecord]) -> String {
    let rows: Vec<[String; 8]> = jobs.iter().map(row).collect();

    let mut widths = HEADER.map(str::len);
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r) {
            *w = (*w).max(cell.len());
        }
    }

    let header = HEADER.map(str::to_string);
    std::iter::once(&header)
        .chain(rows.iter())
        .map(|r| {
            r.iter()
                .zip(widths)
                .map(|(cell, w)| format!("{:<w$}", cell, w = w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Key/value view of a single job.
pub fn render_detail(job: &JobRecord) -> String {
    let mut lines = vec![
        format!("id:              {}", job.id),
        format!("status:          {}", job.status),
        format!("owner:           {}", or_dash(job.owner.as_deref())),
        format!("name:            {}", or_dash(job.name.as_deref())),
        format!("project:         {}", or_dash(job.accounting_id.as_deref())),
        format!("queue:           {}", or_dash(job.queue_name.as_deref())),
        format!(
            "slots:           {}",
            job.allocated_procs
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
        format!("submitted:       {}", format_time(job.submission_time)),
        format!("started:         {}", format_time(job.dispatch_time)),
        format!(
            "wallclock:       {}",
            job.wallclock_time
                .map(format_duration)
                .unwrap_or_else(|| "-".to_string())
        ),
        format!(
            "wallclock limit: {}",
            job.wallclock_limit
                .map(format_duration)
                .unwrap_or_else(|| "-".to_string())
        ),
    ];
    if let Some(native) = &job.native {
        for (key, value) in native {
            lines.push(format!("{:<16} {}", format!("{}:", key), value));
        }
    }
    lines.join("\n")
}
