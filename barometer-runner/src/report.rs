//! Markdown report of a snapshot.

use barometer_core::IndexKind;

use crate::snapshot::{ModelOutput, Snapshot};

pub fn generate_report(snapshot: &Snapshot) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Forward-Sharpe Barometer Report\n\n");
    md.push_str(&format!(
        "Generated {}\n\n",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if snapshot.is_empty() {
        md.push_str("No data available.\n");
        return md;
    }

    for (key, output) in &snapshot.models {
        md.push_str(&format!("## {} (`{}`)\n\n", output.display_name, key));
        model_section(&mut md, output);
    }
    md
}

fn model_section(md: &mut String, output: &ModelOutput) {
    md.push_str("| Index | Last Date | Last Price | Forward Sharpe | Zone | Rows | Dataset |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");

    for index in IndexKind::ALL {
        let Some(series) = output.results.get(index) else {
            continue;
        };
        let hash = output
            .dataset_hashes
            .get(&index)
            .map(|h| h.0.chars().take(12).collect::<String>())
            .unwrap_or_default();
        match (series.points.last(), output.gauges.get(&index)) {
            (Some(last), Some(gauge)) => md.push_str(&format!(
                "| {index} | {} | {:.2} | {:.2} | {} | {} | {hash} |\n",
                gauge.date,
                last.price,
                gauge.value,
                gauge.zone,
                series.len()
            )),
            (Some(last), None) => md.push_str(&format!(
                "| {index} | {} | {:.2} | n/a | n/a | {} | {hash} |\n",
                last.date,
                last.price,
                series.len()
            )),
            (None, _) => md.push_str(&format!(
                "| {index} | No data available | | | | 0 | {hash} |\n"
            )),
        }
    }
    md.push('\n');

    if !output.results.skipped.is_empty() {
        md.push_str("### Skipped\n\n");
        for (index, reason) in &output.results.skipped {
            md.push_str(&format!("- **{index}**: {reason}\n"));
        }
        md.push('\n');
    }
}
