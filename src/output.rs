use anyhow::Result;

use crate::report::Report;

/// One `<name>: <status>` line per finding.
pub fn format_text_output(report: &Report) -> String {
    let mut output = String::new();
    for finding in &report.findings {
        output.push_str(&format!("{}\n", finding));
    }
    output
}

pub fn format_json_output(report: &Report) -> Result<String> {
    let mut output = serde_json::to_string_pretty(report)?;
    output.push('\n');
    Ok(output)
}
