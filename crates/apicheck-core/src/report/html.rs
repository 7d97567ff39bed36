//! Static HTML dashboard for a run summary

use crate::result::{NO_RESPONSE_STATUS, RunSummary, TestResult, format_distribution, format_pct};

const STYLE: &str = r#"body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #1f2328; }
h1 { margin-bottom: 0.25rem; }
.meta { color: #59636e; margin-top: 0; }
.cards { display: flex; gap: 1rem; margin: 1.5rem 0; }
.card { border: 1px solid #d1d9e0; border-radius: 6px; padding: 1rem 1.5rem; min-width: 7rem; }
.card .value { display: block; font-size: 2rem; font-weight: 600; }
.card .label { color: #59636e; }
.card.passed .value { color: #1a7f37; }
.card.failed .value { color: #d1242f; }
.distribution { color: #59636e; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #d1d9e0; padding: 0.5rem; text-align: left; vertical-align: top; }
th { background: #f6f8fa; }
td.url { font-family: monospace; word-break: break-all; }
tr.pass td.verdict { color: #1a7f37; font-weight: 600; }
tr.fail td.verdict { color: #d1242f; font-weight: 600; }
tr.fail.status_mismatch { background: #fff8c5; }
tr.fail.transport { background: #ffebe9; }
td.detail { color: #59636e; }"#;

const COLUMNS: &[&str] = &[
    "#", "Name", "Method", "URL", "Expected", "Actual", "Result", "Latency", "Details",
];

/// Render the full HTML document.
#[must_use]
pub fn render(summary: &RunSummary) -> String {
    let mut lines = Vec::new();

    lines.push("<!DOCTYPE html>".to_string());
    lines.push(r#"<html lang="en">"#.to_string());
    lines.push("<head>".to_string());
    lines.push(r#"<meta charset="utf-8">"#.to_string());
    lines.push("<title>API Test Report</title>".to_string());
    lines.push(format!("<style>\n{STYLE}\n</style>"));
    lines.push("</head>".to_string());
    lines.push("<body>".to_string());
    lines.push("<h1>API Test Report</h1>".to_string());

    let mut meta = vec![format!("Generated {}", escape(&summary.generated_at))];
    if let Some(base_url) = &summary.base_url {
        meta.push(format!("base URL {}", escape(base_url)));
    }
    meta.push(format!("duration {:.0} ms", summary.duration_ms));
    lines.push(format!(r#"<p class="meta">{}</p>"#, meta.join(" | ")));

    lines.push(r#"<section class="cards">"#.to_string());
    lines.push(card("total", "Total", &summary.total_count.to_string()));
    lines.push(card("passed", "Passed", &summary.pass_count.to_string()));
    lines.push(card("failed", "Failed", &summary.fail_count.to_string()));
    lines.push(card(
        "rate",
        "Success rate",
        &format!("{}%", format_pct(summary.success_rate())),
    ));
    lines.push("</section>".to_string());

    if !summary.status_distribution.is_empty() {
        lines.push(format!(
            r#"<p class="distribution">Status codes: {}</p>"#,
            format_distribution(&summary.status_distribution)
        ));
    }

    lines.push("<table>".to_string());
    lines.push(format!(
        "<thead><tr>{}</tr></thead>",
        COLUMNS
            .iter()
            .map(|c| format!("<th>{c}</th>"))
            .collect::<String>()
    ));
    lines.push("<tbody>".to_string());
    if summary.results.is_empty() {
        lines.push(format!(
            r#"<tr><td colspan="{}">No tests were run</td></tr>"#,
            COLUMNS.len()
        ));
    }
    for (idx, result) in summary.results.iter().enumerate() {
        lines.push(render_row(idx + 1, result));
    }
    lines.push("</tbody>".to_string());
    lines.push("</table>".to_string());
    lines.push("</body>".to_string());
    lines.push("</html>".to_string());

    let mut html = lines.join("\n");
    html.push('\n');
    html
}

fn card(class: &str, label: &str, value: &str) -> String {
    format!(
        r#"<div class="card {class}"><span class="value">{value}</span><span class="label">{label}</span></div>"#
    )
}

/// One table row. Failed rows also carry the failure kind as a class,
/// plus `transport` when no response arrived.
fn render_row(position: usize, result: &TestResult) -> String {
    let class = match (result.passed, result.failure_kind) {
        (true, _) => "pass".to_string(),
        (false, Some(kind)) if kind.is_transport() => format!("fail transport {}", kind.as_str()),
        (false, Some(kind)) => format!("fail {}", kind.as_str()),
        (false, None) => "fail".to_string(),
    };
    let actual = if result.actual_status == NO_RESPONSE_STATUS {
        "n/a".to_string()
    } else {
        result.actual_status.to_string()
    };
    let verdict = if result.passed { "PASS" } else { "FAIL" };
    let detail = result.detail().map(escape).unwrap_or_default();

    format!(
        r#"<tr class="{class}"><td>{position}</td><td>{name}</td><td>{method}</td><td class="url">{url}</td><td>{expected}</td><td>{actual}</td><td class="verdict">{verdict}</td><td>{latency:.1} ms</td><td class="detail">{detail}</td></tr>"#,
        name = escape(&result.name),
        method = result.method,
        url = escape(&result.url),
        expected = result.expected_display(),
        latency = result.latency_ms,
    )
}

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
