//! Html pages served to browsers. Everything taken from a record is escaped.

use std::fmt::Write;

use serde_json::Value;

use crate::error::Error;
use crate::store::Record;

pub const INDEX_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>hostscan</title></head>
<body>
<h1>hostscan scan service</h1>
<ul>
<li>POST /api/scan</li>
<li>GET /api/scan/{id}</li>
<li>GET /api/results?limit=N</li>
<li>GET /api/results/summary/{id}</li>
<li>DELETE /api/results/{id}</li>
<li>GET /api/statistics</li>
<li>GET /api/health</li>
<li>GET /api/download/{id}</li>
<li>GET /api/apis</li>
<li>GET /results/{id} - stored result in the browser</li>
</ul>
</body>
</html>
"#;

pub fn record_page(record: &Record) -> String {
    let mut out = String::new();
    let name = escape(&record.name);

    let _ = writeln!(out, "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{name} - hostscan</title></head>\n<body>");
    let _ = writeln!(out, "<h1>{name}</h1>");
    out.push_str("<table>\n");
    let _ = writeln!(out, "<tr><th>ID</th><td>{}</td></tr>", escape(&record.id));
    let _ = writeln!(
        out,
        "<tr><th>Timestamp</th><td>{}</td></tr>",
        record.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "<tr><th>File</th><td>{}</td></tr>", escape(&record.storage_key));
    out.push_str("</table>\n");
    let _ = writeln!(
        out,
        "<p><a href=\"/api/download/{}\">Download JSON</a></p>",
        escape(&record.id)
    );

    match record.payload.as_object() {
        Some(sections) if !sections.is_empty() => {
            for (section, value) in sections {
                let _ = writeln!(out, "<h2>{}</h2>", escape(section));
                section_table(&mut out, value);
            }
        }
        _ => out.push_str("<p>No scan data.</p>\n"),
    }

    out.push_str("</body>\n</html>\n");
    out
}

pub fn error_page(err: &Error) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>hostscan error</title></head>\n\
         <body>\n<h1>Error</h1>\n<p>{}</p>\n<p><a href=\"/\">Back</a></p>\n</body>\n</html>\n",
        escape(&err.to_string())
    )
}

// object fields become rows; nested values are shown as pretty json
fn section_table(out: &mut String, value: &Value) {
    let Some(fields) = value.as_object() else {
        let _ = writeln!(out, "<pre>{}</pre>", escape(&pretty(value)));
        return;
    };

    out.push_str("<table>\n");
    for (key, field) in fields {
        let cell = match field {
            Value::String(s) => escape(s),
            Value::Object(_) | Value::Array(_) => format!("<pre>{}</pre>", escape(&pretty(field))),
            other => escape(&other.to_string()),
        };
        let _ = writeln!(out, "<tr><th>{}</th><td>{cell}</td></tr>", escape(key));
    }
    out.push_str("</table>\n");
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
