//! 各目标语法的渲染

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::CoreResult;
use crate::formatter::{FormatOptions, OutputFormat};

/// 生成器标识
pub const GENERATOR: &str = concat!("rshostlist v", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonStats {
    unique_hostnames: usize,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    name: &'a str,
    generated: String,
    generator: &'a str,
    stats: JsonStats,
    hostnames: &'a [String],
}

#[derive(Serialize)]
struct DohRule<'a> {
    domain: &'a str,
    action: &'static str,
}

#[derive(Serialize)]
struct DohDocument<'a> {
    name: &'a str,
    generated: String,
    generator: &'a str,
    #[serde(rename = "type")]
    list_type: &'static str,
    stats: JsonStats,
    rules: Vec<DohRule<'a>>,
}

pub fn render(hostnames: &[String], format: OutputFormat, options: &FormatOptions) -> CoreResult<String> {
    let generated = timestamp(options.generated_at);

    let content = match format {
        OutputFormat::Json => {
            let doc = JsonDocument {
                name: &options.name,
                generated,
                generator: GENERATOR,
                stats: JsonStats {
                    unique_hostnames: hostnames.len(),
                },
                hostnames,
            };
            format!("{}\n", serde_json::to_string_pretty(&doc)?)
        }
        OutputFormat::Doh => {
            let doc = DohDocument {
                name: &options.name,
                generated,
                generator: GENERATOR,
                list_type: "blocklist",
                stats: JsonStats {
                    unique_hostnames: hostnames.len(),
                },
                rules: hostnames
                    .iter()
                    .map(|h| DohRule {
                        domain: h,
                        action: "block",
                    })
                    .collect(),
            };
            format!("{}\n", serde_json::to_string_pretty(&doc)?)
        }
        _ => render_text(hostnames, format, options, &generated),
    };

    Ok(content)
}

fn render_text(hostnames: &[String], format: OutputFormat, options: &FormatOptions, generated: &str) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(hostnames.len() + 8);

    if options.include_header {
        let marker = if format == OutputFormat::Adblock { "!" } else { "#" };
        lines.push(format!("{} Title: {}", marker, options.name));
        lines.push(format!("{} Generated: {}", marker, generated));
        lines.push(format!("{} Generator: {}", marker, GENERATOR));
        lines.push(format!("{} Format: {}", marker, format));
        lines.push(format!("{} Unique hostnames: {}", marker, hostnames.len()));
        lines.push(String::new());
    }

    if format == OutputFormat::Unbound {
        lines.push("server:".to_string());
    }

    for hostname in hostnames {
        let line = match format {
            OutputFormat::Hosts => format!("{} {}", options.ip, hostname),
            OutputFormat::Dnsmasq => format!("address=/{}/", hostname),
            OutputFormat::Pihole => hostname.clone(),
            OutputFormat::Unbound => format!("local-zone: \"{}\" always_nxdomain", hostname),
            OutputFormat::Adblock => format!("||{}^", hostname),
            OutputFormat::Json | OutputFormat::Doh => unreachable!("structured formats are rendered separately"),
        };
        lines.push(line);
    }

    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    content
}

fn timestamp(generated_at: Option<DateTime<Utc>>) -> String {
    generated_at
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}
