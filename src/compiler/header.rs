//! 列表头与源头注释

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::{Configuration, SourceConfig};

pub const COMPILER_NAME: &str = concat!("rshostlist v", env!("CARGO_PKG_VERSION"));

/// 列表头（`!` 注释块）
pub fn list_header(config: &Configuration, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec!["!".to_string(), format!("! Title: {}", config.name)];

    let optional = [
        ("Description", &config.description),
        ("Version", &config.version),
        ("Homepage", &config.homepage),
        ("License", &config.license),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("! {}: {}", label, value));
        }
    }

    lines.push(format!(
        "! Last modified: {}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    lines.push("!".to_string());
    lines.push(format!("! Compiled by {}", COMPILER_NAME));
    lines.push("!".to_string());
    lines
}

/// 单个源的源头注释
pub fn source_header(source: &SourceConfig) -> Vec<String> {
    let mut lines = vec!["!".to_string()];
    if let Some(name) = &source.name {
        lines.push(format!("! Source name: {}", name));
    }
    lines.push(format!("! Source: {}", source.source));
    lines.push("!".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceType;
    use chrono::TimeZone;

    #[test]
    fn test_list_header() {
        let config = Configuration {
            name: "My list".to_string(),
            description: Some("Blocks ads".to_string()),
            license: Some("MIT".to_string()),
            ..Configuration::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let header = list_header(&config, now);
        assert_eq!(header[0], "!");
        assert_eq!(header[1], "! Title: My list");
        assert_eq!(header[2], "! Description: Blocks ads");
        assert_eq!(header[3], "! License: MIT");
        assert_eq!(header[4], "! Last modified: 2024-05-06T07:08:09Z");
        assert!(header.iter().any(|l| l.starts_with("! Compiled by rshostlist")));
    }

    #[test]
    fn test_source_header() {
        let mut source = SourceConfig::new("https://example.org/list.txt", SourceType::Adblock);
        assert_eq!(source_header(&source), vec!["!", "! Source: https://example.org/list.txt", "!"]);

        source.name = Some("Example".to_string());
        assert_eq!(source_header(&source)[1], "! Source name: Example");
    }
}
