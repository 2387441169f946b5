//! Batch classification of link lists
//!
//! Each input line is `url[<TAB>text[<TAB>download]]`. The third column marks
//! a `download` attribute when it is `1`, `true` or `download`. Blank lines
//! and lines starting with `#` are skipped. One JSON object is written per
//! link.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info};
use xget_core::{ClassificationInput, Interceptor, Settings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    pub has_download_attribute: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckResult<'a> {
    pub url: &'a str,
    pub download: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewritten: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub total: usize,
    pub downloads: usize,
    pub rewritten: usize,
}

pub fn parse_records(text: &str) -> Vec<LinkRecord> {
    let mut out = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut columns = trimmed.split('\t');
        let url = columns.next().unwrap_or("").trim();
        if url.is_empty() {
            continue;
        }
        let text = columns.next().unwrap_or("");
        let has_download_attribute = matches!(
            columns.next().map(str::trim),
            Some("1" | "true" | "download")
        );

        out.push(LinkRecord {
            url: url.to_string(),
            text: text.to_string(),
            has_download_attribute,
        });
    }
    out
}

pub fn run_check(
    interceptor: &Interceptor<'_>,
    records: &[LinkRecord],
    settings: &Settings,
    out: &mut impl Write,
) -> Result<CheckSummary, String> {
    let mut summary = CheckSummary::default();

    for record in records {
        let input = ClassificationInput::new(&record.url, record.has_download_attribute, &record.text);
        let classification = interceptor.classifier().classify(&input);
        let rewritten = if classification.is_download {
            interceptor.rewriter().rewrite(&record.url, settings)
        } else {
            None
        };

        summary.total += 1;
        if classification.is_download {
            summary.downloads += 1;
        }
        if rewritten.is_some() {
            summary.rewritten += 1;
        }

        let result = CheckResult {
            url: &record.url,
            download: classification.is_download,
            reason: classification.reason.to_string(),
            platform: interceptor.registry().detect(&record.url).map(|key| key.as_str()),
            rewritten,
        };
        debug!(url = %record.url, reason = %result.reason, "classified");

        let line = serde_json::to_string(&result).map_err(|e| format!("Failed to encode result: {}", e))?;
        writeln!(out, "{}", line).map_err(|e| format!("Failed to write output: {}", e))?;
    }

    info!(
        total = summary.total,
        downloads = summary.downloads,
        rewritten = summary.rewritten,
        "check finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use xget_core::{InterceptorConfig, Registry};

    use super::*;

    const INPUT: &str = "\
# links scraped from a release page
https://github.com/o/r/releases/download/v1/a.zip\ta.zip
https://github.com/o/r/releases\tReleases

https://example.com/report\tDownload report
https://huggingface.co/m/resolve/main/model.bin\t\t1
";

    #[test]
    fn test_parse_records() {
        let records = parse_records(INPUT);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].text, "a.zip");
        assert!(!records[0].has_download_attribute);
        assert_eq!(records[3].text, "");
        assert!(records[3].has_download_attribute);
    }

    #[test]
    fn test_run_check_writes_json_lines() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());
        let settings = Settings::with_domain("mirror.example");
        let records = parse_records(INPUT);

        let mut out = Vec::new();
        let summary = run_check(&interceptor, &records, &settings, &mut out).unwrap();
        assert_eq!(
            summary,
            CheckSummary {
                total: 4,
                downloads: 3,
                rewritten: 2,
            }
        );

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0]["rewritten"],
            "https://mirror.example/gh/o/r/releases/download/v1/a.zip"
        );
        assert_eq!(lines[0]["platform"], "gh");
        assert_eq!(lines[1]["download"], false);
        assert!(lines[1].get("rewritten").is_none());
        assert_eq!(lines[2]["download"], true);
        assert!(lines[2].get("platform").is_none());
        assert_eq!(
            lines[3]["rewritten"],
            "https://mirror.example/hf/m/resolve/main/model.bin"
        );
    }

    #[test]
    fn test_run_check_disabled_settings_never_rewrite() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());
        let records = parse_records(INPUT);

        let mut out = Vec::new();
        let summary = run_check(&interceptor, &records, &Settings::disabled(), &mut out).unwrap();
        assert_eq!(summary.downloads, 3);
        assert_eq!(summary.rewritten, 0);
    }
}
