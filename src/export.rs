//! Export functionality for filtered results.
//!
//! Provides conversion of the visible hit list to various output formats:
//! - Markdown - formatted with headers, per-hit tables, and metadata
//! - JSON - structured data for programmatic use
//! - Plain Text - simple, copy-paste friendly format

use chrono::Utc;

use crate::model::types::{TrademarkHit, TrademarkStatus};
use crate::ui::format::{format_class_codes, format_first_use_date};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Markdown format with headers and per-hit metadata tables
    #[default]
    Markdown,
    /// JSON format for programmatic consumption
    Json,
    /// Plain text format for simple copy-paste
    PlainText,
}

impl ExportFormat {
    /// Get the display name for this format
    pub fn name(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Json => "JSON",
            Self::PlainText => "Plain Text",
        }
    }

    /// Get the file extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::PlainText => "txt",
        }
    }

    /// Cycle to the next export format
    pub fn next(self) -> Self {
        match self {
            Self::Markdown => Self::Json,
            Self::Json => Self::PlainText,
            Self::PlainText => Self::Markdown,
        }
    }

    /// Parse a format name as given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            "txt" | "text" | "plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// List all available formats
    pub fn all() -> &'static [Self] {
        &[Self::Markdown, Self::Json, Self::PlainText]
    }
}

/// Options for export customization
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Include the mark description entries
    pub include_description: bool,
    /// Include class codes
    pub include_classes: bool,
    /// Maximum description length (0 = unlimited)
    pub max_description_len: usize,
    /// Free-text query that produced the list (for header/metadata)
    pub query: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_description: true,
            include_classes: true,
            max_description_len: 500,
            query: None,
        }
    }
}

/// Export hits to the specified format
pub fn export_results(
    hits: &[TrademarkHit],
    format: ExportFormat,
    options: &ExportOptions,
) -> String {
    match format {
        ExportFormat::Markdown => export_markdown(hits, options),
        ExportFormat::Json => export_json(hits, options),
        ExportFormat::PlainText => export_plain_text(hits, options),
    }
}

/// Escape special Markdown characters to prevent formatting issues or injection.
fn escape_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('*', "\\*")
        .replace('_', "\\_")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('<', "\\<")
        .replace('>', "\\>")
        .replace('`', "\\`")
}

fn export_markdown(hits: &[TrademarkHit], options: &ExportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Trademark Search Results\n\n");

    if let Some(query) = &options.query {
        output.push_str(&format!("**Query:** `{}`\n\n", query.replace('`', "")));
    }

    output.push_str(&format!(
        "**Results:** {} | **Exported:** {}\n\n",
        hits.len(),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str("---\n\n");

    for (i, hit) in hits.iter().enumerate() {
        let src = &hit.source;
        let title = if src.current_owner.is_empty() {
            hit.id.as_str()
        } else {
            src.current_owner.as_str()
        };
        output.push_str(&format!("## {}. {}\n\n", i + 1, escape_markdown(title)));

        output.push_str("| Field | Value |\n");
        output.push_str("|-------|-------|\n");
        output.push_str(&format!(
            "| Status | {} |\n",
            TrademarkStatus::classify(&src.status_type)
        ));
        output.push_str(&format!(
            "| Registration | {} |\n",
            escape_markdown(&src.registration_number)
        ));
        output.push_str(&format!(
            "| Law Firm | {} |\n",
            escape_markdown(&src.law_firm)
        ));
        output.push_str(&format!(
            "| Attorney | {} |\n",
            escape_markdown(&src.attorney_name)
        ));
        output.push_str(&format!(
            "| First Use | {} |\n",
            format_first_use_date(src.first_use_anywhere_date.as_deref())
        ));

        if options.include_classes && !src.class_codes.is_empty() {
            output.push_str(&format!(
                "| Classes | {} |\n",
                escape_markdown(&format_class_codes(&src.class_codes))
            ));
        }

        output.push('\n');

        if options.include_description
            && let Some(entries) = &src.mark_description_description
            && !entries.is_empty()
        {
            output.push_str("### Description\n\n");
            let joined = entries.join("; ");
            let description = truncate_text(&joined, options.max_description_len);
            output.push_str(&escape_markdown(&description));
            output.push_str("\n\n");
        }

        output.push_str("---\n\n");
    }

    output
}

fn export_json(hits: &[TrademarkHit], options: &ExportOptions) -> String {
    let export_data = serde_json::json!({
        "query": options.query,
        "count": hits.len(),
        "exported_at": Utc::now().to_rfc3339(),
        "hits": hits.iter().map(|hit| {
            let src = &hit.source;
            let mut obj = serde_json::json!({
                "id": hit.id,
                "owner": src.current_owner,
                "law_firm": src.law_firm,
                "attorney": src.attorney_name,
                "status": TrademarkStatus::classify(&src.status_type).to_string(),
                "registration_number": src.registration_number,
                "first_use": src.first_use_anywhere_date,
            });

            if options.include_classes {
                obj["class_codes"] = serde_json::json!(src.class_codes);
            }

            if options.include_description
                && let Some(entries) = &src.mark_description_description
            {
                obj["description"] = serde_json::json!(
                    truncate_text(&entries.join("; "), options.max_description_len)
                );
            }

            obj
        }).collect::<Vec<_>>()
    });

    serde_json::to_string_pretty(&export_data).unwrap_or_else(|_| "{}".to_string())
}

fn export_plain_text(hits: &[TrademarkHit], options: &ExportOptions) -> String {
    let mut output = String::new();

    output.push_str("TRADEMARK SEARCH RESULTS\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');

    if let Some(query) = &options.query {
        output.push_str(&format!("Query: {query}\n"));
    }

    output.push_str(&format!(
        "Results: {} | Exported: {}\n",
        hits.len(),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for (i, hit) in hits.iter().enumerate() {
        let src = &hit.source;
        output.push_str(&format!("[{}] {}\n", i + 1, src.current_owner));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        output.push_str(&format!(
            "Status: {}\n",
            TrademarkStatus::classify(&src.status_type)
        ));
        output.push_str(&format!("Registration: {}\n", src.registration_number));
        output.push_str(&format!("Law Firm: {}\n", src.law_firm));
        output.push_str(&format!("Attorney: {}\n", src.attorney_name));
        output.push_str(&format!(
            "First Use: {}\n",
            format_first_use_date(src.first_use_anywhere_date.as_deref())
        ));

        if options.include_classes && !src.class_codes.is_empty() {
            output.push_str(&format!(
                "Classes: {}\n",
                format_class_codes(&src.class_codes)
            ));
        }

        if options.include_description
            && let Some(entries) = &src.mark_description_description
            && !entries.is_empty()
        {
            output.push_str("Description:\n");
            let description = truncate_text(&entries.join("; "), options.max_description_len);
            for line in description.lines() {
                output.push_str(&format!("  {line}\n"));
            }
        }

        output.push('\n');
    }

    output
}

/// Truncate text to max length (in characters), adding ellipsis if needed
fn truncate_text(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return text.to_string();
    }

    let char_count = text.chars().count();
    if char_count <= max_len {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hit() -> TrademarkHit {
        let mut hit = TrademarkHit {
            id: "hit-1".to_string(),
            ..Default::default()
        };
        hit.source.current_owner = "Acme Corp".to_string();
        hit.source.current_owner_cleaned = "Acme Corp".to_string();
        hit.source.law_firm = "Garcia-Zamor IP Law".to_string();
        hit.source.attorney_name = "Ruy Garcia-Zamor".to_string();
        hit.source.status_type = "registered".to_string();
        hit.source.registration_number = "5234567".to_string();
        hit.source.class_codes = vec!["009".into(), "042".into()];
        hit.source.mark_description_description = Some(vec!["Safety software".into()]);
        hit.source.first_use_anywhere_date = Some("20120301".into());
        hit
    }

    #[test]
    fn test_export_format_cycle() {
        let format = ExportFormat::Markdown;
        assert_eq!(format.next(), ExportFormat::Json);
        assert_eq!(format.next().next(), ExportFormat::PlainText);
        assert_eq!(format.next().next().next(), ExportFormat::Markdown);
    }

    #[test]
    fn test_export_format_names() {
        assert_eq!(ExportFormat::Markdown.extension(), "md");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PlainText.extension(), "txt");
        assert_eq!(ExportFormat::from_name("md"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::from_name("JSON"), Some(ExportFormat::Json));
        assert_eq!(
            ExportFormat::from_name("text"),
            Some(ExportFormat::PlainText)
        );
        assert_eq!(ExportFormat::from_name("docx"), None);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 100), "short");
        assert_eq!(truncate_text("this is long text", 10), "this is...");
        assert_eq!(truncate_text("any", 0), "any");
    }

    #[test]
    fn test_export_markdown() {
        let hits = vec![sample_hit()];
        let options = ExportOptions {
            query: Some("check".into()),
            ..Default::default()
        };
        let output = export_markdown(&hits, &options);

        assert!(output.contains("# Trademark Search Results"));
        assert!(output.contains("**Query:** `check`"));
        assert!(output.contains("Acme Corp"));
        assert!(output.contains("| Registration | 5234567 |"));
        assert!(output.contains("| First Use | Mar 1, 2012 |"));
        assert!(output.contains("Class 009, Class 042"));
    }

    #[test]
    fn test_export_json() {
        let hits = vec![sample_hit()];
        let output = export_json(&hits, &ExportOptions::default());

        assert!(output.contains("\"count\": 1"));
        assert!(output.contains("\"owner\": \"Acme Corp\""));
        assert!(output.contains("\"status\": \"registered\""));
    }

    #[test]
    fn test_export_plain_text() {
        let hits = vec![sample_hit()];
        let output = export_plain_text(&hits, &ExportOptions::default());

        assert!(output.contains("TRADEMARK SEARCH RESULTS"));
        assert!(output.contains("[1] Acme Corp"));
        assert!(output.contains("Registration: 5234567"));
        assert!(output.contains("First Use: Mar 1, 2012"));
    }

    #[test]
    fn test_export_markdown_escapes_special_chars() {
        let mut hit = sample_hit();
        hit.source.current_owner = "[Link](javascript:alert(1))".to_string();
        hit.source.law_firm = "Firm|Pipe".to_string();

        let output = export_markdown(&[hit], &ExportOptions::default());

        assert!(output.contains("\\[Link\\](javascript:alert(1))"));
        assert!(output.contains("Firm\\|Pipe"));
    }

    #[test]
    fn test_export_handles_sparse_hit() {
        let hit = TrademarkHit {
            id: "sparse".to_string(),
            ..Default::default()
        };
        let output = export_markdown(&[hit], &ExportOptions::default());

        // Falls back to the id as the title and N/A for the missing date.
        assert!(output.contains("## 1. sparse"));
        assert!(output.contains("| First Use | N/A |"));
        assert!(!output.contains("### Description"));
    }
}
