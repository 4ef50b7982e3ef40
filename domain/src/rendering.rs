//! Branded HTML rendering for session deliverables.
//!
//! Produces a self-contained HTML document from a structured summary and
//! the coach's brand configuration. All interpolated text is escaped;
//! empty sections are omitted rather than rendered as bare headings.

use session_ai::traits::rendering::Renderer;
use session_ai::types::summary::{BrandConfig, SessionSummary};
use session_ai::Error;
use std::fmt::Write;

/// Server-side HTML renderer.
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(
        &self,
        client_name: &str,
        summary: &SessionSummary,
        brand: &BrandConfig,
    ) -> Result<String, Error> {
        let title = format!("{} Session Report", client_name);
        let mut body = String::new();

        if let Some(logo_url) = &brand.logo_url {
            let _ = write!(
                body,
                r#"<img class="logo" src="{}" alt="logo">"#,
                escape_html(logo_url)
            );
        }
        let _ = write!(body, "<h1>{}</h1>", escape_html(&title));

        render_list_section(&mut body, "Highlights", &summary.highlights);
        render_list_section(&mut body, "Goals", &summary.goals);

        if !summary.action_items.is_empty() {
            body.push_str("<h2>Action Items</h2><table><thead><tr>");
            body.push_str("<th>Task</th><th>Owner</th><th>Due Date</th>");
            body.push_str("</tr></thead><tbody>");
            for item in &summary.action_items {
                let _ = write!(
                    body,
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&item.task),
                    escape_html(item.owner.as_deref().unwrap_or("")),
                    escape_html(item.due_date.as_deref().unwrap_or("")),
                );
            }
            body.push_str("</tbody></table>");
        }

        render_list_section(&mut body, "Next Steps", &summary.next_steps);

        Ok(format!(
            "<!DOCTYPE html>\
             <html><head><meta charset=\"utf-8\"><title>{title}</title>\
             <style>\
             body{{font-family:Helvetica,Arial,sans-serif;margin:2rem;color:#1a1a1a}}\
             h1,h2{{color:{primary}}}\
             .logo{{max-height:64px;margin-bottom:1rem}}\
             table{{border-collapse:collapse;width:100%}}\
             th{{background:{secondary};color:#fff;text-align:left;padding:.5rem}}\
             td{{border-bottom:1px solid #ddd;padding:.5rem}}\
             </style></head><body>{body}</body></html>",
            title = escape_html(&title),
            primary = escape_html(&brand.primary_color),
            secondary = escape_html(&brand.secondary_color),
            body = body,
        ))
    }
}

fn render_list_section(body: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(body, "<h2>{}</h2><ul>", heading);
    for item in items {
        let _ = write!(body, "<li>{}</li>", escape_html(item));
    }
    body.push_str("</ul>");
}

/// Escape text for interpolation into HTML content and attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_ai::types::summary::ActionItem;

    fn sample_summary() -> SessionSummary {
        SessionSummary {
            highlights: vec!["Strong progress on delegation".to_string()],
            goals: vec!["Hire a chief of staff".to_string()],
            action_items: vec![ActionItem {
                task: "Draft role description".to_string(),
                owner: Some("Alex".to_string()),
                due_date: Some("2026-09-15".to_string()),
            }],
            next_steps: vec!["Review candidates next session".to_string()],
        }
    }

    #[test]
    fn test_render_includes_all_sections_and_brand_colors() {
        let brand = BrandConfig::default();
        let html = HtmlRenderer
            .render("Acme Coaching", &sample_summary(), &brand)
            .unwrap();

        assert!(html.contains("Acme Coaching Session Report"));
        assert!(html.contains("<h2>Highlights</h2>"));
        assert!(html.contains("<h2>Goals</h2>"));
        assert!(html.contains("<h2>Action Items</h2>"));
        assert!(html.contains("<h2>Next Steps</h2>"));
        assert!(html.contains("#2A3EB1"));
        assert!(html.contains("#4C6FE7"));
        assert!(html.contains("<td>Alex</td>"));
    }

    #[test]
    fn test_render_omits_empty_sections() {
        let summary = SessionSummary {
            highlights: vec!["Only highlights".to_string()],
            ..Default::default()
        };
        let html = HtmlRenderer
            .render("Client", &summary, &BrandConfig::default())
            .unwrap();

        assert!(html.contains("<h2>Highlights</h2>"));
        assert!(!html.contains("<h2>Goals</h2>"));
        assert!(!html.contains("<h2>Action Items</h2>"));
        assert!(!html.contains("<h2>Next Steps</h2>"));
    }

    #[test]
    fn test_render_escapes_user_controlled_text() {
        let summary = SessionSummary {
            highlights: vec!["<script>alert(1)</script>".to_string()],
            ..Default::default()
        };
        let html = HtmlRenderer
            .render("A & B \"Consulting\"", &summary, &BrandConfig::default())
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &amp; B &quot;Consulting&quot;"));
    }

    #[test]
    fn test_render_logo_only_when_configured() {
        let summary = sample_summary();
        let without = HtmlRenderer
            .render("Client", &summary, &BrandConfig::default())
            .unwrap();
        assert!(!without.contains("<img"));

        let brand = BrandConfig {
            logo_url: Some("https://cdn.example.com/logo.png".to_string()),
            ..Default::default()
        };
        let with = HtmlRenderer.render("Client", &summary, &brand).unwrap();
        assert!(with.contains(r#"src="https://cdn.example.com/logo.png""#));
    }
}
