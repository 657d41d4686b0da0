use owo_colors::OwoColorize;
use sgnl_core::PresentationView;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "sgnl".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Score the signal quality of web pages\n".dimmed());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print how many inputs were scored
pub fn print_summary(total: usize, failed: usize) {
    eprintln!("{}", "═".repeat(60).dimmed());
    if failed == 0 {
        print_success(&format!("Scored {} input(s)", total));
    } else {
        print_warning(&format!("Scored {} of {} input(s), {} failed", total - failed, total, failed));
    }
}

/// Renders one report as an itemized text block.
pub fn render_report(view: &PresentationView, color: bool) -> String {
    let mut lines = Vec::new();

    let heading = match &view.title {
        Some(title) => format!("{} {}", title, view.url),
        None => view.url.clone(),
    };
    lines.push(paint(&heading, color, |s| s.bold().to_string()));

    if let Some(error) = view.error {
        lines.push(format!("  {} {}", label("Error:", color), paint(error.as_str(), color, |s| s.red().to_string())));
        return lines.join("\n");
    }

    lines.push(format!(
        "  {} {}",
        label("Score:", color),
        score(view.combined_score, color)
    ));
    if let Some(heuristic) = view.heuristic_score {
        lines.push(format!("  {} {}", label("Heuristic:", color), heuristic));
    }
    lines.push(format!("  {} {}", label("Host:", color), view.host_category.as_str()));
    let density = match view.density_combined {
        Some(d) => format!("{:.4}", d),
        None => "not measured".to_string(),
    };
    lines.push(format!("  {} {}", label("Density:", color), density));
    if let Some(stats) = &view.stats {
        lines.push(format!(
            "  {} {} words, {} references, diversity {:.2}",
            label("Text:", color),
            stats.word_count,
            stats.reference_count,
            stats.vocabulary_diversity
        ));
    }
    let deep = if view.skip_deep_analysis { "skip" } else { "run" };
    lines.push(format!("  {} {}", label("Deep analysis:", color), deep));

    for adjustment in &view.adjustments {
        let delta = format!("{:+}", adjustment.delta);
        let delta = if adjustment.delta > 0 {
            paint(&delta, color, |s| s.green().to_string())
        } else {
            paint(&delta, color, |s| s.red().to_string())
        };
        lines.push(format!("    {:>4} {} {}", delta, adjustment.signal.as_str(), adjustment.reason));
    }

    lines.join("\n")
}

fn label(text: &str, color: bool) -> String {
    paint(text, color, |s| s.dimmed().to_string())
}

/// Colors a combined score by band.
fn score(value: f64, color: bool) -> String {
    let text = format!("{:.2}", value);
    if value >= 70.0 {
        paint(&text, color, |s| s.bright_green().to_string())
    } else if value >= 40.0 {
        paint(&text, color, |s| s.bright_yellow().to_string())
    } else {
        paint(&text, color, |s| s.bright_red().to_string())
    }
}

fn paint(text: &str, color: bool, style: impl Fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgnl_core::{Adjustment, FetchErrorKind, HostCategory, Signal, TextStats};

    fn view() -> PresentationView {
        PresentationView {
            url: "https://arxiv.org/abs/1".to_string(),
            title: Some("Attention".to_string()),
            combined_score: 86.25,
            heuristic_score: Some(75),
            adjustments: vec![Adjustment::new(Signal::Slop, -5, "Bloated markup, markup/text ratio 4.1")],
            density_combined: Some(0.5123),
            stats: Some(TextStats { char_count: 5120, word_count: 812, reference_count: 14, vocabulary_diversity: 0.4731 }),
            host_category: HostCategory::Academic,
            skip_deep_analysis: false,
            error: None,
        }
    }

    #[test]
    fn test_render_report_plain() {
        let text = render_report(&view(), false);
        assert!(text.starts_with("Attention https://arxiv.org/abs/1"));
        assert!(text.contains("Score: 86.25"));
        assert!(text.contains("Host: academic"));
        assert!(text.contains("Density: 0.5123"));
        assert!(text.contains("Text: 812 words, 14 references, diversity 0.47"));
        assert!(text.contains("  -5 slop Bloated markup"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_render_report_error() {
        let view = PresentationView { error: Some(FetchErrorKind::Timeout), ..view() };
        let text = render_report(&view, false);
        assert!(text.contains("Error: timeout"));
        assert!(!text.contains("Score:"));
        assert!(!text.contains("Text:"));
    }

    #[test]
    fn test_render_report_colored() {
        assert!(render_report(&view(), true).contains('\u{1b}'));
    }
}
