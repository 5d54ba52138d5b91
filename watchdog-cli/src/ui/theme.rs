//! UI Theme Module - color palette and style helpers
//!
//! Provides one place for the dashboard's colors:
//! - Palette tokens (not hard-coded colors)
//! - StyleKit helpers for log levels, charts and notices
//! - Dark theme defaults; chart colors follow the web dashboard

use ratatui::style::{Color, Modifier, Style};

use watchdog_core::metrics::MetricKind;
use watchdog_core::notice::NoticeLevel;

/// Color palette tokens for the theme
#[derive(Clone, Debug)]
pub struct Palette {
    /// Panel border color
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text (secondary info)
    pub text_dim: Color,
    /// Muted text (placeholders, sentinel lines)
    pub text_muted: Color,
    /// Accent color (highlights, focus)
    pub accent: Color,
    /// Success state
    pub success: Color,
    /// Warning level logs
    pub warn: Color,
    /// Error level logs, failed mutations
    pub error: Color,
    /// Informational notices
    pub info: Color,
    /// Selection background
    pub selection_bg: Color,
    /// Selection foreground
    pub selection_fg: Color,
    /// Key hint text
    pub key_hint: Color,
    /// CPU chart line
    pub cpu: Color,
    /// RAM chart line
    pub ram: Color,
    /// Disk chart line
    pub disk: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(227, 234, 252),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255),
            success: Color::Rgb(78, 201, 176),
            warn: Color::Rgb(220, 180, 100),
            error: Color::Rgb(244, 135, 113),
            info: Color::Rgb(156, 220, 254),
            selection_bg: Color::Rgb(38, 79, 120),
            selection_fg: Color::White,
            key_hint: Color::Rgb(206, 145, 120),
            cpu: Color::Rgb(207, 0, 138),
            ram: Color::Rgb(156, 0, 191),
            disk: Color::Rgb(0, 114, 207),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    // ========== StyleKit Helper Functions ==========

    /// Style for a log line by its server-side level name
    /// (`Error`, `Critical`, `Warning`, `Information`, `Verbose`...)
    pub fn level_style(&self, level: &str) -> Style {
        let color = match level.to_ascii_lowercase().as_str() {
            "critical" | "error" => self.palette.error,
            "warning" | "warn" => self.palette.warn,
            "verbose" | "debug" => self.palette.text_dim,
            _ => self.palette.text,
        };
        Style::default().fg(color)
    }

    /// Line color for a metric chart
    pub fn metric_color(&self, kind: MetricKind) -> Color {
        match kind {
            MetricKind::Cpu => self.palette.cpu,
            MetricKind::Ram => self.palette.ram,
            MetricKind::Disk => self.palette.disk,
        }
    }

    /// Latest-value readout: green / amber / red by load
    pub fn load_style(&self, pct: f64) -> Style {
        let color = if pct > 80.0 {
            self.palette.error
        } else if pct > 50.0 {
            self.palette.warn
        } else {
            self.palette.success
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Border of a notice modal
    pub fn notice_style(&self, level: NoticeLevel) -> Style {
        let color = match level {
            NoticeLevel::Info => self.palette.info,
            NoticeLevel::Error => self.palette.error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.palette.accent)
        } else {
            Style::default().fg(self.palette.panel_border)
        }
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.palette.selection_bg)
            .fg(self.palette.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint_style(&self) -> Style {
        Style::default().fg(self.palette.key_hint)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    pub fn text_dim_style(&self) -> Style {
        Style::default().fg(self.palette.text_dim)
    }

    pub fn text_muted_style(&self) -> Style {
        Style::default()
            .fg(self.palette.text_muted)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.palette.error)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.palette.text)
            .add_modifier(Modifier::BOLD)
    }
}

static DEFAULT_THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

pub fn theme() -> &'static Theme {
    DEFAULT_THEME.get_or_init(Theme::default)
}

/// Convenience re-exports for common use cases
pub mod styles {
    use super::*;

    pub fn level(level: &str) -> Style {
        theme().level_style(level)
    }

    pub fn metric(kind: MetricKind) -> Color {
        theme().metric_color(kind)
    }

    pub fn load(pct: f64) -> Style {
        theme().load_style(pct)
    }

    pub fn notice(level: NoticeLevel) -> Style {
        theme().notice_style(level)
    }

    pub fn border(focused: bool) -> Style {
        theme().border_style(focused)
    }

    pub fn selection() -> Style {
        theme().selection_style()
    }

    pub fn key_hint() -> Style {
        theme().key_hint_style()
    }

    pub fn text() -> Style {
        theme().text_style()
    }

    pub fn text_dim() -> Style {
        theme().text_dim_style()
    }

    pub fn text_muted() -> Style {
        theme().text_muted_style()
    }

    pub fn accent() -> Style {
        theme().accent_style()
    }

    pub fn error() -> Style {
        theme().error_style()
    }

    pub fn title() -> Style {
        theme().title_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_style_is_case_insensitive() {
        let t = Theme::default();
        assert_eq!(t.level_style("Error"), t.level_style("ERROR"));
        assert_eq!(t.level_style("Critical").fg, Some(t.palette.error));
        assert_eq!(t.level_style("Warning").fg, Some(t.palette.warn));
        assert_eq!(t.level_style("Information").fg, Some(t.palette.text));
    }

    #[test]
    fn test_load_thresholds() {
        let t = Theme::default();
        assert_eq!(t.load_style(10.0).fg, Some(t.palette.success));
        assert_eq!(t.load_style(55.0).fg, Some(t.palette.warn));
        assert_eq!(t.load_style(90.0).fg, Some(t.palette.error));
    }
}
