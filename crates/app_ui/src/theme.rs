//! Application theming

use egui::{Color32, Rounding, Stroke, Visuals};

/// Application theme
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    /// Window background behind the content cards
    pub background: Color32,
    /// Cards, tables, sidebar
    pub surface: Color32,
    pub border: Color32,
    pub text: Color32,
    pub text_secondary: Color32,
    pub accent: Color32,
    /// Tinted fill for accent buttons and the active sidebar entry
    pub accent_soft: Color32,
    pub error: Color32,
}

impl Theme {
    /// Light theme (default)
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF5, 0xF6, 0xFA),
            surface: Color32::WHITE,
            border: Color32::from_rgb(0xE8, 0xE9, 0xEF),
            text: Color32::from_rgb(0x2D, 0x37, 0x48),
            text_secondary: Color32::from_rgb(0x6B, 0x72, 0x80),
            accent: Color32::from_rgb(0x6C, 0x5C, 0xE7),
            accent_soft: Color32::from_rgb(0xF7, 0xF7, 0xFF),
            error: Color32::from_rgb(0xEF, 0x44, 0x44),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(24, 24, 30),
            surface: Color32::from_rgb(36, 36, 44),
            border: Color32::from_rgb(58, 58, 70),
            text: Color32::from_rgb(236, 236, 242),
            text_secondary: Color32::from_rgb(160, 162, 176),
            accent: Color32::from_rgb(0xA2, 0x9B, 0xFE),
            accent_soft: Color32::from_rgb(48, 44, 80),
            error: Color32::from_rgb(0xF8, 0x71, 0x71),
        }
    }

    /// Apply theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let mut visuals = if self.is_dark() {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.panel_fill = self.background;
        visuals.window_fill = self.surface;
        visuals.window_stroke = Stroke::new(1.0, self.border);
        visuals.extreme_bg_color = self.surface;
        visuals.faint_bg_color = self.background;
        visuals.override_text_color = Some(self.text);
        visuals.hyperlink_color = self.accent;
        visuals.error_fg_color = self.error;

        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.inactive.weak_bg_fill = self.surface;
        visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.hovered.weak_bg_fill = self.accent_soft;
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);
        visuals.widgets.active.weak_bg_fill = self.accent_soft;

        for widget in [
            &mut visuals.widgets.inactive,
            &mut visuals.widgets.hovered,
            &mut visuals.widgets.active,
        ] {
            widget.rounding = Rounding::same(6.0);
        }

        visuals.selection.bg_fill = self.accent.linear_multiply(0.25);
        visuals.selection.stroke.color = self.accent;

        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        ctx.set_style(style);
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    /// Get theme by name; anything but `dark` is the light theme
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    /// Clear color for the render pass
    pub fn clear_color(&self) -> [f64; 4] {
        let [r, g, b, a] = self.background.to_normalized_gamma_f32();
        [r as f64, g as f64, b as f64, a as f64]
    }

    /// Parse a hex color string
    pub fn parse_color(hex: &str) -> Option<Color32> {
        let hex = hex.trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color32::from_rgba_unmultiplied(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_defaults_to_light() {
        assert_eq!(Theme::by_name("DARK").name, "dark");
        assert_eq!(Theme::by_name("light").name, "light");
        assert_eq!(Theme::by_name("solarized").name, "light");
        assert_eq!(Theme::default(), Theme::light());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(Theme::parse_color("#6C5CE7"), Some(Theme::light().accent));
        assert_eq!(
            Theme::parse_color("80FF0000"),
            Some(Color32::from_rgba_unmultiplied(255, 0, 0, 128))
        );
        assert_eq!(Theme::parse_color("#12345"), None);
        assert_eq!(Theme::parse_color("zzzzzz"), None);
    }
}
