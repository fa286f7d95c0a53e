//! Neon-on-charcoal color tokens for the chart viewer.
//!
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (title, borders)
//! - **Muted**: steel blue (axes, hints)
//! - **Lines**: a fixed palette cycled by line index

use ratatui::style::{Color, Style};

/// Colors assigned to chart lines, in line order.
const LINE_PALETTE: [Color; 10] = [
    Color::Rgb(0, 255, 255),   // cyan
    Color::Rgb(255, 20, 147),  // hot pink
    Color::Rgb(0, 255, 128),   // neon green
    Color::Rgb(255, 140, 0),   // orange
    Color::Rgb(147, 112, 219), // purple
    Color::Rgb(255, 255, 0),   // yellow
    Color::Rgb(30, 144, 255),  // dodger blue
    Color::Rgb(255, 99, 71),   // tomato
    Color::Rgb(64, 224, 208),  // turquoise
    Color::Rgb(218, 112, 214), // orchid
];

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub muted: Color,
    pub text_primary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
        }
    }

    /// Color for the line at `index`; wraps after the palette is exhausted.
    pub fn line_color(&self, index: usize) -> Color {
        LINE_PALETTE[index % LINE_PALETTE.len()]
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
