//! Oscilloscope widget for ratatui

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Widget},
};

/// Min/max envelope of a sample window, one column per cell
pub struct Scope<'a> {
    samples: &'a [f32],
    gain: f32,
    style: Style,
    block: Option<Block<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self {
            samples,
            gain: 1.0,
            style: Style::default(),
            block: None,
        }
    }

    /// Vertical zoom; the bus output rarely reaches full scale
    pub fn gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Smallest and largest sample of the window for column `col`
    fn column_range(&self, col: usize, width: usize) -> (f32, f32) {
        let len = self.samples.len();
        let start = col * len / width;
        let end = ((col + 1) * len / width).max(start + 1).min(len);
        self.samples[start..end]
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)))
    }

    fn render_scope(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width as usize;
        let rows = area.height as f32 - 1.0;
        let mid = area.y + area.height / 2;

        for x in area.x..area.right() {
            buf.set_string(x, mid, "─", Style::default());
        }
        if self.samples.is_empty() {
            return;
        }

        // Row for a sample value: +1 at the top edge, -1 at the bottom.
        let row = |v: f32| {
            let v = (v * self.gain).clamp(-1.0, 1.0);
            area.y + ((1.0 - v) / 2.0 * rows).round() as u16
        };

        for col in 0..width {
            let (lo, hi) = self.column_range(col, width);
            let x = area.x + col as u16;
            for y in row(hi)..=row(lo) {
                buf.set_string(x, y, "│", self.style);
            }
        }
    }
}

impl Widget for Scope<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        self.render_scope(inner, buf);
    }
}
