//! 3×3 zone grid with a position marker

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};

use crate::control::ModulationVector;
use crate::mapping::Zone;

pub struct ZoneGrid<'a> {
    position: ModulationVector,
    block: Option<Block<'a>>,
}

impl<'a> ZoneGrid<'a> {
    pub fn new(position: ModulationVector) -> Self {
        Self {
            position,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_grid(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let current = self.position.zone();

        for (row, zones) in Zone::GRID.iter().enumerate() {
            for (col, &zone) in zones.iter().enumerate() {
                let cell = cell_rect(area, row, col);
                let style = if Some(zone) == current {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                buf.set_style(cell, style);

                let label = zone.label();
                let width = label.chars().count() as u16;
                if width <= cell.width {
                    let x = cell.x + (cell.width - width) / 2;
                    let y = cell.y + cell.height / 2;
                    buf.set_string(x, y, label, style.add_modifier(Modifier::BOLD));
                }
            }
        }

        // Over a label the marker only recolors the glyph it sits on.
        let (x, y) = marker_cell(area, self.position);
        let cell = &mut buf[(x, y)];
        if cell.symbol() == " " {
            cell.set_symbol("●").set_fg(Color::Yellow);
        } else {
            cell.set_fg(Color::Black).set_bg(Color::Yellow);
        }
    }
}

/// Area of grid cell (`row`, `col`), splitting any remainder evenly
fn cell_rect(area: Rect, row: usize, col: usize) -> Rect {
    let edge = |start: u16, len: u16, i: usize| start + (len as usize * i / 3) as u16;
    let x0 = edge(area.x, area.width, col);
    let x1 = edge(area.x, area.width, col + 1);
    let y0 = edge(area.y, area.height, row);
    let y1 = edge(area.y, area.height, row + 1);
    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Terminal cell under a modulation position; +y is up
fn marker_cell(area: Rect, position: ModulationVector) -> (u16, u16) {
    let span = |len: u16, v: f64| ((v + 1.0) / 2.0 * f64::from(len - 1)).round() as u16;
    (
        area.x + span(area.width, position.x()),
        area.y + span(area.height, -position.y()),
    )
}

impl Widget for ZoneGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        self.render_grid(inner, buf);
    }
}
