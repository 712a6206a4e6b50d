use std::io::Write;

use crate::error::Result;
use crate::geometry::{Frame, Size};
use crate::layout::{ResolvedLayout, Visibility};
use crate::width::{display_width, truncate_to_width};

/// Preview parameters.
#[derive(Debug, Clone)]
pub struct PreviewSettings {
    /// Layout units per character cell. Zero is treated as one.
    pub scale: i32,
    pub show_labels: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            scale: 1,
            show_labels: true,
        }
    }
}

/// Draws resolved frames as ASCII outlines. Later elements are drawn over
/// earlier ones; gone and invisible elements are skipped.
pub struct FramePreview {
    settings: PreviewSettings,
}

impl FramePreview {
    pub fn new(settings: PreviewSettings) -> Self {
        Self { settings }
    }

    pub fn with_default() -> Self {
        Self::new(PreviewSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut PreviewSettings {
        &mut self.settings
    }

    /// Render to lines with trailing blanks trimmed.
    pub fn render(&self, resolved: &ResolvedLayout, container: Size) -> Vec<String> {
        let scale = self.settings.scale.max(1);
        let cols = cell_count(container.width, scale);
        let rows = cell_count(container.height, scale);

        // `None` marks the second cell of a double-width character.
        let mut grid: Vec<Vec<Option<char>>> = vec![vec![Some(' '); cols]; rows];

        for (id, frame) in resolved.iter() {
            if resolved.visibility(id) != Some(Visibility::Visible) || frame.is_empty() {
                continue;
            }
            let cells = scaled(frame, scale);
            draw_outline(&mut grid, cells);
            if self.settings.show_labels {
                draw_label(&mut grid, cells, &resolved.label(id));
            }
        }

        grid.into_iter()
            .map(|row| {
                let line: String = row.into_iter().flatten().collect();
                line.trim_end().to_string()
            })
            .collect()
    }

    pub fn write_to(
        &self,
        writer: &mut impl Write,
        resolved: &ResolvedLayout,
        container: Size,
    ) -> Result<()> {
        for line in self.render(resolved, container) {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn cell_count(extent: i32, scale: i32) -> usize {
    usize::try_from(extent.max(0).div_euclid(scale)).unwrap_or(0)
}

fn scaled(frame: Frame, scale: i32) -> Frame {
    Frame::new(
        frame.left.div_euclid(scale),
        frame.top.div_euclid(scale),
        frame.right.div_euclid(scale),
        frame.bottom.div_euclid(scale),
    )
}

fn cell_mut(grid: &mut [Vec<Option<char>>], x: i32, y: i32) -> Option<&mut Option<char>> {
    let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
    grid.get_mut(y)?.get_mut(x)
}

fn put(grid: &mut [Vec<Option<char>>], x: i32, y: i32, ch: char) {
    if let Some(cell) = cell_mut(grid, x, y) {
        *cell = Some(ch);
    }
}

fn draw_outline(grid: &mut [Vec<Option<char>>], cells: Frame) {
    let (x0, y0) = (cells.left, cells.top);
    let (x1, y1) = (cells.right - 1, cells.bottom - 1);
    if x1 < x0 || y1 < y0 {
        return;
    }

    for y in y0..=y1 {
        for x in x0..=x1 {
            let on_x_edge = x == x0 || x == x1;
            let on_y_edge = y == y0 || y == y1;
            let ch = match (on_x_edge, on_y_edge) {
                (true, true) => '+',
                (false, true) => '-',
                (true, false) => '|',
                (false, false) => continue,
            };
            put(grid, x, y, ch);
        }
    }
}

fn draw_label(grid: &mut [Vec<Option<char>>], cells: Frame, label: &str) {
    let room = usize::try_from(cells.width() - 2).unwrap_or(0);
    if room == 0 {
        return;
    }
    let text = truncate_to_width(label, room);

    let mut x = cells.left + 1;
    for ch in text.chars() {
        let w = display_width(ch.encode_utf8(&mut [0u8; 4])) as i32;
        put(grid, x, cells.top, ch);
        if w == 2 {
            if let Some(cell) = cell_mut(grid, x + 1, cells.top) {
                *cell = None;
            }
        }
        x += w.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutParams, ParentVerb, RelativeLayout, Rule};

    #[test]
    fn single_box_with_label() {
        let mut layout = RelativeLayout::new(Size::new(10, 4));
        layout.add_named("ab", LayoutParams::exact(6, 3)).unwrap();
        let resolved = layout.resolve().unwrap();

        let lines = FramePreview::with_default().render(&resolved, layout.size());
        assert_eq!(lines, vec!["+ab--+", "|    |", "+----+", ""]);
    }

    #[test]
    fn later_elements_draw_on_top_and_labels_truncate() {
        let mut layout = RelativeLayout::new(Size::new(8, 3));
        layout
            .add_named("background", LayoutParams::exact(8, 3))
            .unwrap();
        layout
            .add_named(
                "x",
                LayoutParams::exact(3, 3).with_rule(Rule::Parent(ParentVerb::AlignParentRight)),
            )
            .unwrap();
        let resolved = layout.resolve().unwrap();

        let lines = FramePreview::with_default().render(&resolved, layout.size());
        assert_eq!(lines, vec!["+back+x+", "|    | |", "+----+-+"]);
    }

    #[test]
    fn scale_divides_coordinates() {
        let mut layout = RelativeLayout::new(Size::new(40, 20));
        layout.add(LayoutParams::exact(20, 10));
        let resolved = layout.resolve().unwrap();

        let mut preview = FramePreview::with_default();
        preview.settings_mut().scale = 10;
        preview.settings_mut().show_labels = false;
        assert_eq!(preview.render(&resolved, layout.size()), vec!["++", ""]);
    }

    #[test]
    fn write_to_emits_one_line_per_row() {
        let mut layout = RelativeLayout::new(Size::new(3, 2));
        layout.add(LayoutParams::exact(3, 2));
        let resolved = layout.resolve().unwrap();

        let mut out = Vec::new();
        FramePreview::with_default()
            .write_to(&mut out, &resolved, layout.size())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "+#+\n+-+\n");
    }
}
