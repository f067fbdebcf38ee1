//! Character-cell drawing of the sphere for the terminal front end.

use std::f64::consts::TAU;

use crate::math::Vec3;
use crate::rotation::RotationDescriptor;
use crate::view::SphereView;

const RIM: char = '.';
const GUIDE_FRONT: char = ':';
const GUIDE_BACK: char = '\'';
const AXIS: char = '-';
const ROTATION_AXIS: char = '#';
const ROTATION_ARC: char = '~';
const STATE_SHAFT: char = '*';
const STATE_TIP: char = '@';

/// A grid of characters addressed by column and row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            cells: vec![' '; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Sets one cell; anything outside the grid is clipped.
    pub fn plot(&mut self, x: isize, y: isize, ch: char) {
        if x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = ch;
        }
    }

    pub fn put_str(&mut self, x: isize, y: isize, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.plot(x + i as isize, y, ch);
        }
    }

    /// Draws a line using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, ch: char) {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(x0, y0, x1, y1) else {
            return;
        };
        let (mut x0, mut y0, x1, y1) = (
            x0.round() as isize,
            y0.round() as isize,
            x1.round() as isize,
            y1.round() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            self.plot(x0, y0, ch);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Liang-Barsky clip to one cell beyond the grid on every side, so the
    /// stepping below never walks far outside it.
    fn clip(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(f64, f64, f64, f64)> {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let (max_x, max_y) = (self.width as f64, self.height as f64);
        let (mut enter, mut exit) = (0.0f64, 1.0f64);
        for (p, q) in [
            (-dx, x0 + 1.0),
            (dx, max_x - x0),
            (-dy, y0 + 1.0),
            (dy, max_y - y0),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                enter = enter.max(t);
            } else {
                exit = exit.min(t);
            }
        }
        (enter <= exit).then(|| (x0 + enter * dx, y0 + enter * dy, x0 + exit * dx, y0 + exit * dy))
    }

    /// Cell position (fractional) of a normalized pointer coordinate.
    pub fn to_cell(&self, pointer: [f64; 2]) -> [f64; 2] {
        let span_x = self.width.saturating_sub(1) as f64;
        let span_y = self.height.saturating_sub(1) as f64;
        [
            (pointer[0] + 1.0) / 2.0 * span_x,
            (1.0 - pointer[1]) / 2.0 * span_y,
        ]
    }

    /// Normalized pointer coordinate of a cell.
    pub fn from_cell(&self, column: u16, row: u16) -> [f64; 2] {
        let span_x = self.width.saturating_sub(1).max(1) as f64;
        let span_y = self.height.saturating_sub(1).max(1) as f64;
        [
            column as f64 / span_x * 2.0 - 1.0,
            1.0 - row as f64 / span_y * 2.0,
        ]
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
    }
}

/// Projects a local-frame point to a fractional cell position.
fn project(canvas: &Canvas, view: &SphereView, local: &Vec3) -> ([f64; 2], f64) {
    let world = view.local_to_world(local);
    (canvas.to_cell(view.world_to_pointer(&world)), world[2])
}

fn draw_segment(canvas: &mut Canvas, view: &SphereView, from: &Vec3, to: &Vec3, ch: char) {
    let (a, _) = project(canvas, view, from);
    let (b, _) = project(canvas, view, to);
    canvas.draw_line(a[0], a[1], b[0], b[1], ch);
}

/// Draws the sphere outline, the guide circles, the axes, the optional
/// rotation indicator and the state vector.
pub fn draw_sphere(
    canvas: &mut Canvas,
    view: &SphereView,
    state: &Vec3,
    indicator: Option<&RotationDescriptor>,
) {
    const SAMPLES: usize = 120;

    for i in 0..SAMPLES {
        let t = i as f64 / SAMPLES as f64 * TAU;
        let (sin, cos) = t.sin_cos();
        let rim = canvas.to_cell(view.world_to_pointer(&[cos, sin, 0.0]));
        canvas.plot(rim[0].round() as isize, rim[1].round() as isize, RIM);

        for local in [[cos, sin, 0.0], [cos, 0.0, sin], [0.0, cos, sin]] {
            let (cell, depth) = project(canvas, view, &local);
            let ch = if depth >= 0.0 { GUIDE_FRONT } else { GUIDE_BACK };
            canvas.plot(cell[0].round() as isize, cell[1].round() as isize, ch);
        }
    }

    for (axis, label) in [([1.0, 0.0, 0.0], "x"), ([0.0, 1.0, 0.0], "y"), ([0.0, 0.0, 1.0], "|0>")] {
        let far = [axis[0] * 1.2, axis[1] * 1.2, axis[2] * 1.2];
        draw_segment(canvas, view, &[0.0; 3], &far, AXIS);
        let (cell, _) = project(canvas, view, &far);
        canvas.put_str(cell[0].round() as isize, cell[1].round() as isize, label);
    }
    let (south, _) = project(canvas, view, &[0.0, 0.0, -1.1]);
    canvas.put_str(south[0].round() as isize, south[1].round() as isize, "|1>");

    if let Some(rotation) = indicator {
        let a = rotation.axis;
        draw_segment(canvas, view, &[-a[0], -a[1], -a[2]], &a, ROTATION_AXIS);
        let steps = 32;
        for i in 0..=steps {
            let partial = RotationDescriptor {
                axis: a,
                angle: rotation.angle * i as f64 / steps as f64,
            };
            let (cell, _) = project(canvas, view, &partial.rotate(state));
            canvas.plot(cell[0].round() as isize, cell[1].round() as isize, ROTATION_ARC);
        }
    }

    draw_segment(canvas, view, &[0.0; 3], state, STATE_SHAFT);
    let (tip, _) = project(canvas, view, state);
    canvas.plot(tip[0].round() as isize, tip[1].round() as isize, STATE_TIP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewPreset;

    #[test]
    fn test_draw_line_horizontal_and_clipped() {
        let mut canvas = Canvas::new(5, 3);
        canvas.draw_line(-2.0, 1.0, 10.0, 1.0, '-');
        assert_eq!(canvas.rows().nth(1).unwrap(), "-----");
        assert_eq!(canvas.rows().next().unwrap(), "     ");
    }

    #[test]
    fn test_draw_line_with_huge_endpoints() {
        let mut canvas = Canvas::new(5, 3);
        canvas.draw_line(-1e12, 1.0, 1e12, 1.0, '=');
        assert_eq!(canvas.rows().nth(1).unwrap(), "=====");

        // entirely off the grid
        canvas.draw_line(-1e12, -50.0, 1e12, -40.0, '#');
        let drawn: String = canvas.rows().collect();
        assert!(!drawn.contains('#'));
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut canvas = Canvas::new(3, 3);
        canvas.draw_line(0.0, 0.0, 2.0, 2.0, '\\');
        assert_eq!(canvas.cell(0, 0), Some('\\'));
        assert_eq!(canvas.cell(1, 1), Some('\\'));
        assert_eq!(canvas.cell(2, 2), Some('\\'));
        assert_eq!(canvas.cell(2, 0), Some(' '));
        assert_eq!(canvas.cell(3, 0), None);
    }

    #[test]
    fn test_cell_mapping_round_trip() {
        let canvas = Canvas::new(41, 21);
        let pointer = canvas.from_cell(30, 5);
        let cell = canvas.to_cell(pointer);
        assert!((cell[0] - 30.0).abs() < 1e-9);
        assert!((cell[1] - 5.0).abs() < 1e-9);
        assert_eq!(canvas.from_cell(20, 10), [0.0, 0.0]);
    }

    #[test]
    fn test_state_tip_is_drawn() {
        let mut canvas = Canvas::new(41, 21);
        let mut view = SphereView::default();
        view.set_preset(ViewPreset::Zero);
        draw_sphere(&mut canvas, &view, &[1.0, 0.0, 0.0], None);
        let drawn: String = canvas.rows().collect();
        assert!(drawn.contains(STATE_TIP));
        assert!(drawn.contains(RIM));
        assert!(!drawn.contains(ROTATION_AXIS));
    }

    #[test]
    fn test_indicator_is_drawn() {
        let mut canvas = Canvas::new(41, 21);
        let view = SphereView::default();
        let indicator = RotationDescriptor {
            axis: [1.0, 0.0, 0.0],
            angle: std::f64::consts::PI,
        };
        draw_sphere(&mut canvas, &view, &[0.0, 0.0, 1.0], Some(&indicator));
        let drawn: String = canvas.rows().collect();
        assert!(drawn.contains(ROTATION_ARC));
        assert!(drawn.contains(ROTATION_AXIS));
    }
}
