// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Connected component labelling over binary score maps

/// Pixel neighbourhood used when growing a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

/// A connected region of set pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Pixel coordinates `(x, y)` belonging to the region
    pub pixels: Vec<(usize, usize)>,
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl Component {
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// Mean of `values` (row-major, `stride` wide) over the region
    pub fn mean_of(&self, values: &[f32], stride: usize) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.pixels.iter().map(|&(x, y)| values[y * stride + x]).sum();
        sum / self.pixels.len() as f32
    }
}

/// Label connected regions of `mask` (row-major, `width` x `height`)
///
/// Components are returned in scan order of their first pixel.
pub fn label(mask: &[bool], width: usize, height: usize, connectivity: Connectivity) -> Vec<Component> {
    let mut visited = vec![false; mask.len()];
    let mut components = Vec::new();

    for start in 0..mask.len().min(width * height) {
        if !mask[start] || visited[start] {
            continue;
        }

        let (sx, sy) = (start % width, start / width);
        let mut component = Component {
            pixels: Vec::new(),
            min_x: sx,
            max_x: sx,
            min_y: sy,
            max_y: sy,
        };

        visited[start] = true;
        let mut stack = vec![(sx, sy)];

        while let Some((x, y)) = stack.pop() {
            component.pixels.push((x, y));
            component.min_x = component.min_x.min(x);
            component.max_x = component.max_x.max(x);
            component.min_y = component.min_y.min(y);
            component.max_y = component.max_y.max(y);

            for (nx, ny) in neighbours(x, y, width, height, connectivity) {
                let idx = ny * width + nx;
                if mask[idx] && !visited[idx] {
                    visited[idx] = true;
                    stack.push((nx, ny));
                }
            }
        }

        components.push(component);
    }

    components
}

fn neighbours(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    connectivity: Connectivity,
) -> impl Iterator<Item = (usize, usize)> {
    const FOUR: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    const EIGHT: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    let offsets: &'static [(i64, i64)] = match connectivity {
        Connectivity::Four => &FOUR,
        Connectivity::Eight => &EIGHT,
    };

    offsets.iter().filter_map(move |&(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
            Some((nx as usize, ny as usize))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> (Vec<bool>, usize, usize) {
        let width = rows[0].len();
        let mask = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        (mask, width, rows.len())
    }

    #[test]
    fn test_diagonal_pixels_depend_on_connectivity() {
        let (mask, w, h) = mask_from(&["#..", ".#.", "..#"]);
        assert_eq!(label(&mask, w, h, Connectivity::Four).len(), 3);
        assert_eq!(label(&mask, w, h, Connectivity::Eight).len(), 1);
    }

    #[test]
    fn test_component_bounds() {
        let (mask, w, h) = mask_from(&[".....", ".###.", ".##..", "....#"]);
        let components = label(&mask, w, h, Connectivity::Four);
        assert_eq!(components.len(), 2);

        let first = &components[0];
        assert_eq!(first.size(), 5);
        assert_eq!((first.min_x, first.max_x, first.min_y, first.max_y), (1, 3, 1, 2));
        assert_eq!((first.width(), first.height()), (3, 2));

        let second = &components[1];
        assert_eq!((second.min_x, second.min_y), (4, 3));
    }

    #[test]
    fn test_mean_of() {
        let (mask, w, h) = mask_from(&["##", ".."]);
        let values = [0.5, 1.0, 9.0, 9.0];
        let components = label(&mask, w, h, Connectivity::Four);
        assert!((components[0].mean_of(&values, w) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_empty_mask() {
        let mask = vec![false; 16];
        assert!(label(&mask, 4, 4, Connectivity::Eight).is_empty());
    }
}
