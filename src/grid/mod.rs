use embedded_graphics::prelude::{Point, Size};


pub const MAX_GRID_SIZE: usize = 5;
pub const MAX_DOTS: usize = MAX_GRID_SIZE * MAX_GRID_SIZE;

/// Grid position of a dot; stable for the lifetime of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DotId {
    pub row: u8,
    pub column: u8,
}

impl DotId {
    pub const fn new(row: u8, column: u8) -> Self {
        Self { row, column }
    }

    /// Row-major index within a `grid_size` x `grid_size` grid.
    pub fn index(self, grid_size: u8) -> usize {
        usize::from(self.row) * usize::from(grid_size) + usize::from(self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dot {
    pub id: DotId,
    pub center: Point,
    pub radius: u32,
    pub hit_radius: u32,
    pub touched: bool,
    pub touched_at_ms: Option<u64>,
}

impl Dot {
    fn contains(&self, point: Point) -> Option<i64> {
        let distance_sq = squared_distance(self.center, point);
        let hit = i64::from(self.hit_radius);
        (distance_sq <= hit * hit).then_some(distance_sq)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub grid_size: u8,
    pub dot_radius_percent: u8,
    pub hit_radius_percent: u8,
}

/// N x N dots laid out over the measured drawing area.
///
/// Dots are kept in row-major order, which is also the tie-break order for
/// hit testing.
#[derive(Clone, Debug)]
pub struct DotGrid {
    geometry: GridGeometry,
    bounds: Option<Size>,
    dots: heapless::Vec<Dot, MAX_DOTS>,
}

impl DotGrid {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            bounds: None,
            dots: heapless::Vec::new(),
        }
    }

    pub fn grid_size(&self) -> u8 {
        self.geometry.grid_size
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn is_built(&self) -> bool {
        !self.dots.is_empty()
    }

    pub fn dot(&self, id: DotId) -> Option<&Dot> {
        self.dots
            .get(id.index(self.geometry.grid_size))
            .filter(|dot| dot.id == id)
    }

    /// Lays the dots out for `bounds`. Returns `false` when the grid already
    /// matches these bounds or the bounds cannot hold one pixel per cell; the
    /// previous layout is kept in that case. Identities and touched flags
    /// survive a relayout; only centers and radii move.
    pub fn ensure_layout(&mut self, bounds: Size) -> bool {
        if self.bounds == Some(bounds) && self.is_built() {
            return false;
        }

        let size = u32::from(self.geometry.grid_size);
        let cell_w = bounds.width / size;
        let cell_h = bounds.height / size;
        if cell_w == 0 || cell_h == 0 {
            log::debug!(
                "pattern grid: layout {}x{} too small, keeping previous",
                bounds.width,
                bounds.height
            );
            return false;
        }
        self.bounds = Some(bounds);

        let cell_min = cell_w.min(cell_h);
        let radius = (cell_min * u32::from(self.geometry.dot_radius_percent) / 100).max(1);
        let hit_radius =
            (cell_min * u32::from(self.geometry.hit_radius_percent) / 100).max(radius);
        let keep_marks = self.dots.len() == (size * size) as usize;

        if !keep_marks {
            self.dots.clear();
        }
        for row in 0..self.geometry.grid_size {
            for column in 0..self.geometry.grid_size {
                let id = DotId::new(row, column);
                let center = Point::new(
                    (u32::from(column) * cell_w + cell_w / 2) as i32,
                    (u32::from(row) * cell_h + cell_h / 2) as i32,
                );
                if keep_marks {
                    let slot = &mut self.dots[id.index(self.geometry.grid_size)];
                    slot.center = center;
                    slot.radius = radius;
                    slot.hit_radius = hit_radius;
                } else {
                    let _ = self.dots.push(Dot {
                        id,
                        center,
                        radius,
                        hit_radius,
                        touched: false,
                        touched_at_ms: None,
                    });
                }
            }
        }
        log::debug!(
            "pattern grid: layout {}x{} cell={}x{} radius={} hit={}",
            bounds.width,
            bounds.height,
            cell_w,
            cell_h,
            radius,
            hit_radius
        );
        true
    }

    /// Nearest untouched dot whose hit radius covers `point`. Equal distances
    /// resolve to the first dot in row-major order.
    pub fn nearest_untouched(&self, point: Point) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (idx, dot) in self.dots.iter().enumerate() {
            if dot.touched {
                continue;
            }
            let Some(distance_sq) = dot.contains(point) else {
                continue;
            };
            match best {
                Some((_, best_sq)) if best_sq <= distance_sq => {}
                _ => best = Some((idx, distance_sq)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub(crate) fn mark_touched(&mut self, idx: usize, now_ms: u64) -> Option<DotId> {
        let dot = self.dots.get_mut(idx)?;
        dot.touched = true;
        dot.touched_at_ms = Some(now_ms);
        Some(dot.id)
    }

    pub fn clear_touched(&mut self) {
        for dot in &mut self.dots {
            dot.touched = false;
            dot.touched_at_ms = None;
        }
    }
}

pub(crate) fn squared_distance(a: Point, b: Point) -> i64 {
    let dx = i64::from(a.x) - i64::from(b.x);
    let dy = i64::from(a.y) - i64::from(b.y);
    dx * dx + dy * dy
}
