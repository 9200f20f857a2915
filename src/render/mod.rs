use embedded_graphics::{
    pixelcolor::{PixelColor, Rgb888},
    prelude::{DrawTarget, Point, Primitive},
    primitives::{Circle, Line, PrimitiveStyle},
    Drawable,
};

use crate::{
    config::PatternLockConfig,
    grid::{Dot, DotGrid},
    pattern::{PatternPath, PatternViewState},
};


/// Read-only view of one frame: dots first, then the connecting lines, then
/// the live trail to the pointer while a gesture is in progress.
pub struct PatternRenderer<'a> {
    grid: &'a DotGrid,
    path: &'a PatternPath,
    state: PatternViewState,
    config: &'a PatternLockConfig,
    pointer: Option<Point>,
    now_ms: u64,
}

impl<'a> PatternRenderer<'a> {
    pub fn new(
        grid: &'a DotGrid,
        path: &'a PatternPath,
        state: PatternViewState,
        config: &'a PatternLockConfig,
        pointer: Option<Point>,
        now_ms: u64,
    ) -> Self {
        Self {
            grid,
            path,
            state,
            config,
            pointer,
            now_ms,
        }
    }

    pub fn draw<D, C>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
        C: PixelColor + From<Rgb888>,
    {
        let (touched_color, line_color) = self.state.colors(&self.config.palette);
        let rest_style = PrimitiveStyle::with_fill(C::from(self.config.palette.dot));
        let touched_style = PrimitiveStyle::with_fill(C::from(touched_color));

        for dot in self.grid.dots() {
            let style = if dot.touched { touched_style } else { rest_style };
            Circle::with_center(dot.center, self.radius_of(dot) * 2)
                .into_styled(style)
                .draw(target)?;
        }

        let line_style = PrimitiveStyle::with_stroke(C::from(line_color), self.config.line_width);
        let mut previous: Option<Point> = None;
        for id in self.path.marked() {
            let Some(dot) = self.grid.dot(*id) else {
                continue;
            };
            if let Some(from) = previous {
                Line::new(from, dot.center)
                    .into_styled(line_style)
                    .draw(target)?;
            }
            previous = Some(dot.center);
        }

        if self.state == PatternViewState::Started {
            if let (Some(from), Some(to)) = (previous, self.pointer) {
                Line::new(from, to).into_styled(line_style).draw(target)?;
            }
        }
        Ok(())
    }

    /// `true` while any touched dot is still growing back to rest size.
    pub fn animating(&self) -> bool {
        self.grid
            .dots()
            .iter()
            .any(|dot| self.animation_remaining_ms(dot).is_some())
    }

    /// Visual radius of `dot` at this frame's time.
    pub fn radius_of(&self, dot: &Dot) -> u32 {
        let Some(remaining) = self.animation_remaining_ms(dot) else {
            return dot.radius;
        };
        let grow = u64::from(dot.radius) * u64::from(self.config.touch_animation_grow_percent) / 100;
        let extra = grow * remaining / self.config.touch_animation_ms;
        dot.radius + extra as u32
    }

    fn animation_remaining_ms(&self, dot: &Dot) -> Option<u64> {
        if !self.config.animate
            || self.config.touch_animation_ms == 0
            || self.config.touch_animation_grow_percent == 0
        {
            return None;
        }
        let touched_at = dot.touched_at_ms.filter(|_| dot.touched)?;
        let elapsed = self.now_ms.saturating_sub(touched_at);
        (elapsed < self.config.touch_animation_ms)
            .then(|| self.config.touch_animation_ms - elapsed)
    }
}
