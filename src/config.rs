use core::fmt;

use embedded_graphics::pixelcolor::Rgb888;

use crate::grid::MAX_GRID_SIZE;

/// Dot and line colors for every rendered state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternPalette {
    pub dot: Rgb888,
    pub line: Rgb888,
    pub success_dot: Rgb888,
    pub success_line: Rgb888,
    pub error_dot: Rgb888,
    pub error_line: Rgb888,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternLockConfig {
    pub grid_size: u8,
    pub dot_radius_percent: u8,
    pub hit_radius_percent: u8,
    pub line_width: u32,
    pub min_dots: u8,
    pub max_dots: u8,
    pub reset_delay_ms: u64,
    pub animate: bool,
    pub touch_animation_ms: u64,
    pub touch_animation_grow_percent: u8,
    pub palette: PatternPalette,
}

include!(concat!(env!("OUT_DIR"), "/pattern_config.rs"));

pub fn active_config() -> &'static PatternLockConfig {
    &COMPILED_CONFIG
}

impl Default for PatternLockConfig {
    fn default() -> Self {
        COMPILED_CONFIG
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    GridSize(u8),
    RadiusPercent,
    HitRadiusBelowDot,
    LineWidth,
    MinDots,
    MaxBelowMin { min: u8, max: u8 },
    MaxExceedsGrid { max: u8, dots: u16 },
    ResetDelay,
    AnimationGrow(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridSize(size) => {
                write!(f, "grid size {size} outside 2..={MAX_GRID_SIZE}")
            }
            Self::RadiusPercent => f.write_str("radius percentages must be within 1..=100"),
            Self::HitRadiusBelowDot => f.write_str("hit radius must not be smaller than dot radius"),
            Self::LineWidth => f.write_str("line width must be > 0"),
            Self::MinDots => f.write_str("minimum dot count must be > 0"),
            Self::MaxBelowMin { min, max } => {
                write!(f, "maximum dot count {max} is below minimum {min}")
            }
            Self::MaxExceedsGrid { max, dots } => {
                write!(f, "maximum dot count {max} exceeds the {dots} dots of the grid")
            }
            Self::ResetDelay => f.write_str("reset delay must be > 0"),
            Self::AnimationGrow(percent) => {
                write!(f, "animation grow {percent}% exceeds 100%")
            }
        }
    }
}

impl PatternLockConfig {
    /// Checks the same invariants the build-time compiler enforces, for
    /// configurations assembled or overridden at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_GRID_SIZE as u8).contains(&self.grid_size) {
            return Err(ConfigError::GridSize(self.grid_size));
        }
        if !(1..=100).contains(&self.dot_radius_percent)
            || !(1..=100).contains(&self.hit_radius_percent)
        {
            return Err(ConfigError::RadiusPercent);
        }
        if self.hit_radius_percent < self.dot_radius_percent {
            return Err(ConfigError::HitRadiusBelowDot);
        }
        if self.line_width == 0 {
            return Err(ConfigError::LineWidth);
        }
        if self.min_dots == 0 {
            return Err(ConfigError::MinDots);
        }
        if self.max_dots < self.min_dots {
            return Err(ConfigError::MaxBelowMin {
                min: self.min_dots,
                max: self.max_dots,
            });
        }
        let dots = self.dot_count();
        if u16::from(self.max_dots) > dots {
            return Err(ConfigError::MaxExceedsGrid {
                max: self.max_dots,
                dots,
            });
        }
        if self.reset_delay_ms == 0 {
            return Err(ConfigError::ResetDelay);
        }
        if self.touch_animation_grow_percent > 100 {
            return Err(ConfigError::AnimationGrow(
                self.touch_animation_grow_percent,
            ));
        }
        Ok(())
    }

    pub fn dot_count(&self) -> u16 {
        u16::from(self.grid_size) * u16::from(self.grid_size)
    }

    pub fn with_grid_size(mut self, grid_size: u8) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_dot_limits(mut self, min_dots: u8, max_dots: u8) -> Self {
        self.min_dots = min_dots;
        self.max_dots = max_dots;
        self
    }

    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn with_palette(mut self, palette: PatternPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_reset_delay_ms(mut self, reset_delay_ms: u64) -> Self {
        self.reset_delay_ms = reset_delay_ms;
        self
    }
}
