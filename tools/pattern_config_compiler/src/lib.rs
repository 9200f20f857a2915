use std::{fmt, fs, path::Path};

use serde::Deserialize;

pub const MAX_GRID_SIZE: u8 = 5;

#[derive(Debug)]
pub enum ConfigCompilerError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigCompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigCompilerError {}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternFile {
    pub grid: GridSection,
    pub pattern: PatternSection,
    pub animation: AnimationSection,
    pub palette: PaletteSection,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    pub size: u8,
    pub dot_radius_percent: u8,
    pub hit_radius_percent: u8,
    pub line_width: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSection {
    pub min_dots: u8,
    pub max_dots: u8,
    pub reset_delay_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationSection {
    pub enabled: bool,
    pub touch_animation_ms: u64,
    pub touch_animation_grow_percent: u8,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaletteSection {
    pub dot: String,
    pub line: String,
    pub success_dot: String,
    pub success_line: String,
    pub error_dot: String,
    pub error_line: String,
}

impl PaletteSection {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("dot", &self.dot),
            ("line", &self.line),
            ("success_dot", &self.success_dot),
            ("success_line", &self.success_line),
            ("error_dot", &self.error_dot),
            ("error_line", &self.error_line),
        ]
    }
}

pub fn parse_pattern_file(path: &Path) -> Result<PatternFile, ConfigCompilerError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ConfigCompilerError::Io(format!("failed to read {}: {e}", path.display())))?;
    parse_pattern_str(&raw)
}

pub fn parse_pattern_str(raw: &str) -> Result<PatternFile, ConfigCompilerError> {
    toml::from_str(raw).map_err(|e| ConfigCompilerError::Parse(e.to_string()))
}

pub fn validate_config(config: &PatternFile) -> Result<(), ConfigCompilerError> {
    let grid = &config.grid;
    if !(2..=MAX_GRID_SIZE).contains(&grid.size) {
        return Err(validation(format!(
            "grid.size must be within 2..={MAX_GRID_SIZE}"
        )));
    }
    if !(1..=100).contains(&grid.dot_radius_percent) || !(1..=100).contains(&grid.hit_radius_percent)
    {
        return Err(validation(
            "grid radius percentages must be within 1..=100".into(),
        ));
    }
    if grid.hit_radius_percent < grid.dot_radius_percent {
        return Err(validation(
            "grid.hit_radius_percent must be >= grid.dot_radius_percent".into(),
        ));
    }
    if grid.line_width == 0 {
        return Err(validation("grid.line_width must be > 0".into()));
    }

    let pattern = &config.pattern;
    let dot_count = u16::from(grid.size) * u16::from(grid.size);
    if pattern.min_dots == 0 {
        return Err(validation("pattern.min_dots must be > 0".into()));
    }
    if pattern.max_dots < pattern.min_dots {
        return Err(validation(
            "pattern.max_dots must be >= pattern.min_dots".into(),
        ));
    }
    if u16::from(pattern.max_dots) > dot_count {
        return Err(validation(format!(
            "pattern.max_dots must be <= {dot_count} for a {0}x{0} grid",
            grid.size
        )));
    }
    if pattern.reset_delay_ms == 0 {
        return Err(validation("pattern.reset_delay_ms must be > 0".into()));
    }

    if config.animation.touch_animation_grow_percent > 100 {
        return Err(validation(
            "animation.touch_animation_grow_percent must be <= 100".into(),
        ));
    }

    for (name, value) in config.palette.entries() {
        if parse_hex_color(value).is_none() {
            return Err(validation(format!(
                "palette.{name} must be a #RRGGBB color, got `{value}`"
            )));
        }
    }

    Ok(())
}

pub fn render_generated_config(config: &PatternFile) -> String {
    let mut out = String::new();
    out.push_str("// @generated by pattern_config_compiler. Do not edit.\n");
    out.push_str("pub const COMPILED_CONFIG: PatternLockConfig = PatternLockConfig {\n");
    out.push_str(&format!("    grid_size: {},\n", config.grid.size));
    out.push_str(&format!(
        "    dot_radius_percent: {},\n",
        config.grid.dot_radius_percent
    ));
    out.push_str(&format!(
        "    hit_radius_percent: {},\n",
        config.grid.hit_radius_percent
    ));
    out.push_str(&format!("    line_width: {},\n", config.grid.line_width));
    out.push_str(&format!("    min_dots: {},\n", config.pattern.min_dots));
    out.push_str(&format!("    max_dots: {},\n", config.pattern.max_dots));
    out.push_str(&format!(
        "    reset_delay_ms: {},\n",
        config.pattern.reset_delay_ms
    ));
    out.push_str(&format!("    animate: {},\n", config.animation.enabled));
    out.push_str(&format!(
        "    touch_animation_ms: {},\n",
        config.animation.touch_animation_ms
    ));
    out.push_str(&format!(
        "    touch_animation_grow_percent: {},\n",
        config.animation.touch_animation_grow_percent
    ));
    out.push_str("    palette: PatternPalette {\n");
    for (name, value) in config.palette.entries() {
        let (r, g, b) = parse_hex_color(value).unwrap_or((0, 0, 0));
        out.push_str(&format!(
            "        {name}: Rgb888::new(0x{r:02X}, 0x{g:02X}, 0x{b:02X}),\n"
        ));
    }
    out.push_str("    },\n");
    out.push_str("};\n");
    out
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let config = parse_pattern_file(path)?;
    validate_config(&config)?;
    Ok(render_generated_config(&config))
}

pub fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

fn validation(msg: String) -> ConfigCompilerError {
    ConfigCompilerError::Validation(msg)
}
