// @generated by pattern_config_compiler. Do not edit.
pub const COMPILED_CONFIG: PatternLockConfig = PatternLockConfig {
    grid_size: 3,
    dot_radius_percent: 12,
    hit_radius_percent: 35,
    line_width: 6,
    min_dots: 4,
    max_dots: 9,
    reset_delay_ms: 1000,
    animate: true,
    touch_animation_ms: 150,
    touch_animation_grow_percent: 50,
    palette: PatternPalette {
        dot: Rgb888::new(0x44, 0x44, 0x44),
        line: Rgb888::new(0x44, 0x44, 0x44),
        success_dot: Rgb888::new(0x00, 0x00, 0xFF),
        success_line: Rgb888::new(0x00, 0x00, 0xFF),
        error_dot: Rgb888::new(0xFF, 0x00, 0x00),
        error_line: Rgb888::new(0xFF, 0x00, 0x00),
    },
};
