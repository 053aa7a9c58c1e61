use centroid_finder::rgb_from_hex;
use image::Rgb;

use crate::app::*;

/// Parse a target color given as `#RRGGBB`, `0xRRGGBB`, `0XRRGGBB` or bare `RRGGBB`.
/// Fewer than six digits are allowed and are zero-extended on the left, so `#FF` is pure blue.
pub fn parse_hex_color(arg: &str) -> Result<Rgb<u8>, AppError> {
    let trimmed = arg.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let well_formed = (1..=6).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if !well_formed {
        return Err(AppError::BadColor(arg.to_string()));
    }

    u32::from_str_radix(digits, 16)
        .map(rgb_from_hex)
        .map_err(|_| AppError::BadColor(arg.to_string()))
}

/// Parse a distance threshold. Only non-negative decimal integers are accepted.
pub fn parse_threshold(arg: &str) -> Result<u32, AppError> {
    arg.trim()
        .parse::<u32>()
        .map_err(|_| AppError::BadThreshold(arg.to_string()))
}
