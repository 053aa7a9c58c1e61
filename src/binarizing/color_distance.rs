use image::Rgb;

/// Computes how different two colors are. Implementations must return a
/// non-negative value, and zero for identical colors.
pub trait ColorDistanceFinder {
    fn distance(&self, a: Rgb<u8>, b: Rgb<u8>) -> f64;
}

/// Straight-line distance between two colors in RGB space:
/// `sqrt((r1 - r2)^2 + (g1 - g2)^2 + (b1 - b2)^2)`
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanColorDistance;

impl ColorDistanceFinder for EuclideanColorDistance {
    fn distance(&self, a: Rgb<u8>, b: Rgb<u8>) -> f64 {
        let sum_sq = a
            .0
            .iter()
            .zip(b.0.iter())
            .map(|(&ca, &cb)| {
                let d = f64::from(ca) - f64::from(cb);
                d * d
            })
            .sum::<f64>();

        sum_sq.sqrt()
    }
}

impl<F> ColorDistanceFinder for F
where
    F: Fn(Rgb<u8>, Rgb<u8>) -> f64,
{
    fn distance(&self, a: Rgb<u8>, b: Rgb<u8>) -> f64 {
        self(a, b)
    }
}

/// Split a 24-bit `0xRRGGBB` value into its channels. Bits above the lowest 24 are ignored.
#[must_use]
pub fn rgb_from_hex(hex: u32) -> Rgb<u8> {
    let [_, r, g, b] = hex.to_be_bytes();
    Rgb([r, g, b])
}

/// Pack a color into a 24-bit `0xRRGGBB` value.
#[must_use]
pub fn rgb_to_hex(color: Rgb<u8>) -> u32 {
    let Rgb([r, g, b]) = color;
    u32::from_be_bytes([0, r, g, b])
}
