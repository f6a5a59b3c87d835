//! Progress events of a registration.

/// Notification sent to the registration observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationEvent {
    /// A source plane was paired with a target plane.
    PlaneAligned {
        /// Index into the source plane list.
        source: usize,
        /// Index into the target plane list.
        target: usize,
        /// Display colour shared by both planes of the pair.
        color: [u8; 3],
    },
}

/// Distinct display colour for the `k`-th pair: hues step by the golden
/// angle so neighbouring pairs stay far apart.
///
/// ```
/// use plane_registration::pair_color;
///
/// assert_eq!(pair_color(0), pair_color(0));
/// assert_ne!(pair_color(0), pair_color(1));
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pair_color(k: usize) -> [u8; 3] {
    const GOLDEN_ANGLE: f64 = 137.507_764;
    const SATURATION: f64 = 0.75;
    const VALUE: f64 = 0.95;

    let hue = (k as f64 * GOLDEN_ANGLE) % 360.0 / 60.0;
    let chroma = VALUE * SATURATION;
    let x = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
    let (r, g, b) = match hue as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = VALUE - chroma;
    let channel = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}
