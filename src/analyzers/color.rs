/// Maps an average SOC to the hex color of its band.
///
/// | Range   | Color                    |
/// |---------|--------------------------|
/// | >= 80   | `#00FF00` (green)        |
/// | >= 60   | `#ADFF2F` (green-yellow) |
/// | >= 40   | `#FFD700` (yellow)       |
/// | >= 20   | `#FF8C00` (orange)       |
/// | < 20    | `#FF0000` (red)          |
pub fn soc_color(avg_soc: f64) -> &'static str {
    match avg_soc {
        s if s >= 80.0 => "#00FF00",
        s if s >= 60.0 => "#ADFF2F",
        s if s >= 40.0 => "#FFD700",
        s if s >= 20.0 => "#FF8C00",
        _ => "#FF0000",
    }
}
