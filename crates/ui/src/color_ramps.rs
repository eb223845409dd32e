//! Color ramps for the map layers and legend.
//!
//! The continuous ramp is viridis sampled at nine stops and interpolated in
//! sRGB. Categorical levels cycle through a ten-color qualitative palette.

use bevy_egui::egui;

use analytics::aggregation::Domain;

/// A continuous ramp of evenly spaced sRGB stops over `t` in `[0, 1]`.
pub struct ColorRamp {
    stops: &'static [[u8; 3]],
}

impl ColorRamp {
    pub fn sample(&self, t: f32) -> egui::Color32 {
        let n = self.stops.len();
        match n {
            0 => return egui::Color32::BLACK,
            1 => {
                let [r, g, b] = self.stops[0];
                return egui::Color32::from_rgb(r, g, b);
            }
            _ => {}
        }
        let scaled = t.clamp(0.0, 1.0) * (n - 1) as f32;
        let lo = (scaled as usize).min(n - 2);
        let frac = scaled - lo as f32;
        let (a, b) = (self.stops[lo], self.stops[lo + 1]);
        let lerp = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * frac).round() as u8;
        egui::Color32::from_rgb(lerp(0), lerp(1), lerp(2))
    }
}

pub static VIRIDIS: ColorRamp = ColorRamp {
    stops: &[
        [68, 1, 84],
        [71, 44, 122],
        [59, 81, 139],
        [44, 113, 142],
        [33, 144, 141],
        [39, 173, 129],
        [92, 200, 99],
        [170, 220, 50],
        [253, 231, 37],
    ],
};

pub const CATEGORICAL: [egui::Color32; 10] = [
    egui::Color32::from_rgb(78, 121, 167),
    egui::Color32::from_rgb(242, 142, 43),
    egui::Color32::from_rgb(225, 87, 89),
    egui::Color32::from_rgb(118, 183, 178),
    egui::Color32::from_rgb(89, 161, 79),
    egui::Color32::from_rgb(237, 201, 72),
    egui::Color32::from_rgb(176, 122, 161),
    egui::Color32::from_rgb(255, 157, 167),
    egui::Color32::from_rgb(156, 117, 95),
    egui::Color32::from_rgb(186, 176, 172),
];

/// Shown for buckets the current domain cannot place.
pub const NO_DATA: egui::Color32 = egui::Color32::from_gray(70);

pub fn category_color(level: usize) -> egui::Color32 {
    CATEGORICAL[level % CATEGORICAL.len()]
}

/// Color for an aggregated value under the current color domain.
pub fn color_for(value: f64, domain: Option<&Domain>) -> egui::Color32 {
    match domain {
        None => NO_DATA,
        Some(Domain::Categorical { .. }) if value.is_finite() && value >= 0.0 => {
            category_color(value as usize)
        }
        Some(Domain::Categorical { .. }) => NO_DATA,
        Some(numeric) => VIRIDIS.sample(numeric.normalize(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(VIRIDIS.sample(0.0), egui::Color32::from_rgb(68, 1, 84));
        assert_eq!(VIRIDIS.sample(1.0), egui::Color32::from_rgb(253, 231, 37));
    }

    #[test]
    fn test_ramp_clamps_out_of_range() {
        assert_eq!(VIRIDIS.sample(-3.0), VIRIDIS.sample(0.0));
        assert_eq!(VIRIDIS.sample(7.0), VIRIDIS.sample(1.0));
    }

    #[test]
    fn test_category_colors_cycle() {
        assert_eq!(category_color(0), category_color(CATEGORICAL.len()));
        assert_ne!(category_color(0), category_color(1));
    }

    #[test]
    fn test_color_for_without_domain_is_no_data() {
        assert_eq!(color_for(5.0, None), NO_DATA);
    }

    #[test]
    fn test_color_for_numeric_domain() {
        let domain = Domain::Numeric {
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(color_for(10.0, Some(&domain)), VIRIDIS.sample(1.0));
        assert_eq!(color_for(-5.0, Some(&domain)), VIRIDIS.sample(0.0));
    }

    #[test]
    fn test_color_for_categorical_domain() {
        let domain = Domain::Categorical { level_count: 3 };
        assert_eq!(color_for(2.0, Some(&domain)), category_color(2));
    }
}
