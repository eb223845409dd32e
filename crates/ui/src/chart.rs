//! Time-series chart drawing for the hover overlay.

use bevy_egui::egui;

use analytics::overlay::ChartSeries;

const POINT_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 170, 230);
const TREND_COLOR: egui::Color32 = egui::Color32::from_rgb(240, 170, 60);

/// Data extent `(x_min, x_max, y_min, y_max)` over raw and trend samples.
/// Flat axes are widened by one unit so scaling never divides by zero.
pub(crate) fn chart_extent(series: &ChartSeries) -> Option<(f64, f64, f64, f64)> {
    let mut samples = series.points.iter().chain(series.trend.iter());
    let &(x, y) = samples.next()?;
    let (mut x0, mut x1, mut y0, mut y1) = (x, x, y, y);
    for &(x, y) in samples {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }
    if x1 <= x0 {
        x0 -= 0.5;
        x1 += 0.5;
    }
    if y1 <= y0 {
        y0 -= 0.5;
        y1 += 0.5;
    }
    Some((x0, x1, y0, y1))
}

pub(crate) fn draw_series_chart(ui: &mut egui::Ui, series: &ChartSeries, size: egui::Vec2) {
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 2.0, egui::Color32::from_gray(24));

    let Some((x0, x1, y0, y1)) = chart_extent(series) else {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "No values in window",
            egui::FontId::proportional(11.0),
            egui::Color32::GRAY,
        );
        return;
    };

    let to_screen = |(x, y): (f64, f64)| {
        let tx = ((x - x0) / (x1 - x0)) as f32;
        let ty = ((y - y0) / (y1 - y0)) as f32;
        egui::pos2(
            rect.min.x + tx * rect.width(),
            rect.max.y - ty * rect.height(),
        )
    };

    for i in 1..4 {
        let y = rect.min.y + (i as f32 / 4.0) * rect.height();
        painter.line_segment(
            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
            egui::Stroke::new(0.3, egui::Color32::from_gray(50)),
        );
    }

    let raw: Vec<egui::Pos2> = series.points.iter().copied().map(to_screen).collect();
    for pair in raw.windows(2) {
        painter.line_segment([pair[0], pair[1]], egui::Stroke::new(1.0, POINT_COLOR));
    }
    for p in &raw {
        painter.circle_filled(*p, 2.0, POINT_COLOR);
    }

    let trend: Vec<egui::Pos2> = series.trend.iter().copied().map(to_screen).collect();
    if trend.len() >= 2 {
        painter.add(egui::Shape::line(trend, egui::Stroke::new(2.0, TREND_COLOR)));
    }
}
