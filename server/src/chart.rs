use rocket::FromFormField;
use shared::DailyActivityPoint;
use svg::{
    node::element::{Circle, Group, Line, Polygon, Polyline, Rectangle, Text},
    Document,
};

const WIDTH: i32 = 720;
const HEIGHT: i32 = 400;
const PLOT_LEFT: f64 = 50.0;
const PLOT_TOP: f64 = 20.0;
const PLOT_RIGHT: f64 = 690.0;
const PLOT_BOTTOM: f64 = 360.0;
const PLOT_WIDTH: f64 = PLOT_RIGHT - PLOT_LEFT;
const PLOT_HEIGHT: f64 = PLOT_BOTTOM - PLOT_TOP;
const ACCENT: &str = "#1f6feb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromFormField)]
pub enum ChartKind {
    Bar,
    Line,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub kind: ChartKind,
    pub grid: bool,
    pub legend: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            kind: ChartKind::Bar,
            grid: true,
            legend: true,
        }
    }
}

impl ChartOptions {
    /// Query parameters from the chart controls form. Browsers omit
    /// unchecked checkboxes, so once the form was submitted (the chart kind
    /// is present) an absent toggle means off; before any submission the
    /// defaults apply.
    pub fn from_query(kind: Option<ChartKind>, grid: Option<bool>, legend: Option<bool>) -> Self {
        match kind {
            Some(kind) => Self {
                kind,
                grid: grid.unwrap_or(false),
                legend: legend.unwrap_or(false),
            },
            None => Self::default(),
        }
    }
}

/// Draws the daily series as an inline SVG, or nothing when there is no
/// data to chart. Text and axes use `currentColor` so the page theme styles
/// them.
pub fn render_activity_chart(
    points: &[DailyActivityPoint],
    options: &ChartOptions,
) -> Option<String> {
    if points.is_empty() {
        return None;
    }

    // A flat all-zero series still needs a frame, so the scale never
    // collapses below one.
    let max = points
        .iter()
        .map(|point| point.commits)
        .max()
        .unwrap_or(0)
        .max(1);
    let step = PLOT_WIDTH / points.len() as f64;
    let x_center = move |index: usize| PLOT_LEFT + step * (index as f64 + 0.5);
    let y_for = move |commits: u64| PLOT_BOTTOM - commits as f64 / max as f64 * PLOT_HEIGHT;

    let mut document = Document::new()
        .set("viewBox", (0, 0, WIDTH, HEIGHT))
        .set("role", "img")
        .set("font-family", "system-ui, sans-serif");

    if options.grid {
        document = document.add(grid_lines(points.len(), max, &x_center, &y_for));
    }
    document = document
        .add(axes())
        .add(y_labels(max, &y_for))
        .add(x_labels(points, &x_center));

    document = match options.kind {
        ChartKind::Bar => document.add(bar_series(points, step, &y_for)),
        ChartKind::Line => document.add(line_series(points, &x_center, &y_for)),
        ChartKind::Area => document.add(area_series(points, &x_center, &y_for)),
    };

    if options.legend {
        document = document.add(legend());
    }

    Some(document.to_string())
}

// At most one label per seventh of the series, so long series do not smear
// their dates together.
fn label_indices(count: usize) -> impl Iterator<Item = usize> {
    let interval = (count / 7).max(1);
    (0..count).step_by(interval)
}

fn ticks(max: u64) -> Vec<u64> {
    let mut values: Vec<u64> = (0..=4u64)
        .map(|tick| (max as u128 * tick as u128 / 4) as u64)
        .collect();
    values.dedup();
    values
}

fn axes() -> Group {
    Group::new()
        .set("stroke", "currentColor")
        .set("stroke-width", 1)
        .add(
            Line::new()
                .set("x1", PLOT_LEFT)
                .set("y1", PLOT_BOTTOM)
                .set("x2", PLOT_RIGHT)
                .set("y2", PLOT_BOTTOM),
        )
        .add(
            Line::new()
                .set("x1", PLOT_LEFT)
                .set("y1", PLOT_TOP)
                .set("x2", PLOT_LEFT)
                .set("y2", PLOT_BOTTOM),
        )
}

fn grid_lines(
    count: usize,
    max: u64,
    x_center: &impl Fn(usize) -> f64,
    y_for: &impl Fn(u64) -> f64,
) -> Group {
    let mut group = Group::new()
        .set("stroke", "currentColor")
        .set("stroke-dasharray", "3 3")
        .set("opacity", 0.3);
    for value in ticks(max) {
        let y = y_for(value);
        group = group.add(
            Line::new()
                .set("x1", PLOT_LEFT)
                .set("y1", y)
                .set("x2", PLOT_RIGHT)
                .set("y2", y),
        );
    }
    for index in label_indices(count) {
        let x = x_center(index);
        group = group.add(
            Line::new()
                .set("x1", x)
                .set("y1", PLOT_TOP)
                .set("x2", x)
                .set("y2", PLOT_BOTTOM),
        );
    }
    group
}

fn y_labels(max: u64, y_for: &impl Fn(u64) -> f64) -> Group {
    let mut group = Group::new()
        .set("fill", "currentColor")
        .set("font-size", 12)
        .set("text-anchor", "end");
    for value in ticks(max) {
        group = group.add(
            Text::new(value.to_string())
                .set("x", PLOT_LEFT - 8.0)
                .set("y", y_for(value) + 4.0),
        );
    }
    group
}

fn x_labels(points: &[DailyActivityPoint], x_center: &impl Fn(usize) -> f64) -> Group {
    let mut group = Group::new()
        .set("fill", "currentColor")
        .set("font-size", 12)
        .set("text-anchor", "middle");
    for index in label_indices(points.len()) {
        group = group.add(
            Text::new(points[index].date.to_string())
                .set("x", x_center(index))
                .set("y", PLOT_BOTTOM + 20.0),
        );
    }
    group
}

fn bar_series(points: &[DailyActivityPoint], step: f64, y_for: &impl Fn(u64) -> f64) -> Group {
    let width = (step * 0.8).max(1.0);
    let mut group = Group::new().set("fill", ACCENT);
    for (index, point) in points.iter().enumerate() {
        let top = y_for(point.commits);
        group = group.add(
            Rectangle::new()
                .set("x", PLOT_LEFT + step * index as f64 + (step - width) / 2.0)
                .set("y", top)
                .set("width", width)
                .set("height", PLOT_BOTTOM - top),
        );
    }
    group
}

fn line_series(
    points: &[DailyActivityPoint],
    x_center: &impl Fn(usize) -> f64,
    y_for: &impl Fn(u64) -> f64,
) -> Group {
    let mut group = Group::new().add(
        Polyline::new()
            .set("points", polyline_points(points, x_center, y_for))
            .set("fill", "none")
            .set("stroke", ACCENT)
            .set("stroke-width", 2),
    );
    for (index, point) in points.iter().enumerate() {
        group = group.add(
            Circle::new()
                .set("cx", x_center(index))
                .set("cy", y_for(point.commits))
                .set("r", 3)
                .set("fill", ACCENT),
        );
    }
    group
}

fn area_series(
    points: &[DailyActivityPoint],
    x_center: &impl Fn(usize) -> f64,
    y_for: &impl Fn(u64) -> f64,
) -> Group {
    let mut outline = polyline_points(points, x_center, y_for);
    outline.push_str(&format!(
        " {:.1},{PLOT_BOTTOM} {:.1},{PLOT_BOTTOM}",
        x_center(points.len() - 1),
        x_center(0),
    ));

    Group::new()
        .add(
            Polygon::new()
                .set("points", outline)
                .set("fill", ACCENT)
                .set("fill-opacity", 0.2),
        )
        .add(
            Polyline::new()
                .set("points", polyline_points(points, x_center, y_for))
                .set("fill", "none")
                .set("stroke", ACCENT)
                .set("stroke-width", 2),
        )
}

fn legend() -> Group {
    Group::new()
        .add(
            Rectangle::new()
                .set("x", PLOT_RIGHT - 92.0)
                .set("y", PLOT_TOP + 8.0)
                .set("width", 12)
                .set("height", 12)
                .set("fill", ACCENT),
        )
        .add(
            Text::new("commits")
                .set("x", PLOT_RIGHT - 74.0)
                .set("y", PLOT_TOP + 18.0)
                .set("fill", "currentColor")
                .set("font-size", 12),
        )
}

fn polyline_points(
    points: &[DailyActivityPoint],
    x_center: &impl Fn(usize) -> f64,
    y_for: &impl Fn(u64) -> f64,
) -> String {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| format!("{:.1},{:.1}", x_center(index), y_for(point.commits)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;

    fn series(counts: &[u64]) -> Vec<DailyActivityPoint> {
        counts
            .iter()
            .enumerate()
            .map(|(index, &commits)| DailyActivityPoint {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Days::new(index as u64),
                commits,
            })
            .collect()
    }

    fn bare(kind: ChartKind) -> ChartOptions {
        ChartOptions {
            kind,
            grid: false,
            legend: false,
        }
    }

    #[test]
    fn empty_series_renders_no_chart() {
        assert_eq!(render_activity_chart(&[], &ChartOptions::default()), None);
    }

    #[test]
    fn bar_chart_draws_one_bar_per_point() {
        let svg = render_activity_chart(&series(&[1, 2, 3]), &bare(ChartKind::Bar)).unwrap();
        assert_eq!(svg.matches("<rect").count(), 3);
    }

    #[test]
    fn line_chart_draws_a_polyline_with_point_dots() {
        let svg = render_activity_chart(&series(&[1, 2, 3]), &bare(ChartKind::Line)).unwrap();
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn area_chart_adds_a_translucent_polygon_under_the_line() {
        let svg = render_activity_chart(&series(&[1, 2, 3]), &bare(ChartKind::Area)).unwrap();
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains("fill-opacity"));
    }

    #[test]
    fn grid_and_legend_are_toggleable() {
        let with_both = render_activity_chart(
            &series(&[1, 2, 3]),
            &ChartOptions {
                kind: ChartKind::Bar,
                grid: true,
                legend: true,
            },
        )
        .unwrap();
        assert!(with_both.contains("stroke-dasharray"));
        assert!(with_both.contains("commits"));

        let without = render_activity_chart(&series(&[1, 2, 3]), &bare(ChartKind::Bar)).unwrap();
        assert!(!without.contains("stroke-dasharray"));
        assert!(!without.contains("commits"));
    }

    #[test]
    fn long_series_thin_their_date_labels() {
        let svg = render_activity_chart(&series(&[1; 14]), &bare(ChartKind::Bar)).unwrap();
        assert_eq!(svg.matches("2024-06-").count(), 7);
    }

    #[test]
    fn short_series_label_every_point() {
        let svg = render_activity_chart(&series(&[1, 2, 3]), &bare(ChartKind::Bar)).unwrap();
        assert_eq!(svg.matches("2024-06-").count(), 3);
    }

    #[test]
    fn all_zero_series_still_renders_a_frame() {
        let svg = render_activity_chart(&series(&[0, 0, 0]), &bare(ChartKind::Bar)).unwrap();
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains("viewBox"));
    }

    #[test]
    fn absent_query_parameters_fall_back_to_defaults() {
        assert_eq!(ChartOptions::from_query(None, None, None), ChartOptions::default());
        assert_eq!(
            ChartOptions::from_query(None, Some(false), Some(false)),
            ChartOptions::default()
        );
    }

    #[test]
    fn submitted_forms_treat_missing_toggles_as_off() {
        let options = ChartOptions::from_query(Some(ChartKind::Line), None, None);
        assert_eq!(options.kind, ChartKind::Line);
        assert!(!options.grid);
        assert!(!options.legend);

        let options = ChartOptions::from_query(Some(ChartKind::Area), Some(true), Some(true));
        assert!(options.grid);
        assert!(options.legend);
    }
}
