use std::path::{Path, PathBuf};
use plotters::coord::Shift;
use plotters::prelude::*;
use log::debug;


const CHART_SIZE: (u32, u32) = (900, 600);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 22);


/// One labeled line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<f64>,
}


/// One panel of a stacked multi-panel chart. All series share the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub x: Vec<f64>,
    pub x_desc: String,
    pub y_desc: String,
    pub series: Vec<Series>,
}


/// Rendering sink: turns labeled time series into PNG artifacts under the
/// run's data directory.
#[derive(Debug, Clone)]
pub struct Renderer {
    data_dir: PathBuf,
}


impl Renderer {
    pub fn new(data_dir: &Path) -> Renderer {
        return Renderer {
            data_dir: data_dir.to_path_buf(),
        };
    }

    pub fn data_dir(&self) -> &Path {
        return self.data_dir.as_path();
    }

    /// Renders a single line chart with a legend and returns the artifact
    /// path.
    pub fn line_chart(
        &self,
        file_name: &str,
        caption: &str,
        x_desc: &str,
        y_desc: &str,
        x: &[f64],
        series: &[Series],
    ) -> Result<PathBuf, String> {
        let path = self.data_dir.join(file_name);

        {
            let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|error| format!("{}: {}", path.display(), error))?;

            draw_panel(&root, Some(caption), x_desc, y_desc, x, series)
                .map_err(|error| format!("{}: {}", path.display(), error))?;

            root.present()
                .map_err(|error| format!("{}: {}", path.display(), error))?;
        }

        debug!("Rendered chart {}", path.display());
        return Ok(path);
    }

    /// Renders vertically stacked panels sharing one caption and returns
    /// the artifact path.
    pub fn panel_chart(
        &self,
        file_name: &str,
        caption: &str,
        panels: &[Panel],
    ) -> Result<PathBuf, String> {
        let path = self.data_dir.join(file_name);

        {
            let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|error| format!("{}: {}", path.display(), error))?;

            let titled = root
                .titled(caption, CAPTION_FONT)
                .map_err(|error| format!("{}: {}", path.display(), error))?;

            let areas = titled.split_evenly((panels.len(), 1));
            for (panel, area) in panels.iter().zip(areas.iter()) {
                draw_panel(area, None, &panel.x_desc, &panel.y_desc, &panel.x, &panel.series)
                    .map_err(|error| format!("{}: {}", path.display(), error))?;
            }

            root.present()
                .map_err(|error| format!("{}: {}", path.display(), error))?;
        }

        debug!("Rendered chart {}", path.display());
        return Ok(path);
    }
}


fn draw_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    caption: Option<&str>,
    x_desc: &str,
    y_desc: &str,
    x: &[f64],
    series: &[Series],
) -> Result<(), String> {
    let x_max = x.last().copied().unwrap_or(0.0).max(1.0);
    let (y_min, y_max) = value_bounds(series);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60);
    if let Some(caption) = caption {
        builder.caption(caption, CAPTION_FONT);
    }

    let mut chart = builder
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(|error| format!("{}", error))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(|error| format!("{}", error))?;

    for (index, entry) in series.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                x.iter().copied().zip(entry.points.iter().copied()),
                &color,
            ))
            .map_err(|error| format!("{}", error))?
            .label(entry.label.as_str())
            .legend(move |(px, py)| PathElement::new(vec![(px, py), (px + 16, py)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|error| format!("{}", error))?;

    return Ok(());
}


fn value_bounds(series: &[Series]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for entry in series {
        for value in &entry.points {
            min = min.min(*value);
            max = max.max(*value);
        }
    }

    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }

    return (min.min(0.0), max);
}


#[cfg(test)]
mod tests {
    use super::*;

    fn build_series() -> Vec<Series> {
        return vec![Series {
            label: String::from("read"),
            points: vec![1.0, 2.0, 3.0],
        }];
    }

    #[test]
    fn line_chart_into_missing_directory_should_fail() {
        let renderer = Renderer::new(Path::new("/nonexistent/lupe-test"));

        let result = renderer.line_chart(
            "chart.png",
            "caption",
            "Time, s",
            "Load",
            &[0.0, 1.0, 2.0],
            &build_series(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn value_bounds_spans_all_series() {
        let series = vec![
            Series { label: String::from("a"), points: vec![3.0, 9.0] },
            Series { label: String::from("b"), points: vec![1.0, 4.0] },
        ];

        assert_eq!(value_bounds(&series), (0.0, 9.0));
    }

    #[test]
    fn value_bounds_expands_flat_series() {
        let series = vec![Series { label: String::from("a"), points: vec![2.0, 2.0] }];

        assert_eq!(value_bounds(&series), (1.0, 3.0));
    }

    #[test]
    fn value_bounds_defaults_when_empty() {
        assert_eq!(value_bounds(&[]), (0.0, 1.0));
    }
}
