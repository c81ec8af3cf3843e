//! Plotly figure model and composition.
//!
//! The figure is a plain serde model of Plotly's JSON schema, limited to the
//! attributes this report uses. It is rendered client side by plotly.js.

use serde::Serialize;
use tracing::debug;

/// Main title of the figure.
pub const FIGURE_TITLE: &str = "Vector Space Visualization of Text Embeddings";

const TITLE_2D: &str = "2D Vector Space (PCA)";
const TITLE_3D: &str = "3D Vector Space (PCA)";
const COLORSCALE: &str = "Viridis";
const OPACITY: f64 = 0.8;
const MAX_SIZE_2D: f64 = 15.0;
const MAX_SIZE_3D: f64 = 10.0;
const DOMAIN_2D: [f64; 2] = [0.0, 0.45];
const DOMAIN_3D: [f64; 2] = [0.55, 1.0];

/// One analyzed record, ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub id: String,
    pub display_text: String,
    pub similarity_score: f64,
    pub cluster: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Explained-variance ratios of the two projections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarianceSummary {
    /// Ratios of the available components of the 2D projection.
    pub two_d: Vec<f64>,

    /// Ratios of the available components of the 3D projection.
    pub three_d: Vec<f64>,
}

/// A complete Plotly figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// A Plotly trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Scatter3d(ScatterTrace),
}

/// Marker-mode scatter trace, shared by the 2D and 3D panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub mode: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<Vec<f64>>,
    pub marker: Marker,
    /// `(id, display_text, similarity_score)` per point.
    pub customdata: Vec<(String, String, f64)>,
    pub hovertemplate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: Vec<f64>,
    pub colorscale: String,
    pub cmin: f64,
    pub cmax: f64,
    pub showscale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
    pub size: Vec<f64>,
    pub sizemode: String,
    pub sizeref: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: Title,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub height: u32,
    pub width: u32,
    pub showlegend: bool,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub xaxis: CartesianAxis,
    pub yaxis: CartesianAxis,
    pub scene: Scene,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartesianAxis {
    pub domain: [f64; 2],
    pub anchor: String,
    pub title: Title,
    pub gridcolor: String,
    pub zerolinecolor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub domain: SceneDomain,
    pub xaxis: SceneAxis,
    pub yaxis: SceneAxis,
    pub zaxis: SceneAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDomain {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneAxis {
    pub title: Title,
    pub backgroundcolor: String,
    pub gridcolor: String,
    pub showbackground: bool,
}

impl SceneAxis {
    fn new(title: &str) -> Self {
        Self {
            title: Title::new(title),
            backgroundcolor: "white".to_string(),
            gridcolor: GRID_COLOR.to_string(),
            showbackground: true,
        }
    }
}

const GRID_COLOR: &str = "#EBF0F8";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrowhead: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<String>,
    pub font: Font,
}

impl Annotation {
    /// Static text positioned in paper coordinates.
    fn paper(text: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            showarrow: false,
            arrowhead: None,
            ax: None,
            ay: None,
            xanchor: None,
            yanchor: None,
            font: Font { size },
        }
    }

    /// Label pointing at a 2D data point from 20px above.
    fn point_label(point: &PlotPoint) -> Self {
        Self {
            text: point.display_text.clone(),
            x: point.x,
            y: point.y,
            xref: "x".to_string(),
            yref: "y".to_string(),
            showarrow: true,
            arrowhead: Some(1),
            ax: Some(0.0),
            ay: Some(-20.0),
            xanchor: None,
            yanchor: None,
            font: Font { size: 8.0 },
        }
    }

    fn subplot_title(text: &str, domain: [f64; 2]) -> Self {
        Self {
            xanchor: Some("center".to_string()),
            yanchor: Some("bottom".to_string()),
            ..Self::paper(text, (domain[0] + domain[1]) / 2.0, 1.0, 16.0)
        }
    }
}

/// Format explained-variance ratios as `12.34% (PC1), 5.67% (PC2)`.
pub fn variance_label(ratios: &[f64]) -> String {
    let parts = ratios
        .iter()
        .enumerate()
        .map(|(i, ratio)| format!("{:.2}% (PC{})", ratio * 100.0, i + 1))
        .collect::<Vec<_>>();
    format!("Explained variance: {}", parts.join(", "))
}

/// Build the combined 2D + 3D figure.
pub fn compose_figure(points: &[PlotPoint], variance: &VarianceSummary) -> Figure {
    let scatter_2d = ScatterTrace {
        xaxis: Some("x".to_string()),
        yaxis: Some("y".to_string()),
        ..scatter(points, false)
    };
    let scatter_3d = ScatterTrace {
        z: Some(points.iter().map(|p| p.z).collect()),
        scene: Some("scene".to_string()),
        ..scatter(points, true)
    };

    let mut annotations = vec![
        Annotation::subplot_title(TITLE_2D, DOMAIN_2D),
        Annotation::subplot_title(TITLE_3D, DOMAIN_3D),
    ];
    annotations.extend(points.iter().map(Annotation::point_label));

    if !variance.two_d.is_empty() {
        annotations.push(Annotation::paper(
            variance_label(&variance.two_d),
            0.25,
            0.0,
            10.0,
        ));
    }
    if variance.three_d.len() > 2 {
        annotations.push(Annotation::paper(
            variance_label(&variance.three_d),
            0.75,
            0.0,
            10.0,
        ));
    }

    debug!(
        "Composed figure with {} points and {} annotations",
        points.len(),
        annotations.len()
    );

    Figure {
        data: vec![Trace::Scatter(scatter_2d), Trace::Scatter3d(scatter_3d)],
        layout: Layout {
            title: Title::new(FIGURE_TITLE),
            height: 800,
            width: 1400,
            showlegend: false,
            paper_bgcolor: "white".to_string(),
            plot_bgcolor: "white".to_string(),
            xaxis: CartesianAxis {
                domain: DOMAIN_2D,
                anchor: "y".to_string(),
                title: Title::new("Component 1"),
                gridcolor: GRID_COLOR.to_string(),
                zerolinecolor: GRID_COLOR.to_string(),
            },
            yaxis: CartesianAxis {
                domain: [0.0, 1.0],
                anchor: "x".to_string(),
                title: Title::new("Component 2"),
                gridcolor: GRID_COLOR.to_string(),
                zerolinecolor: GRID_COLOR.to_string(),
            },
            scene: Scene {
                domain: SceneDomain {
                    x: DOMAIN_3D,
                    y: [0.0, 1.0],
                },
                xaxis: SceneAxis::new("Component 1"),
                yaxis: SceneAxis::new("Component 2"),
                zaxis: SceneAxis::new("Component 3"),
            },
            annotations,
        },
    }
}

fn scatter(points: &[PlotPoint], three_d: bool) -> ScatterTrace {
    let max_size = if three_d { MAX_SIZE_3D } else { MAX_SIZE_2D };
    let sizes: Vec<f64> = points.iter().map(|p| p.similarity_score.max(0.0)).collect();
    let largest = sizes.iter().copied().fold(0.0_f64, f64::max);
    // Area sizing: the largest score maps to a `max_size` pixel diameter.
    let sizeref = if largest > 0.0 {
        2.0 * largest / (max_size * max_size)
    } else {
        1.0
    };

    let colors: Vec<f64> = points.iter().map(|p| p.cluster as f64).collect();
    let cmax = colors.iter().copied().fold(0.0_f64, f64::max);

    let mut hovertemplate = String::from(
        "id=%{customdata[0]}<br>display_text=%{customdata[1]}<br>\
         similarity_score=%{customdata[2]:.4f}<br>x=%{x}<br>y=%{y}",
    );
    if three_d {
        hovertemplate.push_str("<br>z=%{z}");
    }
    hovertemplate.push_str("<br>cluster=%{marker.color}<extra></extra>");

    ScatterTrace {
        mode: "markers".to_string(),
        x: points.iter().map(|p| p.x).collect(),
        y: points.iter().map(|p| p.y).collect(),
        z: None,
        marker: Marker {
            color: colors,
            colorscale: COLORSCALE.to_string(),
            cmin: 0.0,
            cmax: cmax.max(1.0),
            // One color bar is enough; both panels share the scale.
            showscale: !three_d,
            colorbar: (!three_d).then(|| ColorBar {
                title: Title::new("cluster"),
                x: 1.02,
            }),
            size: sizes,
            sizemode: "area".to_string(),
            sizeref,
            opacity: OPACITY,
        },
        customdata: points
            .iter()
            .map(|p| (p.id.clone(), p.display_text.clone(), p.similarity_score))
            .collect(),
        hovertemplate,
        xaxis: None,
        yaxis: None,
        scene: None,
        showlegend: false,
    }
}
