//! Server-rendered HTML page: input form, estimate card and two SVG charts.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters_svg::SVGBackend;

use crate::error::{MedcostError, Result};
use crate::features::{FormInput, Region, Sex, Smoker, AGE_MAX, BMI_MAX, CHILDREN_MAX};
use crate::report::{InputBar, Report};
use crate::simulation::SimulatedDistribution;

const STYLE: &str = r#"
body {
    font-family: 'Arial', sans-serif;
    background: linear-gradient(to bottom right, #f4f7f6, #dbe6e4);
    color: #333;
    margin: 0;
}
main { max-width: 880px; margin: 0 auto; padding: 24px; }
.main-title {
    font-size: 40px;
    color: #2c3e50;
    text-align: center;
    font-weight: bold;
    margin-bottom: 40px;
    text-shadow: 2px 2px 4px rgba(0, 0, 0, 0.1);
}
.card {
    background-color: #ffffff;
    padding: 20px;
    margin: 15px 0;
    border-radius: 8px;
    box-shadow: 0 4px 8px rgba(0, 0, 0, 0.1);
}
.card-header { font-size: 24px; font-weight: 600; color: #34495e; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 12px 24px; margin-top: 12px; }
.grid label { display: block; font-size: 14px; margin-bottom: 4px; }
.grid input, .grid select { width: 100%; padding: 6px; box-sizing: border-box; }
.prediction {
    font-size: 32px;
    color: #27ae60;
    font-weight: bold;
    text-align: center;
    margin-top: 20px;
}
.recommendation {
    font-size: 18px;
    color: #e74c3c;
    background-color: #f9c2c2;
    padding: 10px;
    border-radius: 5px;
    margin-top: 15px;
}
.error { color: #c0392b; font-weight: bold; }
.spinner { display: none; margin-top: 12px; color: #7f8c8d; }
form.busy .spinner { display: block; }
.footer {
    text-align: center;
    font-size: 14px;
    color: #7f8c8d;
    margin-top: 50px;
    font-style: italic;
}
.chart-container { margin-top: 20px; }
.chart-container svg { width: 100%; height: auto; }
.bar:hover { fill: #1f5f99; }
"#;

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;

const HISTOGRAM_FILL: RGBColor = RGBColor(255, 165, 0);

/// Outcome shown in the result card.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// Successful estimate.
    Estimate(&'a Report),
    /// Inference failed; message is shown verbatim.
    Failure(&'a str),
}

/// Renders the whole page.
pub fn render_page(
    form: &FormInput,
    outcome: Outcome<'_>,
    distribution: &SimulatedDistribution,
) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Prediksi Biaya Medis</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<main>\n");
    html.push_str("<div class=\"main-title\">✨ Prediksi Biaya Medis Anda ✨</div>\n");

    html.push_str(&form_card(form));
    html.push_str(&result_card(outcome));

    html.push_str("<div class=\"card chart-container\">\n");
    html.push_str("<div class=\"card-header\">📊 Visualisasi Data</div>\n");
    if let Outcome::Estimate(report) = outcome {
        html.push_str(&bar_chart_svg(&report.bars));
    }
    html.push_str("<div class=\"card-header\">📈 Distribusi Biaya Medis (Simulasi)</div>\n");
    match histogram_svg(distribution) {
        Ok(svg) => html.push_str(&svg),
        Err(err) => tracing::warn!(error = %err, "histogram chart skipped"),
    }
    html.push_str("</div>\n");

    html.push_str(
        "<div class=\"footer\">Dibuat dengan ❤️ oleh Tim Prediksi Medis • © 2025</div>\n",
    );
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn form_card(form: &FormInput) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"card\">\n");
    html.push_str("<div class=\"card-header\">🔍 Masukkan Data Anda</div>\n");
    html.push_str(
        "<form method=\"get\" action=\"/\" onsubmit=\"this.classList.add('busy')\">\n\
         <div class=\"grid\">\n",
    );
    let _ = write!(
        html,
        "<div><label for=\"age\">Usia (Tahun):</label>\
         <input id=\"age\" name=\"age\" type=\"number\" min=\"0\" max=\"{AGE_MAX}\" step=\"1\" value=\"{}\" required></div>\n",
        form.age
    );
    html.push_str(&select_field(
        "sex",
        "Jenis Kelamin:",
        Sex::ALL.iter().map(|o| o.label()),
        form.sex.label(),
    ));
    let _ = write!(
        html,
        "<div><label for=\"bmi\">BMI (Indeks Massa Tubuh):</label>\
         <input id=\"bmi\" name=\"bmi\" type=\"number\" min=\"0\" max=\"{BMI_MAX}\" step=\"0.1\" value=\"{:.1}\" required></div>\n",
        form.bmi
    );
    html.push_str(&select_field(
        "smoker",
        "Status Merokok:",
        Smoker::ALL.iter().map(|o| o.label()),
        form.smoker.label(),
    ));
    let _ = write!(
        html,
        "<div><label for=\"children\">Jumlah Anak/Tanggungan:</label>\
         <input id=\"children\" name=\"children\" type=\"number\" min=\"0\" max=\"{CHILDREN_MAX}\" step=\"1\" value=\"{}\" required></div>\n",
        form.children
    );
    html.push_str(&select_field(
        "region",
        "Wilayah:",
        Region::ALL.iter().map(|o| o.label()),
        form.region.label(),
    ));
    html.push_str("</div>\n<p><button type=\"submit\">Prediksi</button></p>\n");
    html.push_str(
        "<div class=\"spinner\">Memproses data dan menghasilkan prediksi...</div>\n</form>\n</div>\n",
    );
    html
}

fn select_field<'a>(
    name: &str,
    label: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) -> String {
    let mut html = format!(
        "<div><label for=\"{name}\">{}</label><select id=\"{name}\" name=\"{name}\">",
        encode_text(label)
    );
    for option in options {
        let marker = if option == selected { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{}\"{marker}>{}</option>",
            encode_double_quoted_attribute(option),
            encode_text(option)
        );
    }
    html.push_str("</select></div>\n");
    html
}

fn result_card(outcome: Outcome<'_>) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"card\">\n<div class=\"card-header\">📊 Hasil Prediksi</div>\n");
    match outcome {
        Outcome::Estimate(report) => {
            let _ = write!(
                html,
                "<div class=\"prediction\">Prediksi biaya medis Anda adalah:<br>\
                 <span style=\"color: #27ae60;\">{}</span></div>\n",
                encode_text(&report.formatted)
            );
            for advisory in &report.advisories {
                let _ = writeln!(
                    html,
                    "<div class=\"recommendation\">{}</div>",
                    encode_text(advisory.message())
                );
            }
        }
        Outcome::Failure(message) => {
            let _ = writeln!(
                html,
                "<p class=\"error\">Prediksi gagal: {}</p>",
                encode_text(message)
            );
        }
    }
    html.push_str("</div>\n");
    html
}

/// SVG bar chart of the raw inputs; each bar carries a hover tooltip.
///
/// Drawn by hand rather than through `SVGBackend`, which has no way to attach
/// a `<title>` child to an individual rectangle.
pub fn bar_chart_svg(bars: &[InputBar]) -> String {
    let plot_w = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max_value = bars
        .iter()
        .map(|bar| bar.value)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.1;
    let slot = plot_w / bars.len().max(1) as f64;
    let bar_w = slot * 0.7;

    let mut svg = svg_open("Input Data vs Prediksi Biaya Medis");
    svg.push_str(&axes("Fitur", "Nilai", max_value));
    for (idx, bar) in bars.iter().enumerate() {
        let height = bar.value / max_value * plot_h;
        let x = MARGIN_LEFT + slot * idx as f64 + (slot - bar_w) / 2.0;
        let y = MARGIN_TOP + plot_h - height;
        let _ = write!(
            svg,
            "<rect class=\"bar\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" height=\"{height:.1}\" fill=\"#636efa\">\
             <title>{}: {}</title></rect>",
            encode_text(bar.label),
            trim_number(bar.value)
        );
        let _ = write!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
            x + bar_w / 2.0,
            MARGIN_TOP + plot_h + 16.0,
            encode_text(bar.label)
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// SVG histogram of the simulated distribution with its density overlay.
pub fn histogram_svg(distribution: &SimulatedDistribution) -> Result<String> {
    let histogram = &distribution.histogram;
    let kde_peak = distribution
        .kde
        .iter()
        .map(|point| point.y)
        .fold(0.0_f64, f64::max);
    let y_max = (histogram.max_count() as f64).max(kde_peak).max(1.0) * 1.1;
    let (lo, hi) = match (histogram.edges.first(), histogram.edges.last()) {
        (Some(lo), Some(hi)) if hi > lo => (*lo, *hi),
        _ => (0.0, 1.0),
    };
    let chart_error = |err: DrawingAreaErrorKind<std::io::Error>| {
        MedcostError::ChartRender(err.to_string())
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH as u32, CHART_HEIGHT as u32))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Distribusi Biaya Medis (Simulasi)",
                ("sans-serif", 16).into_font(),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(lo..hi, 0f64..y_max)
            .map_err(chart_error)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(5)
            .y_labels(5)
            .x_label_formatter(&|value| format!("{value:.0}"))
            .y_label_formatter(&|value| format!("{value:.0}"))
            .x_desc("Biaya Medis")
            .y_desc("Frekuensi")
            .draw()
            .map_err(chart_error)?;
        chart
            .draw_series(histogram.counts.iter().enumerate().map(|(idx, count)| {
                Rectangle::new(
                    [
                        (histogram.edges[idx], 0.0),
                        (histogram.edges[idx + 1], *count as f64),
                    ],
                    HISTOGRAM_FILL.mix(0.6).filled(),
                )
            }))
            .map_err(chart_error)?;
        if !distribution.kde.is_empty() {
            chart
                .draw_series(LineSeries::new(
                    distribution.kde.iter().map(|point| (point.x, point.y)),
                    HISTOGRAM_FILL.stroke_width(2),
                ))
                .map_err(chart_error)?;
        }
        root.present().map_err(chart_error)?;
    }
    svg.push('\n');
    Ok(svg)
}

fn svg_open(title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\" role=\"img\">\
         <text x=\"{:.1}\" y=\"24\" font-size=\"16\" text-anchor=\"middle\">{}</text>",
        CHART_WIDTH / 2.0,
        encode_text(title)
    )
}

fn axes(x_label: &str, y_label: &str, y_max: f64) -> String {
    let bottom = CHART_HEIGHT - MARGIN_BOTTOM;
    let right = CHART_WIDTH - MARGIN_RIGHT;
    let mut svg = format!(
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{bottom}\" x2=\"{right}\" y2=\"{bottom}\" stroke=\"#555\"/>\
         <line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{bottom}\" stroke=\"#555\"/>"
    );
    let _ = write!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\">{}</text>",
        MARGIN_LEFT + (right - MARGIN_LEFT) / 2.0,
        CHART_HEIGHT - 16.0,
        encode_text(x_label)
    );
    let _ = write!(
        svg,
        "<text x=\"16\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\" transform=\"rotate(-90 16 {:.1})\">{}</text>",
        MARGIN_TOP + (bottom - MARGIN_TOP) / 2.0,
        MARGIN_TOP + (bottom - MARGIN_TOP) / 2.0,
        encode_text(y_label)
    );
    let _ = write!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\">{}</text>\
         <text x=\"{:.1}\" y=\"{bottom:.1}\" font-size=\"10\" text-anchor=\"end\">0</text>",
        MARGIN_LEFT - 4.0,
        MARGIN_TOP + 4.0,
        trim_number(y_max),
        MARGIN_LEFT - 4.0,
    );
    svg
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationSettings;
    use crate::features::FeatureVector;
    use crate::report::Advisory;

    fn distribution() -> SimulatedDistribution {
        SimulatedDistribution::generate(&SimulationSettings::default()).expect("distribution")
    }

    #[test]
    fn renders_estimate_and_advisories() {
        let form = FormInput {
            bmi: 33.0,
            ..FormInput::default()
        };
        let report = Report::new(form.to_features(), 23_456.789);
        let html = render_page(&form, Outcome::Estimate(&report), &distribution());
        assert!(html.contains("$23,456.79"));
        assert!(html.contains(Advisory::QuitSmoking.message()));
        assert!(html.contains(Advisory::Obesity.message()));
        assert!(html.contains("<option value=\"Ya\" selected>Ya</option>"));
        assert!(html.contains("value=\"33.0\""));
        assert_eq!(html.matches("<svg").count(), 2);
    }

    #[test]
    fn failure_skips_input_chart() {
        let form = FormInput::default();
        let html = render_page(&form, Outcome::Failure("bad <model>"), &distribution());
        assert!(html.contains("Prediksi gagal: bad &lt;model&gt;"));
        assert_eq!(html.matches("<svg").count(), 1);
        assert!(!html.contains("class=\"recommendation\""));
    }

    #[test]
    fn bar_chart_has_tooltip_per_input() {
        let features = FeatureVector::new(30, 25.5, 0, Sex::Male, Smoker::No, Region::Southeast)
            .expect("valid");
        let svg = bar_chart_svg(&crate::report::input_bars(&features));
        assert_eq!(svg.matches("<rect").count(), 6);
        assert!(svg.contains("<title>BMI: 25.5</title>"));
        assert!(svg.contains("<title>Wilayah: 2</title>"));
        assert!(svg.contains("Fitur"));
        assert!(svg.contains("Nilai"));
    }

    #[test]
    fn histogram_draws_every_bin_and_overlay() {
        let svg = histogram_svg(&distribution()).expect("chart");
        assert_eq!(svg.matches("<svg").count(), 1);
        // one background rect plus a rect per bin
        assert!(svg.matches("<rect").count() >= 31);
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("Frekuensi"));
        assert!(svg.contains("Biaya Medis"));
    }

    #[test]
    fn number_inputs_are_required() {
        let html = form_card(&FormInput::default());
        assert_eq!(html.matches("type=\"number\"").count(), 3);
        assert_eq!(html.matches(" required>").count(), 3);
    }

    #[test]
    fn escapes_text_and_attributes() {
        let html = render_page(
            &FormInput::default(),
            Outcome::Failure("bad <model> & \"weights\""),
            &distribution(),
        );
        assert!(html.contains("Prediksi gagal: bad &lt;model&gt; &amp; \"weights\""));

        let select = select_field("q", "<Pilih>", ["a\"b", "c"].into_iter(), "a\"b");
        assert!(select.contains("&lt;Pilih&gt;"));
        assert!(select.contains("<option value=\"a&quot;b\" selected>a\"b</option>"));
        assert!(select.contains("<option value=\"c\">c</option>"));
    }
}
