//! HTML fragments handed to the map widget.

use crate::{
    color::ColorScale,
    columns::{Field, Labels},
    filter::SliderBounds,
    obs_record::StationView,
};
use std::fmt::Write;

/// Format a value in its shortest round-trip form, without a trailing `.0`.
pub fn format_value(val: f64) -> String {
    // Negative zero prints as "-0".
    if val == 0.0 {
        return "0".to_owned();
    }

    let text = val.to_string();
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_owned(),
        None => text,
    }
}

/// Escape text for use inside HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }

    out
}

fn field_text(view: &StationView, field: Field) -> Option<String> {
    match field {
        Field::Station => Some(view.station.clone()),
        Field::Comune => view.comune.clone(),
        Field::Legend => view.legend.clone(),
        Field::Altitude => view.altitude.map(format_value),
        Field::Latitude => Some(format_value(view.lat)),
        Field::Longitude => Some(format_value(view.lon)),
        Field::Date => Some(view.obs_date.format("%d/%m/%Y").to_string()),
        other => other
            .element()
            .and_then(|element| view.value(element))
            .map(format_value),
    }
}

/// The popup for one station: its name as a title, then one line per present field.
///
/// The reading date is only listed when the snapshot had a date column.
pub fn popup_html(view: &StationView, labels: &Labels) -> String {
    let mut html = format!("<h4>{}</h4><hr>", escape_html(&view.station));

    let date_field = if labels.has(Field::Date) {
        Some(Field::Date)
    } else {
        None
    };

    for &field in date_field.iter().chain(Field::POPUP_ORDER.iter()) {
        if let Some(text) = field_text(view, field) {
            // Writing to a String cannot fail.
            let _ = write!(
                html,
                "<b>{}</b>: {}<br>",
                escape_html(labels.label(field)),
                escape_html(&text)
            );
        }
    }

    html
}

/// A fixed position legend box with swatches for the slider bounds.
pub fn legend_html(label: &str, scale: &ColorScale, bounds: &SliderBounds) -> String {
    let min_color = scale.color_for(bounds.min as f64).to_hex();
    let max_color = scale.color_for(bounds.max as f64).to_hex();

    format!(
        concat!(
            "<div style=\"position: fixed; bottom: 20px; left: 20px; z-index:1000; ",
            "background-color: white; padding: 10px; border-radius: 5px; border: 1px solid grey;\">",
            "<b>Legenda: {label}</b><br>",
            "<i style=\"background: {min_color};\">&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;</i> Min ({min})<br>",
            "<i style=\"background: {max_color};\">&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;</i> Max ({max})",
            "</div>"
        ),
        label = escape_html(label),
        min_color = min_color,
        min = bounds.min,
        max_color = max_color,
        max = bounds.max,
    )
}
