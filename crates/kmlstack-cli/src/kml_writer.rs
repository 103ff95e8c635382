//! Renders a merged dataset as one KML document
//!
//! One shared `Style` per source file, then every point as a
//! `Placemark` in session order. Placemark names carry the source
//! remark so a point's provenance stays visible in the viewer, and
//! each description ends with a normalized time line.

use anyhow::Result;
use chrono::SecondsFormat;
use kmlstack_core::models::{GeoPoint, MergedDataset, SourceFile};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

const PLACEMARK_ICON: &str = "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";

/// Serializes the dataset into a complete KML document.
pub fn render_merged_kml(dataset: &MergedDataset) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut kml = BytesStart::new("kml");
    kml.push_attribute(("xmlns", "http://www.opengis.net/kml/2.2"));
    writer.write_event(Event::Start(kml))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;
    write_text_element(&mut writer, "name", "Merged KML")?;

    for source in &dataset.sources {
        write_style(&mut writer, source)?;
    }

    for merged in &dataset.points {
        if let Some(source) = dataset.source(merged.source) {
            write_placemark(&mut writer, source, &merged.point)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;

    Ok(writer.into_inner().into_inner())
}

fn write_style<W: Write>(writer: &mut Writer<W>, source: &SourceFile) -> Result<()> {
    let mut style = BytesStart::new("Style");
    style.push_attribute(("id", source.color.name.as_str()));
    writer.write_event(Event::Start(style))?;

    writer.write_event(Event::Start(BytesStart::new("IconStyle")))?;
    write_text_element(writer, "color", &source.color.kml_color())?;
    writer.write_event(Event::Start(BytesStart::new("Icon")))?;
    write_text_element(writer, "href", PLACEMARK_ICON)?;
    writer.write_event(Event::End(BytesEnd::new("Icon")))?;
    writer.write_event(Event::End(BytesEnd::new("IconStyle")))?;

    writer.write_event(Event::End(BytesEnd::new("Style")))?;
    Ok(())
}

fn write_placemark<W: Write>(
    writer: &mut Writer<W>,
    source: &SourceFile,
    point: &GeoPoint,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;

    let label = point.raw_label().map(strip_html).unwrap_or_default();
    let name = if label.is_empty() {
        format!("({})", source.remark)
    } else {
        format!("({}) - {}", source.remark, label)
    };
    write_text_element(writer, "name", &name)?;
    write_text_element(writer, "description", &build_description(point))?;
    write_text_element(writer, "styleUrl", &format!("#{}", source.color.name))?;

    if let Some(ts) = point.timestamp {
        writer.write_event(Event::Start(BytesStart::new("TimeStamp")))?;
        write_text_element(
            writer,
            "when",
            &ts.value.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        writer.write_event(Event::End(BytesEnd::new("TimeStamp")))?;
    }

    // KML coordinates are lon,lat ordered
    writer.write_event(Event::Start(BytesStart::new("Point")))?;
    write_text_element(
        writer,
        "coordinates",
        &format!("{},{}", point.longitude, point.latitude),
    )?;
    writer.write_event(Event::End(BytesEnd::new("Point")))?;

    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    Ok(())
}

fn build_description(point: &GeoPoint) -> String {
    let time_line = match point.timestamp {
        Some(ts) => format!("Time: {}", ts.value.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => "Time: unknown".to_string(),
    };
    match point.description.as_deref().map(strip_html) {
        Some(text) if !text.is_empty() => format!("{}\n{}", text, time_line),
        _ => time_line,
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Drops markup tags, keeping only text content.
fn strip_html(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.trim().to_string()
}
