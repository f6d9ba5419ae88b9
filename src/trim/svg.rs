//! SVG export and import of trims.
//!
//! The document maps UV space onto a unit `viewBox` with the Y axis flipped:
//! a trim's SVG `y` is `1 - top`. Import reverses the flip.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, UvError};
use crate::geom::color::{from_hex, to_hex};

use super::Trim;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Render the enabled trims as an SVG document.
pub fn to_svg<'a, I>(trims: I) -> String
where
    I: IntoIterator<Item = &'a Trim>,
{
    let mut svg = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"{}\" width=\"1024\" height=\"1024\" viewBox=\"0 0 1 1\">\n",
        SVG_NAMESPACE
    ));
    for trim in trims.into_iter().filter(|t| t.enabled) {
        let color = to_hex(trim.color);
        svg.push_str(&format!(
            "  <rect id=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" fill-opacity=\"0.5\" stroke=\"{}\" stroke-width=\"0.002\"/>\n",
            escape(&trim.name),
            trim.left,
            1.0 - trim.top,
            trim.right - trim.left,
            trim.top - trim.bottom,
            color,
            color
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Parse every `<rect>` of an SVG document into a trim.
///
/// `existing` is the number of trims already in the destination sheet; it
/// numbers the default names of rects without an `id`.
pub fn parse_svg(text: &str, existing: usize) -> Result<Vec<Trim>> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut trims = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"rect" => {
                let trim = parse_rect(&e, existing + trims.len())?;
                trims.push(trim);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(UvError::svg(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    log::debug!("parsed {} trims from svg", trims.len());
    Ok(trims)
}

fn parse_rect(element: &BytesStart, index: usize) -> Result<Trim> {
    let mut x = 0.0;
    let mut y = 0.0;
    let mut width = 0.1;
    let mut height = 0.1;
    let mut name = None;
    let mut fill = String::from("#ffffff");

    for attr in element.attributes() {
        let attr = attr.map_err(UvError::svg)?;
        let value = attr.unescape_value().map_err(UvError::svg)?;
        match attr.key.local_name().as_ref() {
            b"x" => x = number("x", &value)?,
            b"y" => y = number("y", &value)?,
            b"width" => width = number("width", &value)?,
            b"height" => height = number("height", &value)?,
            b"id" => name = Some(value.into_owned()),
            b"fill" => fill = value.into_owned(),
            _ => {}
        }
    }

    let color = if fill.starts_with('#') {
        from_hex(&fill).ok_or_else(|| UvError::svg(format!("invalid fill color '{}'", fill)))?
    } else {
        [1.0, 1.0, 1.0]
    };

    Ok(Trim {
        name: name.unwrap_or_else(|| format!("Trim.{:03}", index)),
        left: x,
        right: x + width,
        bottom: 1.0 - y - height,
        top: 1.0 - y,
        color,
        ..Trim::default()
    })
}

fn number(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| UvError::svg(format!("attribute {} is not a number: '{}'", name, value)))
}

/// Write the enabled trims to `path`, appending `.svg` when the path has
/// another extension. Returns the path written.
pub fn save_svg<'a, P, I>(path: P, trims: I) -> Result<PathBuf>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Trim>,
{
    let mut path = path.as_ref().to_path_buf();
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if !is_svg {
        let mut name = path.clone().into_os_string();
        name.push(".svg");
        path = PathBuf::from(name);
    }

    fs::write(&path, to_svg(trims)).map_err(|e| UvError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    log::info!("exported trims to {}", path.display());
    Ok(path)
}

/// Read trims from an SVG file.
pub fn load_svg<P: AsRef<Path>>(path: P) -> Result<Vec<Trim>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| UvError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_svg(&text, 0)
}
