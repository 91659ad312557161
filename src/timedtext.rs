//! Timed-text caption documents: `<text start="S" dur="D">TEXT</text>` elements.

use std::borrow::Cow;
use std::sync::LazyLock;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::{Captures, Regex};

use crate::{CaptionLine, Timestamp};

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:amp|lt|gt|quot|#39);").expect("entity pattern is valid"));

/// Caption text collected between `<text>` and `</text>`
struct Cue {
    time: Timestamp,
    text: String,
}

/// Parse a timed-text document into caption lines, in document order.
///
/// Elements without a usable `start` offset or without any text are skipped.
/// Nested markup inside an element (e.g. `<font>`) is dropped, its text kept.
pub fn parse_timed_text(xml: &str) -> Result<Vec<CaptionLine>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut lines = Vec::new();
    let mut current: Option<Cue> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == b"text" => {
                current = start_offset(e).map(|time| Cue {
                    time,
                    text: String::new(),
                });
            }
            Event::Text(e) => {
                if let Some(cue) = current.as_mut() {
                    cue.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::CData(e) => {
                if let Some(cue) = current.as_mut() {
                    cue.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"text" => {
                match current.take() {
                    Some(cue) if !cue.text.is_empty() => lines.push(CaptionLine {
                        time: cue.time,
                        text: decode_entities(&cue.text).into_owned(),
                    }),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!("Parsed {} caption lines", lines.len());
    Ok(lines)
}

fn start_offset(element: &BytesStart<'_>) -> Option<Timestamp> {
    let attr = element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"start")?;
    let raw = String::from_utf8_lossy(&attr.value);
    match raw.trim().parse::<f64>() {
        Ok(seconds) => Timestamp::from_seconds(seconds),
        Err(_) => {
            debug!("Skipping caption with unparseable start offset: {raw}");
            None
        }
    }
}

/// Decode `&amp; &lt; &gt; &quot; &#39;` in one left-to-right pass.
///
/// Replaced text is never scanned again, so `&amp;lt;` becomes `&lt;`, not `<`.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |caps: &Captures<'_>| match &caps[0] {
        "&amp;" => "&",
        "&lt;" => "<",
        "&gt;" => ">",
        "&quot;" => "\"",
        _ => "'",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(lines: &[CaptionLine]) -> Vec<String> {
        lines.iter().map(|l| l.time.to_string()).collect()
    }

    #[test]
    fn test_parse_timed_text_basic() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.21" dur="2.34">Hello world</text>
    <text start="2.55" dur="1.50">This is a test</text>
</transcript>"#;

        let lines = parse_timed_text(xml).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[1].text, "This is a test");
        assert_eq!(times(&lines), vec!["00:00:00", "00:00:02"]);
    }

    #[test]
    fn test_parse_timed_text_floor_truncation() {
        let xml = r#"<transcript>
<text start="0" dur="1">a</text>
<text start="65.4" dur="1">b</text>
<text start="3661.9" dur="1">c</text>
</transcript>"#;

        let lines = parse_timed_text(xml).unwrap();
        assert_eq!(times(&lines), vec!["00:00:00", "00:01:05", "01:01:01"]);
    }

    #[test]
    fn test_parse_timed_text_entities_single_pass() {
        let xml = r#"<transcript><text start="1" dur="1">&amp;lt;b&amp;gt;</text></transcript>"#;
        let lines = parse_timed_text(xml).unwrap();
        assert_eq!(lines[0].text, "&lt;b&gt;");
    }

    #[test]
    fn test_parse_timed_text_common_entities() {
        let xml = r#"<transcript><text start="1" dur="1">it&#39;s a &quot;test&quot; &lt;3 &amp; more</text></transcript>"#;
        let lines = parse_timed_text(xml).unwrap();
        assert_eq!(lines[0].text, "it's a \"test\" <3 & more");
    }

    #[test]
    fn test_parse_timed_text_empty() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript></transcript>"#;
        assert!(parse_timed_text(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_timed_text_skips_empty_and_bad_start() {
        let xml = r#"<transcript>
<text start="1" dur="1"></text>
<text start="2" dur="1"/>
<text start="abc" dur="1">no time</text>
<text dur="1">no start</text>
<text start="4" dur="1">kept</text>
</transcript>"#;

        let lines = parse_timed_text(xml).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "kept");
        assert_eq!(lines[0].time.to_string(), "00:00:04");
    }

    #[test]
    fn test_parse_timed_text_attribute_order_and_nested_markup() {
        let xml = r##"<transcript><text dur="3.0" start="7.5"><font color="#E5E5E5">quiet</font> please</text></transcript>"##;
        let lines = parse_timed_text(xml).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "quiet please");
        assert_eq!(lines[0].time.to_string(), "00:00:07");
    }

    #[test]
    fn test_parse_timed_text_tolerates_mismatched_end_tags() {
        let xml = r#"<transcript><text start="1" dur="1"><i>one</b></text><text start="2" dur="1">two</text></transcript>"#;
        let lines = parse_timed_text(xml).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_decode_entities_leaves_unknown_alone() {
        assert_eq!(decode_entities("&nbsp; &amp;amp;"), "&nbsp; &amp;");
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }
}
