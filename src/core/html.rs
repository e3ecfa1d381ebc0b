use crate::error::Result;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// HTML element an EAD tag is rendered as, if any.
fn html_tag(ead_tag: &[u8]) -> Option<&'static str> {
    match ead_tag {
        b"p" => Some("p"),
        b"emph" => Some("em"),
        b"list" | b"chronlist" => Some("ul"),
        b"item" | b"chronitem" => Some("li"),
        b"head" => Some("h4"),
        b"extref" | b"extptr" => Some("a"),
        b"title" => Some("i"),
        b"table" => Some("table"),
        b"row" => Some("tr"),
        b"entry" => Some("td"),
        _ => None,
    }
}

fn href(e: &BytesStart) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == b"href")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn open_tag(out: &mut String, tag: &str, e: &BytesStart) {
    match (tag, href(e)) {
        ("a", Some(link)) => out.push_str(&format!("<a href=\"{}\">", escape(link.as_str()))),
        _ => out.push_str(&format!("<{}>", tag)),
    }
}

/// Renders EAD markup (e.g. the content of a `scopecontent`) as simple HTML.
///
/// Unknown elements are dropped while their text is kept.
pub fn render(raw: &str) -> Result<String> {
    let wrapped = format!("<html-root>{}</html-root>", raw);
    let mut reader = Reader::from_str(&wrapped);
    let mut out = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == b"lb" {
                    out.push_str("<br/>");
                } else if let Some(tag) = html_tag(name.as_ref()) {
                    open_tag(&mut out, tag, &e);
                }
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if name.as_ref() == b"lb" {
                    out.push_str("<br/>");
                } else if let Some(tag) = html_tag(name.as_ref()) {
                    open_tag(&mut out, tag, &e);
                    out.push_str(&format!("</{}>", tag));
                }
            }
            Event::End(e) => {
                if let Some(tag) = html_tag(e.local_name().as_ref()) {
                    out.push_str(&format!("</{}>", tag));
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                out.push_str(&escape(&*text));
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(c.as_ref()).into_owned();
                out.push_str(&escape(text.as_str()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim().to_string())
}
