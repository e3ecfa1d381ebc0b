use std::collections::BTreeMap;

use lazy_static::lazy_static;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

lazy_static! {
    static ref MARKUP: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Typed view of one EAD finding aid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ead {
    pub header: Option<EadHeader>,
    pub archdesc: Option<ArchDesc>,
}

/// The `eadheader` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EadHeader {
    pub raw: String,
    pub eadid: Option<EadId>,
    pub filedesc: Option<FileDesc>,
    pub profiledesc: Option<ProfileDesc>,
}

impl EadHeader {
    /// Direct text of `filedesc/titlestmt/titleproper`.
    pub fn title(&self) -> String {
        self.filedesc
            .as_ref()
            .and_then(|f| f.title_proper.as_ref())
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    /// Publisher of the finding aid.
    pub fn owner(&self) -> String {
        self.filedesc
            .as_ref()
            .and_then(|f| f.publication.as_ref())
            .and_then(|p| p.publisher.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EadId {
    pub raw: String,
    pub id: String,
    pub country_code: String,
    pub main_agency_code: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileDesc {
    pub raw: String,
    pub title_proper: Option<RawElement>,
    pub author: Option<RawElement>,
    pub edition_stmt: Option<RawElement>,
    pub publication: Option<PublicationStmt>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicationStmt {
    pub publisher: Option<String>,
    pub dates: Vec<String>,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDesc {
    pub creation: Option<RawElement>,
    pub langusage: Option<RawElement>,
}

/// A `p` element with its direct text and extref links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub id: String,
    pub text: String,
    pub extrefs: Vec<ExtRef>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtRef {
    pub text: String,
    pub attributes: BTreeMap<String, String>,
}

impl ExtRef {
    pub fn href(&self) -> &str {
        self.attributes.get("href").map(String::as_str).unwrap_or("")
    }
}

/// The `archdesc` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchDesc {
    pub level: String,
    pub dids: Vec<Did>,
    pub descgrps: Vec<RawElement>,
    pub dsc: Option<Dsc>,
}

impl ArchDesc {
    /// Human readable periods from the archdesc unitdates.
    pub fn periods(&self) -> Vec<String> {
        self.dids
            .iter()
            .flat_map(|did| did.unitdates.iter())
            .filter(|date| !date.text.is_empty())
            .map(|date| date.text.clone())
            .collect()
    }

    /// Normalised periods, skipping bulk dates.
    pub fn normal_periods(&self) -> Vec<String> {
        self.dids
            .iter()
            .flat_map(|did| did.unitdates.iter())
            .filter(|date| !date.normal.is_empty() && date.kind != "bulk")
            .map(|date| date.normal.clone())
            .collect()
    }

    pub fn first_did(&self) -> Option<&Did> {
        self.dids.first()
    }
}

/// The description of subordinate components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dsc {
    pub kind: String,
    pub heads: Vec<String>,
    pub paragraphs: Vec<Paragraph>,
    pub numbered: Vec<crate::core::numbered::C01>,
    pub components: Vec<Cc>,
}

/// Descriptive identification of a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Did {
    pub raw: String,
    pub unitids: Vec<UnitId>,
    pub unittitles: Vec<UnitTitle>,
    pub unitdates: Vec<UnitDate>,
    pub physdescs: Vec<PhysDesc>,
    pub physlocs: Vec<RawElement>,
    pub materialspecs: Vec<RawElement>,
    pub origination: Option<RawElement>,
    pub abstract_text: Option<RawElement>,
    pub langmaterial: Option<RawElement>,
    pub repository: Option<RawElement>,
    pub daos: Vec<RawElement>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitId {
    pub id: String,
    pub identifier: String,
    pub kind: String,
    pub audience: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTitle {
    pub raw: String,
    pub kind: String,
    pub dates: Vec<UnitDate>,
}

impl UnitTitle {
    pub fn title(&self) -> String {
        sanitize_xml(&self.raw)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitDate {
    pub text: String,
    pub calendar: String,
    pub era: String,
    pub normal: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysDesc {
    pub raw: String,
    pub text: String,
    pub extents: Vec<Extent>,
    pub physfacets: Vec<String>,
    pub dimensions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extent {
    pub text: String,
    pub unit: String,
}

/// Any element kept as attributes, direct text and inner xml.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub raw: String,
    pub text: String,
}

impl RawElement {
    pub fn attr(&self, name: &str) -> &str {
        self.attributes.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Descriptive content elements a c-level may carry, in emission order.
pub const CONTENT_TAGS: &[&str] = &[
    "accessrestrict",
    "controlaccess",
    "odd",
    "scopecontent",
    "phystech",
    "custodhist",
    "altformavail",
    "acqinfo",
    "userestrict",
    "accruals",
    "appraisal",
    "bioghist",
    "relatedmaterial",
    "arrangement",
    "separatedmaterial",
    "processinfo",
    "otherfindaid",
    "originalsloc",
    "fileplan",
    "descgrp",
];

/// The shared content of every c-level, numbered or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    pub tag: String,
    pub level: String,
    pub other_level: String,
    pub alt_render: String,
    pub did: Option<Did>,
    pub content: Vec<RawElement>,
}

impl Component {
    /// Content elements with the given tag, in document order.
    pub fn content<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a RawElement> + 'a {
        self.content.iter().filter(move |el| el.tag == tag)
    }
}

/// The unnumbered, self-nesting `c` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cc {
    pub component: Component,
    pub nested: Vec<Cc>,
}

/// Strips all markup from an inner-xml fragment and returns the trimmed text.
pub fn sanitize_xml(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let wrapped = format!("<r>{}</r>", raw);
    let mut reader = Reader::from_str(&wrapped);
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(s) => text.push_str(&s),
                Err(_) => text.push_str(&String::from_utf8_lossy(t.as_ref())),
            },
            Ok(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(c.as_ref())),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            // fragments that do not tokenize fall back to a plain tag strip
            Err(_) => return MARKUP.replace_all(raw, "").trim().to_string(),
        }
    }
    text.trim().to_string()
}

/// Splits an abstract on its line breaks, turning extrefs into anchors.
pub fn clean_abstract(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    let raw = raw.replace("extref", "a").replace(" />", "/>");
    raw.split("<lb/>")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_markup_and_entities() {
        assert_eq!(
            sanitize_xml("  Archief van <emph render=\"italic\">Staten</emph> &amp; Raad "),
            "Archief van Staten & Raad"
        );
        assert_eq!(sanitize_xml("   "), "");
    }

    #[test]
    fn test_sanitize_falls_back_on_broken_fragment() {
        assert_eq!(sanitize_xml("a <b>c</d> e"), "a c e");
    }

    #[test]
    fn test_clean_abstract_splits_on_line_breaks() {
        let raw = "Eerste regel<lb /> <extref href=\"http://x\">link</extref><lb/>  ";
        assert_eq!(
            clean_abstract(raw),
            vec![
                "Eerste regel".to_string(),
                "<a href=\"http://x\">link</a>".to_string()
            ]
        );
    }

    #[test]
    fn test_normal_periods_skip_bulk() {
        let archdesc = ArchDesc {
            dids: vec![Did {
                unitdates: vec![
                    UnitDate {
                        text: "1900-1950".into(),
                        normal: "1900/1950".into(),
                        ..Default::default()
                    },
                    UnitDate {
                        text: "1920-1930".into(),
                        normal: "1920/1930".into(),
                        kind: "bulk".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(archdesc.normal_periods(), vec!["1900/1950".to_string()]);
        assert_eq!(archdesc.periods().len(), 2);
    }
}
