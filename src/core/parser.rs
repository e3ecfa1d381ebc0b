use crate::core::model::*;
use crate::core::numbered::C01;
use crate::error::{EadError, Result};
use crate::mmap_reader::MmapFileReader;
use log::debug;
use quick_xml::escape::escape;
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::BTreeMap;
use std::path::Path;

/// Files above this size are memory-mapped instead of read into a buffer.
const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

pub trait Parser {
    /// Parse an EAD file on disk into the typed document model
    fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Ead>;
}

/// EadParser: builds the document model from `ead` XML using roxmltree.
pub struct EadParser;

impl Parser for EadParser {
    fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Ead> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();

        if size > MMAP_THRESHOLD {
            debug!("memory-mapping {} ({} bytes)", path.display(), size);
            let reader = MmapFileReader::new(path)?;
            Ead::from_bytes(reader.as_slice())
        } else {
            let bytes = std::fs::read(path)?;
            Ead::from_bytes(&bytes)
        }
    }
}

impl Ead {
    pub fn from_bytes(bytes: &[u8]) -> Result<Ead> {
        let text = std::str::from_utf8(bytes).map_err(|e| EadError::XmlDecode(e.to_string()))?;
        Ead::parse_str(text)
    }

    pub fn parse_str(text: &str) -> Result<Ead> {
        let text = text.trim_start_matches('\u{feff}');
        let mut options = ParsingOptions::default();
        options.allow_dtd = true;
        let doc = Document::parse_with_options(text, options)?;
        let root = doc.root_element();

        if root.tag_name().name() != "ead" {
            return Err(EadError::XmlDecode(format!(
                "expected <ead> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        Ok(Ead {
            header: child(root, "eadheader").map(|n| parse_header(n, text)),
            archdesc: child(root, "archdesc").map(|n| parse_archdesc(n, text)),
        })
    }
}

pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Attribute value by local name, so `xlink:href` and `href` both match `href`.
pub(crate) fn attr(node: Node, name: &str) -> String {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value().to_string())
        .unwrap_or_default()
}

fn attributes(node: Node) -> BTreeMap<String, String> {
    node.attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect()
}

/// The inner xml of an element exactly as it appears in the source.
pub(crate) fn inner_xml(node: Node, src: &str) -> String {
    match (node.first_child(), node.last_child()) {
        (Some(first), Some(last)) => src
            .get(first.range().start..last.range().end)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Concatenated direct character data of an element, trimmed.
pub(crate) fn direct_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn raw_element(node: Node, src: &str) -> RawElement {
    RawElement {
        tag: node.tag_name().name().to_string(),
        attributes: attributes(node),
        raw: inner_xml(node, src),
        text: direct_text(node),
    }
}

fn parse_header(node: Node, src: &str) -> EadHeader {
    EadHeader {
        raw: inner_xml(node, src),
        eadid: child(node, "eadid").map(|n| EadId {
            raw: inner_xml(n, src),
            id: direct_text(n),
            country_code: attr(n, "countrycode"),
            main_agency_code: attr(n, "mainagencycode"),
        }),
        filedesc: child(node, "filedesc").map(|n| parse_filedesc(n, src)),
        profiledesc: child(node, "profiledesc").map(|n| ProfileDesc {
            creation: child(n, "creation").map(|c| raw_element(c, src)),
            langusage: child(n, "langusage").map(|c| raw_element(c, src)),
        }),
    }
}

fn parse_filedesc(node: Node, src: &str) -> FileDesc {
    let titlestmt = child(node, "titlestmt");
    FileDesc {
        raw: inner_xml(node, src),
        title_proper: titlestmt
            .and_then(|t| child(t, "titleproper"))
            .map(|n| raw_element(n, src)),
        author: titlestmt
            .and_then(|t| child(t, "author"))
            .map(|n| raw_element(n, src)),
        edition_stmt: child(node, "editionstmt").map(|n| raw_element(n, src)),
        publication: child(node, "publicationstmt").map(|n| PublicationStmt {
            publisher: child(n, "publisher").map(direct_text),
            dates: children(n, "date").map(direct_text).collect(),
            paragraphs: children(n, "p").map(parse_paragraph).collect(),
        }),
    }
}

fn parse_paragraph(node: Node) -> Paragraph {
    Paragraph {
        id: attr(node, "id"),
        text: direct_text(node),
        extrefs: children(node, "extref")
            .map(|n| ExtRef {
                text: direct_text(n),
                attributes: attributes(n),
            })
            .collect(),
    }
}

fn parse_archdesc(node: Node, src: &str) -> ArchDesc {
    ArchDesc {
        level: attr(node, "level"),
        dids: children(node, "did").map(|n| parse_did(n, src)).collect(),
        descgrps: children(node, "descgrp").map(|n| raw_element(n, src)).collect(),
        dsc: child(node, "dsc").map(|n| parse_dsc(n, src)),
    }
}

fn parse_dsc(node: Node, src: &str) -> Dsc {
    Dsc {
        kind: attr(node, "type"),
        heads: children(node, "head").map(direct_text).collect(),
        paragraphs: children(node, "p").map(parse_paragraph).collect(),
        numbered: children(node, "c01").map(|n| C01::from_node(n, src)).collect(),
        components: children(node, "c").map(|n| parse_cc(n, src)).collect(),
    }
}

fn parse_unitdate(node: Node) -> UnitDate {
    UnitDate {
        text: direct_text(node),
        calendar: attr(node, "calendar"),
        era: attr(node, "era"),
        normal: attr(node, "normal"),
        kind: attr(node, "type"),
    }
}

pub(crate) fn parse_did(node: Node, src: &str) -> Did {
    Did {
        raw: inner_xml(node, src),
        unitids: children(node, "unitid")
            .map(|n| UnitId {
                id: direct_text(n),
                identifier: attr(n, "identifier"),
                kind: attr(n, "type"),
                audience: attr(n, "audience"),
            })
            .collect(),
        unittitles: children(node, "unittitle")
            .map(|n| UnitTitle {
                raw: inner_xml(n, src),
                kind: attr(n, "type"),
                dates: children(n, "unitdate").map(parse_unitdate).collect(),
            })
            .collect(),
        unitdates: children(node, "unitdate").map(parse_unitdate).collect(),
        physdescs: children(node, "physdesc")
            .map(|n| PhysDesc {
                raw: inner_xml(n, src),
                text: direct_text(n),
                extents: children(n, "extent")
                    .map(|e| Extent {
                        text: direct_text(e),
                        unit: attr(e, "unit"),
                    })
                    .collect(),
                physfacets: children(n, "physfacet").map(direct_text).collect(),
                dimensions: children(n, "dimensions").map(direct_text).collect(),
            })
            .collect(),
        physlocs: children(node, "physloc").map(|n| raw_element(n, src)).collect(),
        materialspecs: children(node, "materialspec")
            .map(|n| raw_element(n, src))
            .collect(),
        origination: child(node, "origination").map(|n| raw_element(n, src)),
        abstract_text: child(node, "abstract").map(|n| raw_element(n, src)),
        langmaterial: child(node, "langmaterial").map(|n| raw_element(n, src)),
        repository: child(node, "repository").map(|n| raw_element(n, src)),
        daos: children(node, "dao").map(|n| raw_element(n, src)).collect(),
    }
}

/// Reads the content shared by every c-level; nested levels are left to the caller.
pub(crate) fn parse_component(node: Node, src: &str) -> Component {
    Component {
        tag: node.tag_name().name().to_string(),
        level: attr(node, "level"),
        other_level: attr(node, "otherlevel"),
        alt_render: attr(node, "altrender"),
        did: child(node, "did").map(|n| parse_did(n, src)),
        content: node
            .children()
            .filter(|n| n.is_element() && CONTENT_TAGS.contains(&n.tag_name().name()))
            .map(|n| raw_element(n, src))
            .collect(),
    }
}

pub(crate) fn parse_cc(node: Node, src: &str) -> Cc {
    Cc {
        component: parse_component(node, src),
        nested: children(node, "c").map(|n| parse_cc(n, src)).collect(),
    }
}

impl Paragraph {
    /// Turns a loose `dsc` paragraph into a file-level c-level.
    pub fn to_clevel(&self) -> Result<Cc> {
        let title = self.text.replacen(". .", ".", 1);
        let mut odd = String::new();
        if !self.extrefs.is_empty() {
            odd.push_str("<odd>");
            for extref in &self.extrefs {
                odd.push_str("<p><extref");
                for (key, value) in &extref.attributes {
                    odd.push_str(&format!(" {}=\"{}\"", key, escape(value.as_str())));
                }
                odd.push_str("></extref></p>");
            }
            odd.push_str("</odd>");
        }

        let fake = format!(
            r#"<c level="file"><did><unittitle>{}</unittitle></did>{}</c>"#,
            escape(title.as_str()),
            odd
        );
        let doc = Document::parse(&fake)?;
        Ok(parse_cc(doc.root_element(), &fake))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ead PUBLIC "+//ISBN 1-931666-00-8//DTD ead.dtd (Encoded Archival Description (EAD) Version 2002)//EN" "ead.dtd">
<ead audience="external">
  <eadheader>
    <eadid countrycode="NL" mainagencycode="NL-HaNA">2.13.71</eadid>
    <filedesc>
      <titlestmt>
        <titleproper>Inventaris van het archief van <emph>de Marine</emph></titleproper>
        <author>J. Jansen</author>
      </titlestmt>
      <publicationstmt>
        <publisher>Nationaal Archief</publisher>
        <date>2019</date>
        <p id="copyright"><extref href="https://creativecommons.org/publicdomain/zero/1.0/">cc0</extref></p>
      </publicationstmt>
    </filedesc>
  </eadheader>
  <archdesc level="fonds">
    <did>
      <unittitle>Marine</unittitle>
      <unitdate normal="1813/1900" type="inclusive">1813-1900</unitdate>
      <abstract>Stukken<lb/>betreffende de vloot</abstract>
    </did>
    <dsc type="combined">
      <head>Beschrijving</head>
      <c01 level="series">
        <did><unitid type="ABS">1</unitid><unittitle>Algemeen</unittitle></did>
        <c02 level="file"><did><unitid>2</unitid><unittitle>Notulen</unittitle></did></c02>
      </c01>
    </dsc>
  </archdesc>
</ead>"#;

    #[test]
    fn test_parse_header_and_archdesc() {
        let ead = Ead::parse_str(HEADER).unwrap();
        let header = ead.header.as_ref().unwrap();
        let eadid = header.eadid.as_ref().unwrap();
        assert_eq!(eadid.id, "2.13.71");
        assert_eq!(eadid.country_code, "NL");
        assert_eq!(eadid.main_agency_code, "NL-HaNA");

        let filedesc = header.filedesc.as_ref().unwrap();
        assert_eq!(
            filedesc.title_proper.as_ref().unwrap().raw,
            "Inventaris van het archief van <emph>de Marine</emph>"
        );
        let publication = filedesc.publication.as_ref().unwrap();
        assert_eq!(publication.publisher.as_deref(), Some("Nationaal Archief"));
        assert_eq!(publication.paragraphs[0].id, "copyright");
        assert_eq!(
            publication.paragraphs[0].extrefs[0].href(),
            "https://creativecommons.org/publicdomain/zero/1.0/"
        );

        let archdesc = ead.archdesc.as_ref().unwrap();
        assert_eq!(archdesc.level, "fonds");
        let did = archdesc.first_did().unwrap();
        assert_eq!(did.unitdates[0].normal, "1813/1900");
        assert_eq!(
            did.abstract_text.as_ref().unwrap().raw,
            "Stukken<lb/>betreffende de vloot"
        );

        let dsc = archdesc.dsc.as_ref().unwrap();
        assert_eq!(dsc.kind, "combined");
        assert_eq!(dsc.heads, vec!["Beschrijving".to_string()]);
        assert_eq!(dsc.numbered.len(), 1);
        assert_eq!(dsc.numbered[0].nested.len(), 1);
        assert_eq!(dsc.numbered[0].nested[0].component.tag, "c02");
    }

    #[test]
    fn test_parse_rejects_non_ead_root() {
        let err = Ead::parse_str("<html><body/></html>").unwrap_err();
        assert!(matches!(err, EadError::XmlDecode(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        assert!(matches!(
            Ead::parse_str("<ead><archdesc></ead>"),
            Err(EadError::XmlDecode(_))
        ));
    }

    #[test]
    fn test_paragraph_to_clevel() {
        let p = Paragraph {
            text: "Losse stukken. . & aanvullingen".into(),
            extrefs: vec![ExtRef {
                text: "scan".into(),
                attributes: BTreeMap::from([("href".to_string(), "http://x/1".to_string())]),
            }],
            ..Default::default()
        };
        let cc = p.to_clevel().unwrap();
        assert_eq!(cc.component.level, "file");
        let did = cc.component.did.as_ref().unwrap();
        assert_eq!(did.unittitles[0].title(), "Losse stukken. & aanvullingen");
        let odd: Vec<_> = cc.component.content("odd").collect();
        assert_eq!(odd[0].raw, r#"<p><extref href="http://x/1"></extref></p>"#);
    }
}
