use crate::core::context::NodeConfig;
use crate::core::description::Description;
use crate::core::model::{Did, CONTENT_TAGS};
use crate::core::nodes::{Header, Node, NodeDate, NodeID};
use crate::core::parser::{attr, children, direct_text};
use crate::core::summary::UnitInfo;
use crate::error::EadError;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use roxmltree::Document;
use std::fmt;
use uuid::Uuid;

pub const EAD_NS: &str = "https://archief.nl/def/ead";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

/// Content elements whose markup is also mined for names and dates.
const EXTRACTED_TAGS: &[&str] = &["odd", "scopecontent", "bioghist"];

lazy_static! {
    static ref SPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Resource(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
    },
}

impl Term {
    pub fn resource(uri: impl Into<String>) -> Self {
        Term::Resource(uri.into())
    }

    /// A resource in the EAD vocabulary.
    pub fn ead(name: &str) -> Self {
        Term::Resource(format!("{}/{}", EAD_NS, name))
    }

    /// A fresh anonymous node; never shared between calls.
    pub fn blank() -> Self {
        Term::BlankNode(Uuid::new_v4().simple().to_string())
    }

    pub fn literal(value: &str) -> Self {
        Term::Literal {
            value: value.to_string(),
            datatype: None,
        }
    }

    pub fn integer(value: &str) -> Self {
        Term::Literal {
            value: value.to_string(),
            datatype: Some(XSD_INTEGER.to_string()),
        }
    }

    pub fn float(value: &str) -> Self {
        Term::Literal {
            value: value.to_string(),
            datatype: Some(XSD_FLOAT.to_string()),
        }
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Resource(uri) => write!(f, "<{}>", uri),
            Term::BlankNode(label) => write!(f, "_:b{}", label),
            Term::Literal {
                value,
                datatype: None,
            } => write!(f, "\"{}\"", escape_literal(value)),
            Term::Literal {
                value,
                datatype: Some(datatype),
            } => write!(f, "\"{}\"^^<{}>", escape_literal(value), datatype),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Triple {
            subject,
            predicate,
            object,
        }
    }

    pub fn to_ntriples(&self) -> String {
        format!("{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Serializes triples as N-Triples, one per line.
pub fn to_ntriples(triples: &[Triple]) -> String {
    let mut out = String::new();
    for triple in triples {
        out.push_str(&triple.to_ntriples());
        out.push('\n');
    }
    out
}

/// Literal constructor picked by the caller.
pub type Convert = fn(&str) -> Term;

/// A triple in the EAD vocabulary, or nothing when the object is empty.
pub fn non_empty_triple(subject: &Term, predicate: &str, object: &str, convert: Convert) -> Option<Triple> {
    if object.is_empty() {
        return None;
    }
    Some(Triple::new(subject.clone(), Term::ead(predicate), convert(object)))
}

/// Ordered triple collector.
#[derive(Debug, Default)]
struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    fn push(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    fn add(&mut self, subject: &Term, predicate: &str, object: &str, convert: Convert) {
        if let Some(triple) = non_empty_triple(subject, predicate, object, convert) {
            self.triples.push(triple);
        }
    }

    fn literal(&mut self, subject: &Term, predicate: &str, object: &str) {
        self.add(subject, predicate, object, Term::literal);
    }

    /// Adds the names and dates found directly inside the markup.
    fn extract(&mut self, subject: &Term, raw: &str) {
        for token in extract_tokens(raw) {
            self.literal(subject, token.kind.predicate(), &token.text);
        }
    }
}

/// Collapses whitespace runs to a single space and trims.
fn collapse(raw: &str) -> String {
    SPACE.replace_all(raw, " ").trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Person,
    GeoLocation,
    DateText,
    DateIso,
}

impl TokenKind {
    fn predicate(self) -> &'static str {
        match self {
            TokenKind::Person => "persname",
            TokenKind::GeoLocation => "geogname",
            TokenKind::DateText => "datetext",
            TokenKind::DateIso => "dateiso",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

/// Names and dates that are direct children of a markup fragment.
///
/// Fragments that do not parse yield no tokens.
pub fn extract_tokens(raw: &str) -> Vec<Token> {
    let wrapped = format!(
        "<input xmlns:xlink=\"http://www.w3.org/1999/xlink\">{}</input>",
        raw
    );
    let doc = match Document::parse(&wrapped) {
        Ok(doc) => doc,
        Err(err) => {
            debug!("skipping extraction: {}", err);
            return Vec::new();
        }
    };
    let root = doc.root_element();

    let mut tokens: Vec<Token> = children(root, "geogname")
        .map(|n| Token {
            kind: TokenKind::GeoLocation,
            text: direct_text(n),
        })
        .collect();

    tokens.extend(children(root, "persname").map(|n| Token {
        kind: TokenKind::Person,
        text: direct_text(n),
    }));

    for date in children(root, "date") {
        tokens.push(Token {
            kind: TokenKind::DateText,
            text: direct_text(date),
        });
        let normal = attr(date, "normal");
        if !normal.is_empty() {
            tokens.push(Token {
                kind: TokenKind::DateIso,
                text: normal,
            });
        }
    }

    tokens
}

impl NodeID {
    /// Triples of one unitid on a fresh anonymous node linked from `referrer`.
    pub fn triples(&self, referrer: &Term) -> Vec<Triple> {
        let s = Term::blank();
        let mut g = Graph::default();
        g.push(Triple::new(referrer.clone(), Term::ead("unitid"), s.clone()));
        g.literal(&s, "id", &self.id);
        g.literal(&s, "typeID", &self.type_id);
        g.literal(&s, "type", &self.kind);
        g.literal(&s, "audience", &self.audience);
        g.triples
    }
}

impl NodeDate {
    /// Triples of one unitdate on a fresh anonymous node linked from `referrer`.
    pub fn triples(&self, referrer: &Term) -> Vec<Triple> {
        let s = Term::blank();
        let mut g = Graph::default();
        g.push(Triple::new(referrer.clone(), Term::ead("unitdate"), s.clone()));
        g.literal(&s, "calendar", &self.calendar);
        g.literal(&s, "era", &self.era);
        g.literal(&s, "normal", &self.normal);
        g.literal(&s, "label", &self.label);
        g.literal(&s, "dateType", &self.kind);
        g.triples
    }
}

impl Header {
    /// Header literals plus unitid and unitdate nodes on the given did node.
    pub fn triples(&self, did: &Term) -> Vec<Triple> {
        let mut g = Graph::default();
        for label in &self.label {
            g.literal(did, "label", label);
        }
        g.literal(did, "inventoryNumber", &self.inventory_number);
        if let Some(physdesc) = &self.physdesc {
            g.literal(did, "physdesc", physdesc);
        }
        for id in &self.id {
            g.triples.extend(id.triples(did));
        }
        for date in &self.date {
            g.triples.extend(date.triples(did));
        }
        g.triples
    }
}

impl Did {
    /// Element level triples of a `did`.
    pub fn triples(&self, s: &Term) -> Vec<Triple> {
        let mut g = Graph::default();

        for id in &self.unitids {
            if id.audience != "internal" {
                g.literal(s, "unitID", &id.id);
            }
        }

        for title in &self.unittitles {
            g.literal(s, "unitTitle", &collapse(&title.raw));
            g.extract(s, &title.raw);
        }

        for date in &self.unitdates {
            g.literal(s, "unitDate", &date.text);
        }

        for physdesc in &self.physdescs {
            for extent in &physdesc.extents {
                g.literal(s, "physdescExtent", &extent.text);
            }
            for facet in &physdesc.physfacets {
                g.literal(s, "physdescPhysfacet", facet);
            }
            for dimension in &physdesc.dimensions {
                g.literal(s, "physdescDimension", dimension);
            }
            g.literal(s, "physdesc", physdesc.text.trim());
        }

        for physloc in &self.physlocs {
            g.literal(s, "physloc", &physloc.text);
        }
        for materialspec in &self.materialspecs {
            g.literal(s, "materialspec", &collapse(&materialspec.raw));
        }
        if let Some(origination) = &self.origination {
            g.literal(s, "origination", &collapse(&origination.raw));
        }
        if let Some(abstract_text) = &self.abstract_text {
            g.literal(s, "abstract", &collapse(&abstract_text.raw));
        }
        if let Some(langmaterial) = &self.langmaterial {
            g.literal(s, "langmaterial", &collapse(&langmaterial.raw));
        }
        for dao in &self.daos {
            g.literal(s, "dao", dao.attr("href"));
        }

        g.triples
    }
}

impl Node {
    /// Triples describing this node. Children are not included.
    pub fn triples(&self, cfg: &NodeConfig) -> Vec<Triple> {
        let s = Term::resource(self.subject(cfg));
        let mut g = Graph::default();

        g.push(Triple::new(s.clone(), Term::resource(RDF_TYPE), Term::ead("Clevel")));
        g.literal(&s, "cLevel", &self.tag);
        g.literal(&s, "branchID", &self.branch_id);
        g.literal(&s, "cType", &self.level);
        g.literal(&s, "cSubtype", &self.sub_level);

        let did = Term::blank();
        g.push(Triple::new(s.clone(), Term::ead("hasDid"), did.clone()));
        g.push(Triple::new(did.clone(), Term::resource(RDF_TYPE), Term::ead("Did")));
        g.triples.extend(self.header.triples(&did));
        if let Some(source) = &self.component.did {
            g.triples.extend(source.triples(&did));
        }

        for tag in CONTENT_TAGS {
            for element in self.component.content(tag) {
                g.literal(&s, tag, &collapse(&element.raw));
                if EXTRACTED_TAGS.contains(tag) {
                    g.extract(&s, &element.raw);
                }
            }
        }

        // nearest ancestor first
        let mut current = s.clone();
        for path in self.parent_paths().iter().rev() {
            let parent = Term::resource(cfg.subject(path));
            g.push(Triple::new(current, Term::ead("hasParent"), parent.clone()));
            if let Some(label) = cfg.labels().get(path) {
                if !label.is_empty() {
                    g.push(Triple::new(
                        parent.clone(),
                        Term::resource(RDFS_LABEL),
                        Term::literal(label),
                    ));
                }
            }
            current = parent;
        }

        for period in &cfg.period_desc {
            g.literal(&s, "periodDesc", period);
        }

        g.triples
    }
}

/// First whitespace separated token of a value that starts with a digit, with `,` as decimal point.
fn extract_digit(value: &str) -> String {
    value
        .split_whitespace()
        .find(|part| part.chars().next().map_or(false, |c| c.is_ascii_digit()))
        .map(|part| part.replace(',', "."))
        .unwrap_or_default()
}

impl Description {
    /// Subject of the description resource.
    pub fn subject(cfg: &NodeConfig) -> String {
        cfg.subject("desc")
    }

    /// Triples for the description resource.
    ///
    /// An empty `cfg.period_desc` is recorded as an error.
    pub fn graph(&self, cfg: &mut NodeConfig, unit: Option<&UnitInfo>) -> Vec<Triple> {
        let s = Term::resource(Description::subject(cfg));
        let mut g = Graph::default();

        if cfg.period_desc.is_empty() {
            cfg.record_error(&EadError::EmptyPeriod);
        }

        g.add(&s, "nrClevels", &cfg.counter.count().to_string(), Term::integer);

        if let Some(unit) = unit {
            g.add(&s, "files", &extract_digit(&unit.files), Term::integer);
            g.add(&s, "length", &extract_digit(&unit.length), Term::float);
            for abstract_text in &unit.abstract_text {
                g.literal(&s, "abstract", abstract_text);
            }
            g.literal(&s, "material", &unit.material);
            g.literal(&s, "language", &unit.language);
            for origin in &unit.origin {
                g.literal(&s, "origin", origin);
            }
        }

        for period in &cfg.period_desc {
            g.literal(&s, "periodDesc", period);
        }

        g.triples
    }
}
