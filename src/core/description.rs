use crate::core::model::Ead;
use crate::core::summary::Summary;
use crate::error::{EadError, Result};
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of a narrative item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Paragraph,
    Date,
    Image,
    Link,
    List,
    ListItem,
    DefItem,
    ListLabel,
    Table,
    TableHead,
    TableRow,
    TableCel,
    Unit,
    Language,
    Repository,
    Nested,
    Enum,
    Section,
    SubSection,
    Note,
    ChronList,
    ChronItem,
    Event,
}

/// How an item flows from the item before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    #[default]
    LineBreak,
    Inline,
    Next,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One entry of the flattened archival description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataItem {
    #[serde(rename = "type")]
    pub kind: DataType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub lang_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub script_code: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub units: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag_type: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub list_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub list_type: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub activate: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub show_link: String,

    pub depth: u32,
    #[serde(rename = "parentIDS")]
    pub parent_ids: String,

    #[serde(rename = "flowType")]
    pub flow: FlowType,
    pub order: u64,
    #[serde(skip_serializing_if = "is_false")]
    pub closed: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub normal: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub era: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub calendar: String,
}

impl DataItem {
    fn new(tag: &str) -> Self {
        DataItem {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// A fresh item carrying only the structural fields of this one.
    fn clone_structure(&self) -> Self {
        DataItem {
            kind: self.kind,
            label: self.label.clone(),
            lang_code: self.lang_code.clone(),
            script_code: self.script_code.clone(),
            number: self.number.clone(),
            units: self.units.clone(),
            tag: self.tag.clone(),
            tag_type: self.tag_type.clone(),
            link: self.link.clone(),
            link_type: self.link_type.clone(),
            activate: self.activate.clone(),
            normal: self.normal.clone(),
            era: self.era.clone(),
            calendar: self.calendar.clone(),
            ..Default::default()
        }
    }
}

/// Tags with their own handling in the builder; everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Head,
    Emph,
    SubSection,
    LineBreak,
    BibRef,
    Title,
    Paragraph,
    Note,
    List,
    Item,
    DefItem,
    Table,
    Row,
    Entry,
    Label,
    ChronList,
    ChronItem,
    Date,
    Event,
    Link,
    Other,
}

impl TagKind {
    fn parse(tag: &str) -> Self {
        match tag {
            "head" => TagKind::Head,
            "emph" => TagKind::Emph,
            "bioghist" | "custodhist" | "acqinfo" | "scopecontent" | "phystech" | "otherfindaid"
            | "odd" | "prefercite" | "altformavail" | "relatedmaterial" => TagKind::SubSection,
            "lb" => TagKind::LineBreak,
            "bibref" => TagKind::BibRef,
            "title" => TagKind::Title,
            "p" => TagKind::Paragraph,
            "note" => TagKind::Note,
            "list" => TagKind::List,
            "item" => TagKind::Item,
            "defitem" => TagKind::DefItem,
            "table" => TagKind::Table,
            "row" => TagKind::Row,
            "entry" => TagKind::Entry,
            "label" => TagKind::Label,
            "chronlist" => TagKind::ChronList,
            "chronitem" => TagKind::ChronItem,
            "date" => TagKind::Date,
            "event" => TagKind::Event,
            "extref" | "extptr" => TagKind::Link,
            _ => TagKind::Other,
        }
    }
}

/// Concurrency safe counter for the items of one description.
#[derive(Debug, Default)]
pub struct ItemCounter {
    counter: AtomicU64,
}

impl ItemCounter {
    pub fn increment(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

fn attr<'a>(attributes: &'a [(String, String)], name: &str) -> &'a str {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

fn start_attributes(e: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute in e.attributes() {
        let attribute = attribute.map_err(|err| EadError::XmlDecode(err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = match attribute.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attribute.value).into_owned(),
        };
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn local_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// Stack machine flattening narrative EAD markup into ordered DataItems.
///
/// `items` owns every item in emission order; the stack only holds indices of
/// the currently open ones and is accessed at the back.
#[derive(Debug, Default)]
pub struct ItemBuilder {
    counter: ItemCounter,
    items: Vec<DataItem>,
    stack: Vec<usize>,
}

impl ItemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[DataItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<DataItem> {
        self.items
    }

    pub fn count(&self) -> u64 {
        self.counter.count()
    }

    fn top(&self) -> Option<&DataItem> {
        self.stack.last().map(|&idx| &self.items[idx])
    }

    fn top_mut(&mut self) -> Option<&mut DataItem> {
        match self.stack.last() {
            Some(&idx) => self.items.get_mut(idx),
            None => None,
        }
    }

    /// `~` separated orders of the open items, oldest first.
    fn parent_ids(&self) -> String {
        self.stack
            .iter()
            .map(|&idx| self.items[idx].order.to_string())
            .collect::<Vec<_>>()
            .join("~")
    }

    /// Stamps order, parent ids and depth on the item and opens it.
    pub fn append(&mut self, mut item: DataItem) -> u64 {
        item.order = self.counter.increment();
        item.parent_ids = self.parent_ids();
        item.depth = self.stack.len() as u32 + 1;
        let order = item.order;
        self.items.push(item);
        self.stack.push(self.items.len() - 1);
        order
    }

    /// Item appended with the given order, if any.
    pub fn item(&self, order: u64) -> Option<&DataItem> {
        self.items.iter().rev().find(|item| item.order == order)
    }

    /// Marks the open item as closed, so later text creates a sibling.
    pub fn close(&mut self) -> Result<()> {
        match self.top_mut() {
            Some(item) => {
                item.closed = true;
                Ok(())
            }
            None => Err(EadError::UnbalancedStack("nothing to close".to_string())),
        }
    }

    fn add_flow_type(&mut self, flow: FlowType) -> Result<()> {
        match self.top_mut() {
            Some(item) => {
                item.flow = flow;
                Ok(())
            }
            None => Err(EadError::UnbalancedStack("nothing to mark inline".to_string())),
        }
    }

    /// Appends emphasis markup to the top item, even when it is closed, so the
    /// markup stays on the item whose text it wraps.
    fn add_text_previous(&mut self, text: &str) {
        match self.top_mut() {
            Some(item) => item.text.push_str(text),
            None => warn!("dropping inline markup {:?}: no open item", text.trim()),
        }
    }

    /// Handles a start tag.
    pub fn push(&mut self, tag: &str, attributes: &[(String, String)]) -> Result<()> {
        let mut item = DataItem::new(tag);

        match TagKind::parse(tag) {
            TagKind::Head => return Ok(()),
            TagKind::Emph => {
                self.add_text_previous(" <em>");
                return Ok(());
            }
            TagKind::SubSection => item.kind = DataType::SubSection,
            TagKind::LineBreak => {
                if self.top().map_or(false, |prev| prev.tag == "bibref") {
                    item.flow = FlowType::Inline;
                }
            }
            TagKind::BibRef => item.flow = FlowType::Inline,
            TagKind::Title => {
                item.flow = FlowType::Inline;
                self.close()?;
            }
            TagKind::Paragraph => {
                if self.top().map_or(false, |prev| prev.kind == DataType::Note) {
                    item.kind = DataType::Note;
                    item.flow = FlowType::Inline;
                } else {
                    item.kind = DataType::Paragraph;
                }
            }
            TagKind::Note => {
                self.add_flow_type(FlowType::Inline)?;
                self.close()?;
                item.kind = DataType::Note;
                item.flow = FlowType::Inline;
            }
            TagKind::List => {
                self.close()?;
                item.kind = DataType::List;
                item.list_number = attr(attributes, "numeration").to_string();
                item.list_type = attr(attributes, "type").to_string();
            }
            TagKind::Item => item.kind = DataType::ListItem,
            TagKind::DefItem => item.kind = DataType::DefItem,
            TagKind::Table => item.kind = DataType::Table,
            TagKind::Row => {
                item.kind = match self.top() {
                    Some(prev) if prev.tag == "thead" => DataType::TableHead,
                    _ => DataType::TableRow,
                };
            }
            TagKind::Entry => item.kind = DataType::TableCel,
            TagKind::Label => item.kind = DataType::ListLabel,
            TagKind::ChronList => item.kind = DataType::ChronList,
            TagKind::ChronItem => item.kind = DataType::ChronItem,
            TagKind::Date => {
                item.kind = DataType::Date;
                item.calendar = attr(attributes, "calendar").to_string();
                item.era = attr(attributes, "era").to_string();
                item.normal = attr(attributes, "normal").to_string();
            }
            TagKind::Event => item.kind = DataType::Event,
            TagKind::Link => {
                self.close()?;
                item.kind = DataType::Link;
                item.flow = FlowType::Inline;
                item.activate = attr(attributes, "actuate").to_string();
                item.link = attr(attributes, "href").to_string();
                item.link_type = attr(attributes, "linktype").to_string();
                item.show_link = attr(attributes, "show").to_string();
            }
            TagKind::Other => {
                item.label = attr(attributes, "label").to_string();
                item.tag_type = attr(attributes, "type").to_string();
            }
        }

        self.append(item);
        Ok(())
    }

    /// Handles an end tag.
    pub fn pop(&mut self, tag: &str) -> Result<()> {
        match TagKind::parse(tag) {
            TagKind::Head => {}
            TagKind::Emph => self.add_text_previous("</em> "),
            // line breaks stay open; a lone hyphen continues the word
            TagKind::LineBreak => {
                if let Some(item) = self.top_mut() {
                    if item.text == "-" {
                        item.flow = FlowType::Inline;
                    }
                }
            }
            _ => {
                let idx = self.stack.pop().ok_or_else(|| {
                    EadError::UnbalancedStack(format!("no open item for </{}>", tag))
                })?;
                let item = &mut self.items[idx];
                if item.kind == DataType::Paragraph {
                    match item.text.as_str() {
                        "" | "-" => item.flow = FlowType::Inline,
                        "." => item.flow = FlowType::Next,
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Handles character data.
    pub fn add_text(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let item = match self.top_mut() {
            Some(item) => item,
            None => {
                warn!("dropping text {:?}: no open item", text);
                return Ok(());
            }
        };

        if item.closed {
            let mut sibling = item.clone_structure();
            sibling.text = text.to_string();
            self.append(sibling);
            return self.pop("p");
        }

        item.text.push_str(text);
        Ok(())
    }

    /// Feeds a raw xml fragment through the builder.
    pub fn parse(&mut self, raw: &[u8]) -> Result<()> {
        let mut reader = Reader::from_reader(raw);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let tag = local_name(e.local_name().as_ref());
                    let attributes = start_attributes(&e)?;
                    self.push(&tag, &attributes)?;
                }
                Event::Empty(e) => {
                    let tag = local_name(e.local_name().as_ref());
                    let attributes = start_attributes(&e)?;
                    self.push(&tag, &attributes)?;
                    self.pop(&tag)?;
                }
                Event::End(e) => {
                    let tag = local_name(e.local_name().as_ref());
                    self.pop(&tag)?;
                }
                Event::Text(t) => {
                    let text = match t.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            debug!("keeping undecoded text: {}", err);
                            String::from_utf8_lossy(t.as_ref()).into_owned()
                        }
                    };
                    self.add_text(&text)?;
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(c.as_ref()).into_owned();
                    self.add_text(&text)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }
}

/// Boundaries of one section in the item sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    pub start: u64,
    pub end: u64,
    pub order: usize,
}

/// Simplified `eadheader`, `archdesc/did` and `archdesc/descgrp` for searching and rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    pub summary: Summary,
    #[serde(rename = "sections", skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionInfo>,
    pub nr_sections: usize,
    pub nr_items: usize,
    #[serde(rename = "item", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<DataItem>,
}

/// Opens a section item, feeds the fragments through the builder and records its boundaries.
fn add_section(
    builder: &mut ItemBuilder,
    section: DataItem,
    fragments: &[&str],
    order: usize,
    text: Option<&str>,
) -> Result<SectionInfo> {
    let start = builder.append(section);
    for fragment in fragments {
        builder.parse(fragment.as_bytes())?;
    }

    let text = match text {
        Some(text) => text.to_string(),
        None => builder
            .item(start)
            .map(|item| item.text.clone())
            .unwrap_or_default(),
    };

    Ok(SectionInfo {
        text,
        start,
        end: builder.count(),
        order,
    })
}

impl Description {
    /// Builds the description of a finding aid.
    pub fn build(ead: &Ead) -> Result<Description> {
        let mut desc = Description {
            summary: Summary::new(ead),
            ..Default::default()
        };
        let mut builder = ItemBuilder::new();

        let header = ead.header.as_ref();
        let eadid = header
            .and_then(|h| h.eadid.as_ref())
            .map(|e| e.raw.as_str())
            .unwrap_or("");
        let filedesc = header
            .and_then(|h| h.filedesc.as_ref())
            .map(|f| f.raw.as_str())
            .unwrap_or("");

        let archive = DataItem {
            kind: DataType::Section,
            tag: "eadid".to_string(),
            label: "Archive: ".to_string(),
            ..Default::default()
        };
        desc.sections.push(add_section(
            &mut builder,
            archive,
            &[eadid, filedesc],
            1,
            Some("Archive"),
        )?);

        let archdesc = ead.archdesc.as_ref();
        if let Some(did) = archdesc.and_then(|a| a.first_did()) {
            let section = DataItem {
                kind: DataType::Section,
                tag: "archdesc-did".to_string(),
                ..Default::default()
            };
            desc.sections
                .push(add_section(&mut builder, section, &[did.raw.as_str()], 2, None)?);
        }

        for (idx, grp) in archdesc.map(|a| a.descgrps.as_slice()).unwrap_or(&[]).iter().enumerate() {
            let section = DataItem {
                kind: DataType::Section,
                tag: "descgrp".to_string(),
                tag_type: grp.attr("type").to_string(),
                ..Default::default()
            };
            desc.sections
                .push(add_section(&mut builder, section, &[grp.raw.as_str()], idx + 3, None)?);
        }

        desc.items = builder.into_items();
        desc.nr_sections = desc.sections.len();
        desc.nr_items = desc.items.len();
        debug!(
            "description with {} sections and {} items",
            desc.nr_sections, desc.nr_items
        );

        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Vec<DataItem> {
        let mut builder = ItemBuilder::new();
        builder.parse(raw.as_bytes()).unwrap();
        builder.into_items()
    }

    #[test]
    fn test_single_item() {
        let items = parse("<item>bertillonnage, 1896-1922, drankwet, 1883-1905 opiumwet, vanaf 1928</item>");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.kind, DataType::ListItem);
        assert_eq!(
            item.text,
            "bertillonnage, 1896-1922, drankwet, 1883-1905 opiumwet, vanaf 1928"
        );
        assert_eq!(item.depth, 1);
        assert_eq!(item.order, 1);
        assert_eq!(item.parent_ids, "");
    }

    #[test]
    fn test_emph_is_rewritten_inline() {
        let items = parse("<item>bertillonnage, <emph>1896-1922,</emph> drankwet</item>");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "bertillonnage, <em>1896-1922,</em> drankwet");
    }

    #[test]
    fn test_defitem_nesting() {
        let items = parse("<defitem><label>Strafrecht</label><item>Wetboek</item></defitem>");
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].kind, DataType::DefItem);
        assert_eq!((items[0].order, items[0].depth), (1, 1));

        assert_eq!(items[1].kind, DataType::ListLabel);
        assert_eq!(items[1].text, "Strafrecht");
        assert_eq!((items[1].order, items[1].depth), (2, 2));
        assert_eq!(items[1].parent_ids, "1");

        assert_eq!(items[2].kind, DataType::ListItem);
        assert_eq!(items[2].text, "Wetboek");
        assert_eq!((items[2].order, items[2].depth), (3, 2));
        assert_eq!(items[2].parent_ids, "1");
    }

    #[test]
    fn test_text_after_link_creates_sibling() {
        let items =
            parse(r#"<p>Zie <extref href="http://example.org">de scan</extref> voor meer</p>"#);
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].text, "Zie");
        assert!(items[0].closed);

        assert_eq!(items[1].kind, DataType::Link);
        assert_eq!(items[1].link, "http://example.org");
        assert_eq!(items[1].flow, FlowType::Inline);
        assert_eq!(items[1].parent_ids, "1");

        assert_eq!(items[2].kind, DataType::Paragraph);
        assert_eq!(items[2].tag, "p");
        assert_eq!(items[2].text, "voor meer");
        assert_eq!(items[2].order, 3);
        assert_eq!(items[2].depth, 2);
        assert!(!items[2].closed);
    }

    #[test]
    fn test_paragraph_flow_sentinels() {
        let items = parse("<p>.</p><p>-</p><p/><p>tekst</p>");
        let flows: Vec<FlowType> = items.iter().map(|i| i.flow).collect();
        assert_eq!(
            flows,
            vec![
                FlowType::Next,
                FlowType::Inline,
                FlowType::Inline,
                FlowType::LineBreak
            ]
        );
    }

    #[test]
    fn test_note_marks_previous_inline() {
        let items = parse("<p>Tekst<note><p>Voetnoot</p></note></p>");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].flow, FlowType::Inline);
        assert!(items[0].closed);
        assert_eq!(items[1].kind, DataType::Note);
        assert_eq!(items[2].kind, DataType::Note);
        assert_eq!(items[2].flow, FlowType::Inline);
        assert_eq!(items[2].text, "Voetnoot");
        assert_eq!(items[2].parent_ids, "1~2");
    }

    #[test]
    fn test_list_attributes_and_table_rows() {
        let items = parse(
            r#"<p>Lijst<list numeration="arabic" type="ordered"><item>een</item></list></p><table><thead><row><entry>a</entry></row></thead><tbody><row><entry>b</entry></row></tbody></table>"#,
        );
        let list = items.iter().find(|i| i.kind == DataType::List).unwrap();
        assert_eq!(list.list_number, "arabic");
        assert_eq!(list.list_type, "ordered");

        let rows: Vec<DataType> = items
            .iter()
            .filter(|i| i.tag == "row")
            .map(|i| i.kind)
            .collect();
        assert_eq!(rows, vec![DataType::TableHead, DataType::TableRow]);
        assert!(items.iter().any(|i| i.kind == DataType::TableCel && i.text == "b"));
    }

    #[test]
    fn test_date_and_generic_attributes() {
        let items = parse(
            r#"<chronlist><chronitem><date normal="1813" calendar="gregorian" era="ce">1813</date><event>Oprichting</event></chronitem></chronlist><unit label="Omvang" type="meter">12</unit>"#,
        );
        let date = items.iter().find(|i| i.kind == DataType::Date).unwrap();
        assert_eq!(date.normal, "1813");
        assert_eq!(date.calendar, "gregorian");
        assert_eq!(date.era, "ce");
        assert!(items.iter().any(|i| i.kind == DataType::Event));
        let unit = items.iter().find(|i| i.tag == "unit").unwrap();
        assert_eq!(unit.label, "Omvang");
        assert_eq!(unit.tag_type, "meter");
        assert_eq!(unit.kind, DataType::Paragraph);
    }

    #[test]
    fn test_line_break_in_bibref_is_inline() {
        let items = parse("<bibref>Boek<lb/></bibref>");
        assert_eq!(items[0].flow, FlowType::Inline);
        assert_eq!(items[1].tag, "lb");
        assert_eq!(items[1].flow, FlowType::Inline);
    }

    #[test]
    fn test_pop_on_empty_stack_is_an_error() {
        let mut builder = ItemBuilder::new();
        assert!(matches!(
            builder.pop("p"),
            Err(EadError::UnbalancedStack(_))
        ));
        assert!(matches!(builder.close(), Err(EadError::UnbalancedStack(_))));
    }

    #[test]
    fn test_text_and_emph_without_open_item_are_skipped() {
        let items = parse("los<emph>nadruk</emph>");
        assert!(items.is_empty());
    }

    #[test]
    fn test_emph_markup_lands_on_closed_item() {
        let items = parse("<p>Zie<list><item>een</item></list><emph>nadruk</emph></p>");
        assert_eq!(items.len(), 4);
        assert!(items[0].closed);
        assert_eq!(items[0].text, "Zie <em></em> ");
        assert_eq!(items[3].kind, DataType::Paragraph);
        assert_eq!(items[3].text, "nadruk");
        assert_eq!(items[3].parent_ids, "1");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let mut builder = ItemBuilder::new();
        assert!(matches!(
            builder.parse(b"<p>open</item>"),
            Err(EadError::XmlDecode(_))
        ));
    }

    #[test]
    fn test_data_type_serializes_lowercase() {
        let item = DataItem {
            kind: DataType::TableCel,
            flow: FlowType::LineBreak,
            ..Default::default()
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "tablecel");
        assert_eq!(json["flowType"], "linebreak");
        assert_eq!(json["parentIDS"], "");
    }
}
