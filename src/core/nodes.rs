use crate::core::context::{ErrorRecord, NodeConfig};
use crate::core::html;
use crate::core::model::{sanitize_xml, Cc, Component, Did, Dsc, RawElement, UnitDate, UnitId};
use crate::error::{EadError, Result};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;

/// unitid types that carry the legacy inventory number.
const INVENTORY_TYPES: &[&str] = &["ABS", "series_code", ""];

pub const PATH_SEPARATOR: &str = "~";

/// Capability shared by the numbered `c01`..`c20` levels and the nesting `c` element.
pub trait CLevel {
    type Nested: CLevel;

    fn component(&self) -> &Component;

    fn nested(&self) -> &[Self::Nested];

    fn did(&self) -> Option<&Did> {
        self.component().did.as_ref()
    }

    fn scope_content(&self) -> Vec<&RawElement> {
        self.component().content("scopecontent").collect()
    }

    /// Tag, level and otherlevel of the element.
    fn attrs(&self) -> (&str, &str, &str) {
        let c = self.component();
        (c.tag.as_str(), c.level.as_str(), c.other_level.as_str())
    }
}

impl CLevel for Cc {
    type Nested = Cc;

    fn component(&self) -> &Component {
        &self.component
    }

    fn nested(&self) -> &[Cc] {
        &self.nested
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One archival unit at one level of the arrangement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    pub depth: u32,
    pub order: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub level: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sub_level: String,
    pub header: Header,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(rename = "parentIDs")]
    pub parent_ids: Vec<String>,
    /// Unique identity of the node within its dataset.
    pub path: String,
    #[serde(rename = "branchID", skip_serializing_if = "String::is_empty")]
    pub branch_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip)]
    pub(crate) parent_paths: Vec<String>,
    #[serde(skip)]
    pub(crate) component: Component,
}

/// What a node inherits from the levels above it, root first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ancestors {
    /// Inventory numbers, empty for levels without one.
    pub ids: Vec<String>,
    /// Unique node paths.
    pub paths: Vec<String>,
}

impl Ancestors {
    fn with(&self, node: &Node) -> Ancestors {
        let mut next = self.clone();
        next.ids.push(node.header.inventory_number.clone());
        next.paths.push(node.path.clone());
        next
    }
}

/// The nodes of a `dsc` together with its type and head labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeList {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<String>,
    pub nodes: Vec<Node>,
}

/// Summary of the `did` of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub date_as_label: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub date: Vec<NodeDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id: Vec<NodeID>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub inventory_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physdesc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeID {
    pub id: String,
    #[serde(rename = "typeID", skip_serializing_if = "String::is_empty")]
    pub type_id: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub audience: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDate {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub calendar: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub era: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub normal: String,
    pub label: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl From<&UnitDate> for NodeDate {
    fn from(date: &UnitDate) -> Self {
        NodeDate {
            calendar: date.calendar.clone(),
            era: date.era.clone(),
            normal: date.normal.clone(),
            label: date.text.clone(),
            kind: date.kind.clone(),
        }
    }
}

impl From<&UnitId> for NodeID {
    fn from(id: &UnitId) -> Self {
        NodeID {
            id: id.id.clone(),
            type_id: id.identifier.clone(),
            kind: id.kind.clone(),
            audience: id.audience.clone(),
        }
    }
}

impl NodeDate {
    /// Checks that a `from/to` normal range is not reversed.
    pub fn valid_date_normal(&self) -> Result<()> {
        if !self.normal.contains('/') {
            return Ok(());
        }
        let normal = self.normal.trim_start_matches('/').trim_end_matches('/');
        let parts: Vec<&str> = normal.split('/').collect();
        if let [first, second] = parts.as_slice() {
            if first > second {
                return Err(EadError::InvalidDateRange {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Header {
    /// Builds the header from a `did` block.
    pub fn from_did(did: &Did) -> Self {
        let mut header = Header::default();

        for title in &did.unittitles {
            if title.dates.is_empty() {
                header.label.push(title.title());
                continue;
            }
            header.date_as_label = true;
            header.date.extend(title.dates.iter().map(NodeDate::from));
        }

        header.date.extend(did.unitdates.iter().map(NodeDate::from));

        for unitid in &did.unitids {
            if header.inventory_number.is_empty() && INVENTORY_TYPES.contains(&unitid.kind.as_str()) {
                header.inventory_number = unitid.id.clone();
            }
            header.id.push(NodeID::from(unitid));
        }

        header.physdesc = did
            .physdescs
            .first()
            .map(|p| sanitize_xml(&p.raw))
            .filter(|p| !p.is_empty());

        header
    }

    /// Reduces the header to what a lightweight tree needs.
    pub fn sparse(&mut self) {
        if self.date_as_label {
            self.date_as_label = false;
            for date in &self.date {
                self.label.push(date.label.clone());
            }
        }
        self.date.clear();
        self.id.clear();
        self.physdesc = None;
    }

    /// Human readable periods of the unit.
    pub fn periods(&self) -> Vec<String> {
        self.date.iter().map(|d| d.label.clone()).collect()
    }

    /// Label shown in the tree.
    pub fn tree_label(&self) -> String {
        self.label.join("; ")
    }
}

impl Node {
    /// Local part of the path: the inventory number, or the order when there is none.
    pub fn path_id(&self) -> String {
        let inventory = &self.header.inventory_number;
        if inventory.is_empty() || inventory.starts_with("---") {
            return self.order.to_string();
        }
        inventory.clone()
    }

    pub fn subject(&self, cfg: &NodeConfig) -> String {
        cfg.subject(&self.path)
    }

    /// Paths of the enclosing nodes, root first.
    pub fn parent_paths(&self) -> &[String] {
        &self.parent_paths
    }

    /// Places the node under its branch and registers it, renaming a path that is already taken.
    fn update_path(&mut self, ancestors: &Ancestors, cfg: &mut NodeConfig) {
        let path = match ancestors.paths.last() {
            Some(branch) => {
                self.branch_id = branch.clone();
                format!("{}{}{}", branch, PATH_SEPARATOR, self.path_id())
            }
            None => self.path_id(),
        };
        self.path = cfg.register_path(path, self.order, self.header.tree_label());
    }

    /// This node and all its descendants in pre-order.
    pub fn flatten(&self) -> Vec<&Node> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.flatten());
        }
        nodes
    }

    fn error_record(&self, cfg: &NodeConfig, err: &EadError) -> ErrorRecord {
        ErrorRecord {
            path: self.path.clone(),
            spec: cfg.spec.clone(),
            order: self.order,
            key: self.header.inventory_number.clone(),
            label: self.header.tree_label(),
            c_type: self.level.clone(),
            depth: self.depth,
            error: err.to_string(),
            ..Default::default()
        }
    }
}

impl NodeList {
    /// Every node of the list in pre-order.
    pub fn flatten(&self) -> Vec<&Node> {
        self.nodes.iter().flat_map(|n| n.flatten()).collect()
    }
}

fn scope_content_html<L: CLevel>(level: &L) -> Option<String> {
    let scope = level.scope_content();
    if scope.is_empty() {
        return None;
    }
    let raw: String = scope.iter().map(|s| s.raw.as_str()).collect();
    match html::render(&raw) {
        Ok(html) if !html.is_empty() => Some(html),
        Ok(_) => None,
        Err(err) => {
            warn!("unable to render scopecontent of <{}>: {}", level.component().tag, err);
            None
        }
    }
}

/// Converts one c-level and its nested levels into a Node.
pub fn build_node<L: CLevel>(level: &L, ancestors: &Ancestors, cfg: &mut NodeConfig) -> Node {
    let order = cfg.counter.increment();
    let (tag, kind, sub_kind) = level.attrs();

    let mut node = Node {
        tag: tag.to_string(),
        depth: ancestors.ids.len() as u32 + 1,
        order,
        level: kind.to_string(),
        sub_level: sub_kind.to_string(),
        parent_ids: ancestors.ids.clone(),
        parent_paths: ancestors.paths.clone(),
        component: level.component().clone(),
        ..Default::default()
    };

    if let Some(did) = level.did() {
        node.header = Header::from_did(did);
    }

    if cfg.sparse {
        node.header.sparse();
        node.tag.clear();
    } else {
        node.html = scope_content_html(level);
    }

    node.update_path(ancestors, cfg);

    if level.did().is_none() {
        let err = EadError::MissingRequiredElement {
            parent: level.component().tag.clone(),
            element: "did".to_string(),
        };
        warn!("{} (order {}, spec {})", err, order, cfg.spec);
        let record = node.error_record(cfg, &err);
        cfg.record(record);
    }

    for date in &node.header.date {
        if let Err(err) = date.valid_date_normal() {
            warn!("invalid unitdate at order {}: {}", order, err);
            let mut record = node.error_record(cfg, &err);
            record.dup_label = date.normal.clone();
            cfg.record(record);
        }
    }

    node.children = build_siblings(level.nested(), &ancestors.with(&node), cfg);

    node
}

/// Tracks inventory numbers among siblings to report duplicates.
#[derive(Default)]
struct Siblings {
    seen: HashMap<String, (u64, String)>,
}

impl Siblings {
    fn check(&mut self, node: &Node, cfg: &mut NodeConfig) {
        let key = &node.header.inventory_number;
        if key.is_empty() {
            return;
        }

        match self.seen.get(key) {
            Some((first_order, first_label)) => {
                let err = EadError::DuplicateInventoryNumber {
                    key: key.clone(),
                    first_order: *first_order,
                };
                warn!("{} in spec {}", err, cfg.spec);
                let mut record = node.error_record(cfg, &err);
                record.dup_key = key.clone();
                record.dup_label = first_label.clone();
                cfg.record(record);
            }
            None => {
                self.seen
                    .insert(key.clone(), (node.order, node.header.tree_label()));
            }
        }
    }
}

fn build_siblings<L: CLevel>(levels: &[L], ancestors: &Ancestors, cfg: &mut NodeConfig) -> Vec<Node> {
    let mut siblings = Siblings::default();
    let mut nodes = Vec::with_capacity(levels.len());
    for level in levels {
        let node = build_node(level, ancestors, cfg);
        siblings.check(&node, cfg);
        nodes.push(node);
    }
    nodes
}

/// Converts the `dsc` into a NodeList: loose paragraphs first, then `c01` and `c` levels.
pub fn build_node_list(dsc: Option<&Dsc>, cfg: &mut NodeConfig) -> Result<NodeList> {
    let dsc = match dsc {
        Some(dsc) => dsc,
        None => return Ok(NodeList::default()),
    };

    let mut list = NodeList {
        kind: dsc.kind.clone(),
        label: dsc.heads.clone(),
        nodes: Vec::new(),
    };
    let mut siblings = Siblings::default();

    for paragraph in &dsc.paragraphs {
        let cc = paragraph.to_clevel()?;
        let node = build_node(&cc, &Ancestors::default(), cfg);
        siblings.check(&node, cfg);
        list.nodes.push(node);
    }

    for c01 in &dsc.numbered {
        let node = build_node(c01, &Ancestors::default(), cfg);
        siblings.check(&node, cfg);
        list.nodes.push(node);
    }

    for cc in &dsc.components {
        let node = build_node(cc, &Ancestors::default(), cfg);
        siblings.check(&node, cfg);
        list.nodes.push(node);
    }

    debug!(
        "built {} top level nodes ({} in total) for {}",
        list.nodes.len(),
        cfg.counter.count(),
        cfg.spec
    );
    Ok(list)
}
