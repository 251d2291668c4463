use crate::adapters::html::{is_void_element, HtmlToken, HtmlTokenizer};
use crate::domain::model::ScriptElement;
use crate::domain::ports::{Document, NodeId, ScriptSlot};
use serde::{Deserialize, Serialize};

/// Names the host page uses for the elements the engine cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellOptions {
    pub mount_point_id: String,
    pub link_attribute: String,
    pub dynamic_css_attribute: String,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            mount_point_id: "main-content".to_string(),
            link_attribute: "data-link".to_string(),
            dynamic_css_attribute: "data-dynamic-css".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptState {
    /// Inserted through markup assignment; never runs on its own.
    Inert,
    /// Already executed (parsed with the page, or substituted by the engine).
    Started,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    script_state: Option<ScriptState>,
}

impl Element {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    nodes: Vec<Node>,
    root: NodeId,
    mount: Option<NodeId>,
    options: ShellOptions,
    title: String,
    loading: bool,
    scroll: (i64, i64),
}

impl HeadlessDocument {
    /// Parses a full shell page. Scripts of the shell count as already run.
    pub fn parse(html: &str, options: ShellOptions) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            mount: None,
            options,
            title: String::new(),
            loading: false,
            scroll: (0, 0),
        };

        let root = doc.root;
        doc.build(root, html, ScriptState::Started);
        doc.mount = doc.element_by_id(&doc.options.mount_point_id);
        doc.title = doc
            .first_element(root, "title")
            .map(|title| doc.text_content(title))
            .unwrap_or_default();
        doc
    }

    pub fn options(&self) -> &ShellOptions {
        &self.options
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn mount_point(&self) -> Option<NodeId> {
        self.mount
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.set_attribute(name, value);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: Vec<(String, String)>,
    ) -> NodeId {
        self.push_node(
            Some(parent),
            NodeKind::Element(Element {
                tag: tag.to_ascii_lowercase(),
                attributes,
                script_state: None,
            }),
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_node(Some(parent), NodeKind::Text(text.to_string()))
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    fn build(&mut self, container: NodeId, html: &str, script_state: ScriptState) {
        let mut open: Vec<NodeId> = vec![container];

        for token in HtmlTokenizer::new(html) {
            let current = *open.last().unwrap_or(&container);
            match token {
                HtmlToken::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let id = self.create_element(current, &name, attributes);
                    if name == "script" {
                        if let Some(element) = self.element_mut(id) {
                            element.script_state = Some(script_state);
                        }
                    }
                    if !self_closing && !is_void_element(&name) {
                        open.push(id);
                    }
                }
                HtmlToken::EndTag { name } => {
                    // Index 0 is the container itself and is never closed here.
                    if let Some(pos) = open
                        .iter()
                        .skip(1)
                        .rposition(|id| self.tag_name(*id) == Some(name.as_str()))
                    {
                        open.truncate(pos + 1);
                    }
                }
                HtmlToken::Text(text) => {
                    self.append_text(current, &text);
                }
                HtmlToken::Comment(text) => {
                    self.push_node(Some(current), NodeKind::Comment(text));
                }
                HtmlToken::Doctype(_) => {}
            }
        }
    }

    /// Replaces the children of `id` with parsed `html`, like assigning
    /// `innerHTML`: scripts inside stay inert.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        self.clear_children(id);
        self.build(id, html, ScriptState::Inert);
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.serialize(*child, &mut out);
        }
        out
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Document => {
                for child in self.children(id) {
                    self.serialize(*child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void_element(&element.tag) {
                    return;
                }
                for child in self.children(id) {
                    self.serialize(*child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match &self.node(node).kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.tag_name(*node) == Some(tag))
            .collect()
    }

    fn first_element(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.tag_name(*node) == Some(tag))
    }

    fn head(&self) -> NodeId {
        self.first_element(self.root, "head").unwrap_or(self.root)
    }

    fn dynamic_links(&self) -> Vec<NodeId> {
        let marker = &self.options.dynamic_css_attribute;
        self.elements_by_tag(self.root, "link")
            .into_iter()
            .filter(|node| self.attribute(*node, marker).is_some())
            .collect()
    }

    /// Stylesheets authored into the shell, i.e. not injected by the engine.
    pub fn stylesheet_hrefs(&self) -> Vec<String> {
        let marker = &self.options.dynamic_css_attribute;
        self.elements_by_tag(self.root, "link")
            .into_iter()
            .filter(|node| {
                self.attribute(*node, "rel") == Some("stylesheet")
                    && self.attribute(*node, marker).is_none()
            })
            .filter_map(|node| self.attribute(node, "href").map(str::to_string))
            .collect()
    }

    /// Scripts under `scope` that have run, in document order.
    pub fn started_scripts(&self, scope: NodeId) -> Vec<NodeId> {
        self.elements_by_tag(scope, "script")
            .into_iter()
            .filter(|node| {
                self.element(*node).and_then(|e| e.script_state) == Some(ScriptState::Started)
            })
            .collect()
    }

    /// The whole document serialized, mostly useful for debugging.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root)
    }
}

impl Document for HeadlessDocument {
    fn has_mount_point(&self) -> bool {
        self.mount.is_some()
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if let Some(mount) = self.mount {
            let opacity = if loading { "opacity: 0.5" } else { "opacity: 1" };
            self.set_attribute(mount, "style", opacity);
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        let head = self.head();
        let title_node = match self.first_element(head, "title") {
            Some(node) => node,
            None => self.create_element(head, "title", Vec::new()),
        };
        self.clear_children(title_node);
        self.append_text(title_node, title);
    }

    fn dynamic_stylesheets(&self) -> Vec<String> {
        self.dynamic_links()
            .into_iter()
            .filter_map(|node| self.attribute(node, "href").map(str::to_string))
            .collect()
    }

    fn remove_dynamic_stylesheets(&mut self) -> usize {
        let links = self.dynamic_links();
        for link in &links {
            self.detach(*link);
        }
        links.len()
    }

    fn append_dynamic_stylesheet(&mut self, href: &str) {
        let head = self.head();
        let marker = self.options.dynamic_css_attribute.clone();
        self.create_element(
            head,
            "link",
            vec![
                ("rel".to_string(), "stylesheet".to_string()),
                ("href".to_string(), href.to_string()),
                (marker, "true".to_string()),
            ],
        );
    }

    fn replace_content(&mut self, html: &str) {
        if let Some(mount) = self.mount {
            self.set_inner_html(mount, html);
        }
    }

    fn content_html(&self) -> String {
        self.mount
            .map(|mount| self.inner_html(mount))
            .unwrap_or_default()
    }

    fn inert_scripts(&self) -> Vec<ScriptSlot> {
        let Some(mount) = self.mount else {
            return Vec::new();
        };

        self.elements_by_tag(mount, "script")
            .into_iter()
            .filter_map(|node| {
                let element = self.element(node)?;
                if element.script_state != Some(ScriptState::Inert) {
                    return None;
                }
                Some(ScriptSlot {
                    node,
                    script: ScriptElement {
                        attributes: element.attributes.clone(),
                        text: self.text_content(node),
                    },
                })
            })
            .collect()
    }

    fn substitute_script(&mut self, slot: NodeId, script: &ScriptElement) -> NodeId {
        let Some(parent) = self.parent(slot) else {
            return slot;
        };

        let fresh = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind: NodeKind::Element(Element {
                tag: "script".to_string(),
                attributes: script.attributes.clone(),
                script_state: Some(ScriptState::Started),
            }),
        });
        if !script.text.is_empty() {
            self.append_text(fresh, &script.text);
        }

        if let Some(position) = self.nodes[parent.0].children.iter().position(|c| *c == slot) {
            self.nodes[parent.0].children[position] = fresh;
        }
        self.nodes[slot.0].parent = None;
        fresh
    }

    fn navigable_target(&self, node: NodeId) -> Option<Option<String>> {
        let marker = &self.options.link_attribute;
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(element) = self.element(current) {
                if element.attribute(marker).is_some() {
                    return Some(element.attribute("href").map(str::to_string));
                }
            }
            cursor = self.parent(current);
        }
        None
    }

    fn scroll_position(&self) -> (i64, i64) {
        self.scroll
    }

    fn scroll_to(&mut self, x: i64, y: i64) {
        self.scroll = (x, y);
    }
}
