//! The scene graph: chunk dispatch and the element arena.
//!
//! A layout body is a flat chunk stream with bracket chunks: a `BGN1`
//! opens a child node belonging to the element written just before it,
//! `END1` closes it. The shared tables (`MAT1`, `TEX1`, `FNT1`) appear
//! inline in the root stream; they are hoisted to the arena so every
//! element resolves against the same table, while marker elements keep
//! their position in the stream so chunk order round-trips.
//!
//! Elements and nodes live in one arena and refer to each other by id,
//! which sidesteps ownership cycles from the child/parent links.

use blotool_common::{BinaryReader, BinaryWriter};

use crate::mat1::Mat1;
use crate::pane::{Pane, Picture, Textbox, Window};
use crate::resources::{ResourceKind, ResourceList};
use crate::{Error, Result};

/// Index of an element in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub(crate) usize);

/// Index of a node (an ordered element list) in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// The chunk tags the scene-graph reader dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkTag {
    Begin,
    End,
    Extra,
    Textures,
    Fonts,
    Materials,
    Pane,
    Window,
    Picture,
    Textbox,
}

impl ChunkTag {
    fn from_bytes(tag: [u8; 4], offset: usize) -> Result<Self> {
        Ok(match &tag {
            b"BGN1" => ChunkTag::Begin,
            b"END1" => ChunkTag::End,
            b"EXT1" => ChunkTag::Extra,
            b"TEX1" => ChunkTag::Textures,
            b"FNT1" => ChunkTag::Fonts,
            b"MAT1" => ChunkTag::Materials,
            b"PAN2" | b"pan2" => ChunkTag::Pane,
            b"WIN2" => ChunkTag::Window,
            b"PIC2" => ChunkTag::Picture,
            b"TBX2" => ChunkTag::Textbox,
            _ => return Err(Error::UnknownChunk { tag, offset }),
        })
    }
}

/// What an element is: a pane-family record, or a marker holding the
/// stream position of one of the arena-level shared tables.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Pane(Pane),
    Window(Window),
    Picture(Picture),
    Textbox(Textbox),
    Materials,
    Textures,
    Fonts,
}

impl ElementKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            ElementKind::Pane(_) => "PAN2",
            ElementKind::Window(_) => "WIN2",
            ElementKind::Picture(_) => "PIC2",
            ElementKind::Textbox(_) => "TBX2",
            ElementKind::Materials => "MAT1",
            ElementKind::Textures => "TEX1",
            ElementKind::Fonts => "FNT1",
        }
    }
}

/// One element in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    /// The node holding this element's children, if any.
    pub child: Option<NodeId>,
    pub parent: Option<ElementId>,
}

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            child: None,
            parent: None,
        }
    }

    /// The embedded base pane, for any pane-family element.
    pub fn base_pane(&self) -> Option<&Pane> {
        match &self.kind {
            ElementKind::Pane(p) => Some(p),
            ElementKind::Window(win) => Some(&win.pane),
            ElementKind::Picture(pic) => Some(&pic.pane),
            ElementKind::Textbox(tbx) => Some(&tbx.pane),
            _ => None,
        }
    }

    pub fn base_pane_mut(&mut self) -> Option<&mut Pane> {
        match &mut self.kind {
            ElementKind::Pane(p) => Some(p),
            ElementKind::Window(win) => Some(&mut win.pane),
            ElementKind::Picture(pic) => Some(&mut pic.pane),
            ElementKind::Textbox(tbx) => Some(&mut tbx.pane),
            _ => None,
        }
    }
}

/// An ordered list of element ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub children: Vec<ElementId>,
}

/// Owner of every node and element, plus the file-wide shared tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    elements: Vec<Element>,
    nodes: Vec<Node>,
    pub materials: Mat1,
    pub textures: ResourceList,
    pub fonts: ResourceList,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            nodes: Vec::new(),
            materials: Mat1::new(),
            textures: ResourceList::new(ResourceKind::Textures),
            fonts: ResourceList::new(ResourceKind::Fonts),
        }
    }

    pub fn alloc_node(&mut self) -> NodeId {
        self.nodes.push(Node::default());
        NodeId(self.nodes.len() - 1)
    }

    /// Append a new element to `node`.
    pub fn push_element(&mut self, node: NodeId, kind: ElementKind) -> ElementId {
        self.elements.push(Element::new(kind));
        let id = ElementId(self.elements.len() - 1);
        self.nodes[node.0].children.push(id);
        id
    }

    /// Attach `child` as the child node of `element`, fixing up the
    /// parent links of the child node's elements.
    pub fn attach_child(&mut self, element: ElementId, child: NodeId) {
        self.elements[element.0].child = Some(child);
        let children = self.nodes[child.0].children.clone();
        for id in children {
            self.elements[id.0].parent = Some(element);
        }
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Parse a chunk stream into a node, stopping at `END1` (consumed)
    /// or `EXT1` (left for the container).
    pub fn parse_node(&mut self, r: &mut BinaryReader<'_>) -> Result<NodeId> {
        let node = self.alloc_node();
        let mut last: Option<ElementId> = None;

        loop {
            let offset = r.position();
            let raw = match r.peek_tag() {
                Ok(tag) => tag,
                Err(_) => {
                    return Err(Error::format(
                        offset,
                        "chunk stream ends without END1/EXT1".to_string(),
                    ))
                }
            };

            match ChunkTag::from_bytes(raw, offset)? {
                ChunkTag::Extra => return Ok(node),
                ChunkTag::End => {
                    r.advance(8);
                    return Ok(node);
                }
                ChunkTag::Begin => {
                    let owner = last.take().ok_or_else(|| {
                        Error::format(offset, "BGN1 without a preceding element".to_string())
                    })?;
                    r.advance(8);
                    let child = self.parse_node(r)?;
                    self.attach_child(owner, child);
                }
                ChunkTag::Materials => {
                    if !self.materials.materials.is_empty()
                        || self.contains_marker(node, &ElementKind::Materials)
                    {
                        return Err(Error::format(offset, "duplicate MAT1 chunk".to_string()));
                    }
                    self.materials = Mat1::parse(r)?;
                    self.push_element(node, ElementKind::Materials);
                }
                ChunkTag::Textures => {
                    if self.contains_marker(node, &ElementKind::Textures) {
                        return Err(Error::format(offset, "duplicate TEX1 chunk".to_string()));
                    }
                    self.textures = ResourceList::parse(r, ResourceKind::Textures)?;
                    self.push_element(node, ElementKind::Textures);
                }
                ChunkTag::Fonts => {
                    if self.contains_marker(node, &ElementKind::Fonts) {
                        return Err(Error::format(offset, "duplicate FNT1 chunk".to_string()));
                    }
                    self.fonts = ResourceList::parse(r, ResourceKind::Fonts)?;
                    self.push_element(node, ElementKind::Fonts);
                }
                ChunkTag::Pane => {
                    let pane = Pane::parse(r)?;
                    last = Some(self.push_element(node, ElementKind::Pane(pane)));
                }
                ChunkTag::Window => {
                    let window = Window::parse(r, &self.materials)?;
                    last = Some(self.push_element(node, ElementKind::Window(window)));
                }
                ChunkTag::Picture => {
                    let picture = Picture::parse(r, &self.materials)?;
                    last = Some(self.push_element(node, ElementKind::Picture(picture)));
                }
                ChunkTag::Textbox => {
                    let textbox = Textbox::parse(r, &self.materials)?;
                    last = Some(self.push_element(node, ElementKind::Textbox(textbox)));
                }
            }
        }
    }

    fn contains_marker(&self, node: NodeId, kind: &ElementKind) -> bool {
        self.nodes[node.0]
            .children
            .iter()
            .any(|id| &self.elements[id.0].kind == kind)
    }

    /// Write a node's chunk stream and return its chunk count. Every
    /// nesting level adds 2 for its `BGN1`/`END1` brackets.
    pub fn write_node(&self, node: NodeId, w: &mut BinaryWriter) -> Result<usize> {
        let mut count = 0;
        for &id in &self.nodes[node.0].children {
            let element = &self.elements[id.0];
            count += 1;
            match &element.kind {
                ElementKind::Pane(pane) => pane.write(w)?,
                ElementKind::Window(window) => window.write(w, &self.materials)?,
                ElementKind::Picture(picture) => picture.write(w, &self.materials)?,
                ElementKind::Textbox(textbox) => textbox.write(w, &self.materials)?,
                ElementKind::Materials => self.materials.write(w)?,
                ElementKind::Textures => self.textures.write(w)?,
                ElementKind::Fonts => self.fonts.write(w)?,
            }
            if let Some(child) = element.child {
                w.write_tag(*b"BGN1");
                w.write_u32(8);
                count += self.write_node(child, w)? + 2;
                w.write_tag(*b"END1");
                w.write_u32(8);
            }
        }
        Ok(count)
    }
}
