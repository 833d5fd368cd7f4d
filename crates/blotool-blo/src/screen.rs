//! The top-level layout container: `SCRNblo2` header, `INF1`, the scene
//! graph, and the `EXT1` terminator.
//!
//! Writing is buffer-first: the whole file is assembled in memory and
//! the header's total size and chunk count are backpatched once the
//! body is known. The chunk count stored in files is informational; it
//! is recomputed on write and never trusted on read.

use std::fs;
use std::path::Path;

use blotool_common::{BinaryReader, BinaryWriter};

use crate::node::{Arena, ElementKind, NodeId};
use crate::{Error, Result};

const MAGIC: &[u8; 8] = b"SCRNblo2";

/// The `INF1` chunk: screen dimensions plus four opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Information {
    pub width: u16,
    pub height: u16,
    pub values: [u8; 4],
}

impl Default for Information {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            values: [0; 4],
        }
    }
}

impl Information {
    pub fn parse(r: &mut BinaryReader<'_>) -> Result<Self> {
        let start = r.position();
        r.expect_magic(b"INF1")?;
        let size = r.read_u32()? as usize;
        if size != 0x20 {
            return Err(Error::unexpected(
                "INF1 size",
                &0x20u32.to_be_bytes(),
                &(size as u32).to_be_bytes(),
            ));
        }
        let width = r.read_u16()?;
        let height = r.read_u16()?;
        let mut values = [0u8; 4];
        values.copy_from_slice(r.read_bytes(4)?);
        r.seek(start + size);
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn write(&self, w: &mut BinaryWriter) {
        w.write_tag(*b"INF1");
        w.write_u32(0x20);
        w.write_u16(self.width);
        w.write_u16(self.height);
        w.write_bytes(&self.values);
        w.pad_to(0x20);
    }
}

/// A complete layout file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenBlo {
    pub info: Information,
    pub arena: Arena,
    pub root: NodeId,
}

impl Default for ScreenBlo {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenBlo {
    /// An empty layout: default screen info and an empty root node.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc_node();
        Self {
            info: Information::default(),
            arena,
            root,
        }
    }

    /// Decode a layout from a byte buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = BinaryReader::new(data);
        r.expect_magic(MAGIC)?;
        let _total_size = r.read_u32()?;
        let _chunk_count = r.read_u32()?;
        r.advance(0x10); // version/reserved block, ignored

        let info = Information::parse(&mut r)?;

        let mut arena = Arena::new();
        let root = arena.parse_node(&mut r)?;

        r.expect_magic(b"EXT1")?;
        let ext_size = r.read_u32()?;
        if ext_size != 8 {
            return Err(Error::unexpected(
                "EXT1 size",
                &8u32.to_be_bytes(),
                &ext_size.to_be_bytes(),
            ));
        }

        Ok(Self { info, arena, root })
    }

    /// Encode the layout into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = BinaryWriter::new();
        w.write_bytes(MAGIC);
        w.write_u32(0); // total size, patched below
        w.write_u32(0); // chunk count, patched below
        w.write_bytes(b"SVR1");
        w.write_bytes(&[0xFF; 12]);

        self.info.write(&mut w);
        let count = self.arena.write_node(self.root, &mut w)?;
        w.write_tag(*b"EXT1");
        w.write_u32(8);
        w.pad_to(0x20);

        let total = w.position();
        w.patch_u32(8, total as u32);
        // INF1 and EXT1 count too.
        w.patch_u32(12, (count + 2) as u32);
        Ok(w.into_bytes())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path).map_err(blotool_common::Error::from)?;
        Self::parse(&data)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(blotool_common::Error::from)?;
        Ok(())
    }

    /// Pane names of every element referencing `material`. Used as a
    /// delete-safety check before removing a material.
    pub fn elements_using_material(&self, material: &str) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_material_users(self.root, material, &mut found);
        found
    }

    fn collect_material_users(&self, node: NodeId, material: &str, found: &mut Vec<String>) {
        for &id in &self.arena.node(node).children {
            let element = self.arena.element(id);
            let uses = match &element.kind {
                ElementKind::Window(win) => {
                    win.material == material
                        || win.corners.iter().any(|c| c.material == material)
                }
                ElementKind::Picture(pic) => pic.material == material,
                ElementKind::Textbox(tbx) => tbx.material == material,
                _ => false,
            };
            if uses {
                if let Some(pane) = element.base_pane() {
                    found.push(pane.name.clone());
                }
            }
            if let Some(child) = element.child {
                self.collect_material_users(child, material, found);
            }
        }
    }

    /// An indented tag/name dump of the element tree.
    pub fn hierarchy(&self) -> String {
        let mut out = format!("INF1 - {} {}\n", self.info.width, self.info.height);
        self.dump_node(self.root, 1, &mut out);
        out
    }

    fn dump_node(&self, node: NodeId, depth: usize, out: &mut String) {
        for &id in &self.arena.node(node).children {
            let element = self.arena.element(id);
            out.push_str(&"    ".repeat(depth));
            out.push_str(element.kind.tag_name());
            if let Some(pane) = element.base_pane() {
                out.push(' ');
                out.push_str(pane.name.trim_end());
            }
            out.push('\n');
            if let Some(child) = element.child {
                self.dump_node(child, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat1::{Color, Material};
    use crate::pane::{Gradient, Pane, Picture};

    fn named_pane(name: &str) -> Pane {
        Pane {
            name: format!("{name:<8}"),
            ..Pane::new()
        }
    }

    /// A 640x480 screen with a root pane holding one child pane, plus
    /// empty MAT1/TEX1 tables, the way minimal real files look.
    fn sample_screen() -> ScreenBlo {
        let mut screen = ScreenBlo::new();
        screen.arena.push_element(screen.root, ElementKind::Textures);
        screen.arena.push_element(screen.root, ElementKind::Materials);
        let root_pane = screen
            .arena
            .push_element(screen.root, ElementKind::Pane(named_pane("root____")));
        let inner = screen.arena.alloc_node();
        screen
            .arena
            .push_element(inner, ElementKind::Pane(named_pane("child___")));
        screen.arena.attach_child(root_pane, inner);
        screen
    }

    #[test]
    fn test_information_round_trip() {
        let info = Information {
            width: 608,
            height: 448,
            values: [1, 2, 3, 4],
        };
        let mut w = BinaryWriter::new();
        info.write(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 0x20);
        let parsed = Information::parse(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(parsed, info);
    }

    #[test]
    fn test_screen_round_trip() {
        let screen = sample_screen();
        let bytes = screen.to_bytes().unwrap();

        assert_eq!(&bytes[..8], b"SCRNblo2");
        assert_eq!(bytes.len() % 0x20, 0);
        let total = u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize;
        assert_eq!(total, bytes.len());
        // TEX1 + MAT1 + 2 panes + brackets + INF1 + EXT1.
        let count = u32::from_be_bytes(bytes[12..16].try_into().unwrap());
        assert_eq!(count, 8);

        let parsed = ScreenBlo::parse(&bytes).unwrap();
        assert_eq!(parsed.info.width, 640);
        assert_eq!(parsed.info, screen.info);

        // Both pane names and the parent link survive.
        let root_children = &parsed.arena.node(parsed.root).children;
        let root_pane_id = root_children[2];
        let root_pane = parsed.arena.element(root_pane_id);
        assert_eq!(root_pane.base_pane().unwrap().name, "root____");
        let inner = root_pane.child.expect("root pane has a child node");
        let child = parsed.arena.element(parsed.arena.node(inner).children[0]);
        assert_eq!(child.base_pane().unwrap().name, "child___");
        assert_eq!(child.parent, Some(root_pane_id));

        assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let screen = sample_screen();
        let mut bytes = screen.to_bytes().unwrap();
        bytes[7] = b'1';
        assert!(ScreenBlo::parse(&bytes).is_err());
    }

    #[test]
    fn test_stored_chunk_count_not_trusted() {
        let screen = sample_screen();
        let mut bytes = screen.to_bytes().unwrap();
        bytes[12..16].copy_from_slice(&0xDEADBEEFu32.to_be_bytes());
        let parsed = ScreenBlo::parse(&bytes).unwrap();
        // Re-encoding restores the real count.
        let rewritten = parsed.to_bytes().unwrap();
        assert_eq!(u32::from_be_bytes(rewritten[12..16].try_into().unwrap()), 8);
    }

    #[test]
    fn test_elements_using_material() {
        let mut screen = sample_screen();
        screen.arena.materials.materials.push(Material {
            name: "shared".to_string(),
            ..Material::default()
        });
        let picture = Picture {
            pane: named_pane("pic_elem"),
            content_size: 0,
            unk_index: 0,
            material: "shared".into(),
            color1: Gradient::default(),
            color2: Gradient::default(),
        };
        screen
            .arena
            .push_element(screen.root, ElementKind::Picture(picture));

        assert_eq!(screen.elements_using_material("shared"), vec!["pic_elem"]);
        assert!(screen.elements_using_material("unused").is_empty());
    }

    #[test]
    fn test_hierarchy_dump() {
        let screen = sample_screen();
        let dump = screen.hierarchy();
        assert!(dump.starts_with("INF1 - 640 480\n"));
        assert!(dump.contains("    PAN2 root____\n"));
        assert!(dump.contains("        PAN2 child___\n"));
    }

    #[test]
    fn test_textbox_colors_survive_full_file_round_trip() {
        let mut screen = sample_screen();
        screen.arena.materials.materials.push(Material {
            name: "font_mat".to_string(),
            ..Material::default()
        });
        let textbox = crate::pane::Textbox {
            pane: named_pane("label"),
            content_size: 0,
            unk1: 0,
            material: "font_mat".into(),
            signed_unk3: 0,
            signed_unk4: 0,
            unk5: 0,
            unk6: 0,
            unk7: 0,
            unk8: 0,
            color_top: Color::new(10, 20, 30, 40),
            color_bottom: Color::new(50, 60, 70, 80),
            unk11: 0,
            text_cutoff: 4,
            text: "OK".to_string(),
        };
        screen
            .arena
            .push_element(screen.root, ElementKind::Textbox(textbox.clone()));

        let bytes = screen.to_bytes().unwrap();
        let parsed = ScreenBlo::parse(&bytes).unwrap();
        let found = parsed
            .arena
            .node(parsed.root)
            .children
            .iter()
            .find_map(|&id| match &parsed.arena.element(id).kind {
                ElementKind::Textbox(t) => Some(t.clone()),
                _ => None,
            })
            .expect("textbox survives");
        assert_eq!(found, textbox);
    }
}
