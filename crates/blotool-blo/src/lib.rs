//! BLO layout codec for GameCube-era console UI screens.
//!
//! BLO files describe 2D UI screens: a hierarchy of panes (plain boxes,
//! bordered windows, textured pictures, textboxes) plus one shared
//! material table and texture/font reference lists. This crate can read,
//! modify, and write BLO files, and mirrors them to an editable JSON
//! document.
//!
//! # File Format
//!
//! Everything is big-endian. A file is a sequence of tagged chunks:
//! - 8 bytes: Magic (`SCRNblo2`)
//! - 4 bytes: Total file size (backpatched on write)
//! - 4 bytes: Chunk count (informational, recomputed on write)
//! - 16 bytes: Reserved
//! - `INF1`: screen dimensions (fixed 0x20 bytes)
//! - The scene graph: pane chunks, with `BGN1`/`END1` brackets nesting
//!   a child node under the preceding element, and the shared `MAT1`/
//!   `TEX1`/`FNT1` tables inline in the root stream
//! - `EXT1`: terminator (8 bytes), padded to 0x20
//!
//! Padding regions carry a repeating ASCII filler phrase rather than
//! zeros; the writer reproduces it for byte compatibility.
//!
//! # Example
//!
//! ```no_run
//! use blotool_blo::ScreenBlo;
//!
//! // Read a layout file
//! let screen = ScreenBlo::from_file("title.blo")?;
//! print!("{}", screen.hierarchy());
//!
//! // Check which elements use a material before deleting it
//! let users = screen.elements_using_material("mat_cursor");
//! println!("in use by {users:?}");
//!
//! // Mirror to JSON and back
//! let doc = blotool_blo::json::to_json(&screen);
//! let restored = blotool_blo::json::from_json(&doc)?;
//!
//! // Write back (possibly modified)
//! restored.write_to_file("title_out.blo")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub mod json;
pub mod mat1;
mod node;
mod pane;
mod resources;
mod screen;
mod string_table;

pub use error::{Error, Result};
pub use screen::{Information, ScreenBlo};

// Re-export commonly used types at crate root
pub use mat1::{Mat1, Material};
pub use node::{Arena, Element, ElementId, ElementKind, Node, NodeId};
pub use pane::{Anchor, Gradient, Pane, Picture, Textbox, Window, WindowCorner};
pub use resources::{ResourceKind, ResourceList};
pub use string_table::StringTable;
