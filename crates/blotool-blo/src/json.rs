//! The JSON mirror of a layout file.
//!
//! Documents are `[info_object, root_node_list]`. Every chunk becomes an
//! object carrying a `"type"` discriminator; a pane's child node follows
//! it as a bare list sibling, mirroring the `BGN1`/`END1` brackets of
//! the binary form. Key names match the established tooling around this
//! format so documents stay interchangeable with it.
//!
//! Materials hold texture *names* in JSON (resolved through the TEX1
//! list) and indices in memory. A texture index outside the list stays
//! numeric when serializing; an unregistered name is appended to the
//! list when deserializing.

use serde_json::{json, Map, Value};

use crate::mat1::{
    AlphaCompare, Blend, Blob, ChannelControl, Color, CullMode, FontNumber, IndirectInitData,
    Mat1, Material, TevColor, TevKColor, TevOrder, TevStage, TevSwapMode, TevSwapModeTable,
    TexCoordInfo, TexMatrix,
};
use crate::node::{Arena, ElementKind, NodeId};
use crate::pane::{Anchor, Gradient, Pane, Picture, Textbox, Window, WindowCorner};
use crate::resources::{ResourceKind, ResourceList};
use crate::screen::{Information, ScreenBlo};
use crate::{Error, Result};

/// Serialize a whole layout.
pub fn to_json(screen: &ScreenBlo) -> Value {
    Value::Array(vec![
        info_to_json(&screen.info),
        node_to_json(&screen.arena, screen.root),
    ])
}

/// Deserialize a whole layout.
pub fn from_json(value: &Value) -> Result<ScreenBlo> {
    let parts = value
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| Error::json("document must be [info, node_list]".to_string()))?;
    let info = info_from_json(&parts[0])?;
    let mut arena = Arena::new();
    let root = node_from_json(&mut arena, &parts[1])?;
    Ok(ScreenBlo { info, arena, root })
}

fn obj(value: &Value) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::json(format!("expected an object, got {value}")))
}

fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| Error::json(format!("missing field {key:?}")))
}

fn field_u64(map: &Map<String, Value>, key: &str) -> Result<u64> {
    field(map, key)?
        .as_u64()
        .ok_or_else(|| Error::json(format!("field {key:?} is not an unsigned integer")))
}

fn field_i64(map: &Map<String, Value>, key: &str) -> Result<i64> {
    field(map, key)?
        .as_i64()
        .ok_or_else(|| Error::json(format!("field {key:?} is not an integer")))
}

fn field_u8(map: &Map<String, Value>, key: &str) -> Result<u8> {
    u8::try_from(field_u64(map, key)?)
        .map_err(|_| Error::json(format!("field {key:?} out of u8 range")))
}

fn field_u16(map: &Map<String, Value>, key: &str) -> Result<u16> {
    u16::try_from(field_u64(map, key)?)
        .map_err(|_| Error::json(format!("field {key:?} out of u16 range")))
}

fn field_u32(map: &Map<String, Value>, key: &str) -> Result<u32> {
    u32::try_from(field_u64(map, key)?)
        .map_err(|_| Error::json(format!("field {key:?} out of u32 range")))
}

fn field_i8(map: &Map<String, Value>, key: &str) -> Result<i8> {
    i8::try_from(field_i64(map, key)?)
        .map_err(|_| Error::json(format!("field {key:?} out of i8 range")))
}

fn field_i16(map: &Map<String, Value>, key: &str) -> Result<i16> {
    i16::try_from(field_i64(map, key)?)
        .map_err(|_| Error::json(format!("field {key:?} out of i16 range")))
}

fn field_f32(map: &Map<String, Value>, key: &str) -> Result<f32> {
    field(map, key)?
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| Error::json(format!("field {key:?} is not a number")))
}

fn field_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    field(map, key)?
        .as_str()
        .ok_or_else(|| Error::json(format!("field {key:?} is not a string")))
}

fn field_array<'a>(map: &'a Map<String, Value>, key: &str, len: usize) -> Result<&'a [Value]> {
    let arr = field(map, key)?
        .as_array()
        .ok_or_else(|| Error::json(format!("field {key:?} is not an array")))?;
    if arr.len() != len {
        return Err(Error::json(format!(
            "field {key:?} must have {len} entries, got {}",
            arr.len()
        )));
    }
    Ok(arr)
}

fn type_of(map: &Map<String, Value>) -> Result<&str> {
    field_str(map, "type")
}

// --- INF1 ---

fn info_to_json(info: &Information) -> Value {
    json!({
        "type": "INF1",
        "width": info.width,
        "height": info.height,
        "values": info.values,
    })
}

fn info_from_json(value: &Value) -> Result<Information> {
    let map = obj(value)?;
    if type_of(map)? != "INF1" {
        return Err(Error::json("first document entry must be INF1".to_string()));
    }
    let raw = field_array(map, "values", 4)?;
    let mut values = [0u8; 4];
    for (slot, item) in values.iter_mut().zip(raw) {
        *slot = item
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| Error::json("INF1 values must be bytes".to_string()))?;
    }
    Ok(Information {
        width: field_u16(map, "width")?,
        height: field_u16(map, "height")?,
        values,
    })
}

// --- Pane family ---

/// The shared `p_*` key set every pane-family object carries.
fn pane_fields(pane: &Pane, map: &mut Map<String, Value>) {
    map.insert("p_type".into(), String::from_utf8_lossy(&pane.tag).into());
    map.insert("p_unk1".into(), pane.unk1.into());
    map.insert("p_enabled".into(), pane.enabled.into());
    map.insert("p_anchor".into(), pane.anchor.raw().into());
    map.insert("p_panename".into(), pane.name.clone().into());
    map.insert("p_secondaryname".into(), pane.secondary_name.clone().into());
    map.insert("p_size_x".into(), pane.size_x.into());
    map.insert("p_size_y".into(), pane.size_y.into());
    map.insert("p_scale_x".into(), pane.scale_x.into());
    map.insert("p_scale_y".into(), pane.scale_y.into());
    map.insert("p_rotation".into(), pane.rotation.into());
    map.insert("p_offset_x".into(), pane.offset_x.into());
    map.insert("p_offset_y".into(), pane.offset_y.into());
    map.insert("p_unk4".into(), pane.unk4.into());
}

fn pane_from_fields(map: &Map<String, Value>) -> Result<Pane> {
    let tag = match field_str(map, "p_type")? {
        "PAN2" => *b"PAN2",
        "pan2" => *b"pan2",
        other => return Err(Error::json(format!("unknown pane tag {other:?}"))),
    };
    Ok(Pane {
        tag,
        unk1: field_u16(map, "p_unk1")?,
        enabled: field_u8(map, "p_enabled")?,
        anchor: Anchor::from_raw(field_u8(map, "p_anchor")?)?,
        name: field_str(map, "p_panename")?.to_string(),
        secondary_name: field_str(map, "p_secondaryname")?.to_string(),
        size_x: field_f32(map, "p_size_x")?,
        size_y: field_f32(map, "p_size_y")?,
        scale_x: field_f32(map, "p_scale_x")?,
        scale_y: field_f32(map, "p_scale_y")?,
        rotation: field_f32(map, "p_rotation")?,
        offset_x: field_f32(map, "p_offset_x")?,
        offset_y: field_f32(map, "p_offset_y")?,
        unk4: field_f32(map, "p_unk4")?,
    })
}

fn pane_to_json(pane: &Pane) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), "PAN2".into());
    pane_fields(pane, &mut map);
    Value::Object(map)
}

fn window_to_json(window: &Window) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), "WIN2".into());
    pane_fields(&window.pane, &mut map);
    map.insert("size".into(), window.content_size.into());
    map.insert("padding".into(), hex::encode(window.padding).into());
    let subdata: Vec<Value> = window
        .corners
        .iter()
        .map(|c| {
            json!({
                "material": c.material,
                "sub_unk2": c.unk2,
                "sub_unk3": c.unk3,
            })
        })
        .collect();
    map.insert("subdata".into(), subdata.into());
    map.insert("unkbyte1".into(), window.unkbyte1.into());
    map.insert("unkbyte2".into(), window.unkbyte2.into());
    map.insert("unk3".into(), window.unk3.into());
    map.insert("unk4".into(), window.unk4.into());
    map.insert("unk5".into(), window.unk5.into());
    map.insert("unk6".into(), window.unk6.into());
    map.insert("unk7".into(), window.unk7.into());
    map.insert("material".into(), window.material.clone().into());
    Value::Object(map)
}

fn window_from_json(map: &Map<String, Value>) -> Result<Window> {
    let raw = field_array(map, "subdata", 4)?;
    let mut corners: [WindowCorner; 4] = Default::default();
    for (corner, item) in corners.iter_mut().zip(raw) {
        let sub = obj(item)?;
        corner.material = field_str(sub, "material")?.to_string();
        corner.unk2 = field_u16(sub, "sub_unk2")?;
        corner.unk3 = field_u32(sub, "sub_unk3")?;
    }
    let padding_bytes = hex::decode(field_str(map, "padding")?)
        .map_err(|e| Error::json(format!("bad window padding hex: {e}")))?;
    let padding: [u8; 8] = padding_bytes
        .try_into()
        .map_err(|_| Error::json("window padding must be 8 bytes".to_string()))?;
    Ok(Window {
        pane: pane_from_fields(map)?,
        content_size: field_u16(map, "size")?,
        padding,
        corners,
        unkbyte1: field_u8(map, "unkbyte1")?,
        unkbyte2: field_u8(map, "unkbyte2")?,
        unk3: field_u16(map, "unk3")?,
        unk4: field_u16(map, "unk4")?,
        unk5: field_u16(map, "unk5")?,
        unk6: field_u16(map, "unk6")?,
        unk7: field_u16(map, "unk7")?,
        material: field_str(map, "material")?.to_string(),
    })
}

fn gradient_to_json(gradient: &Gradient) -> Value {
    json!({
        "unk1": gradient.unk1,
        "unk2": gradient.unk2,
        "unknowns": gradient.unknowns,
        "col1": gradient.col1.to_json(),
        "col2": gradient.col2.to_json(),
    })
}

fn gradient_from_json(value: &Value) -> Result<Gradient> {
    let map = obj(value)?;
    let raw = field_array(map, "unknowns", 4)?;
    let mut unknowns = [0u16; 4];
    for (slot, item) in unknowns.iter_mut().zip(raw) {
        *slot = item
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| Error::json("gradient unknowns must be u16".to_string()))?;
    }
    Ok(Gradient {
        unk1: field_u16(map, "unk1")?,
        unk2: field_u16(map, "unk2")?,
        unknowns,
        col1: Color::from_json(field(map, "col1")?)?,
        col2: Color::from_json(field(map, "col2")?)?,
    })
}

fn picture_to_json(picture: &Picture) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), "PIC2".into());
    pane_fields(&picture.pane, &mut map);
    map.insert("size".into(), picture.content_size.into());
    map.insert("unk_index".into(), picture.unk_index.into());
    map.insert("material".into(), picture.material.clone().into());
    map.insert("color1".into(), gradient_to_json(&picture.color1));
    map.insert("color2".into(), gradient_to_json(&picture.color2));
    Value::Object(map)
}

fn picture_from_json(map: &Map<String, Value>) -> Result<Picture> {
    Ok(Picture {
        pane: pane_from_fields(map)?,
        content_size: field_u16(map, "size")?,
        unk_index: field_u16(map, "unk_index")?,
        material: field_str(map, "material")?.to_string(),
        color1: gradient_from_json(field(map, "color1")?)?,
        color2: gradient_from_json(field(map, "color2")?)?,
    })
}

fn textbox_to_json(textbox: &Textbox) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), "TBX2".into());
    pane_fields(&textbox.pane, &mut map);
    map.insert("size".into(), textbox.content_size.into());
    map.insert("unk1".into(), textbox.unk1.into());
    map.insert("material".into(), textbox.material.clone().into());
    map.insert("signedunk3".into(), textbox.signed_unk3.into());
    map.insert("signedunk4".into(), textbox.signed_unk4.into());
    map.insert("unk5".into(), textbox.unk5.into());
    map.insert("unk6".into(), textbox.unk6.into());
    map.insert("unk7byte".into(), textbox.unk7.into());
    map.insert("unk8byte".into(), textbox.unk8.into());
    map.insert("color_top".into(), textbox.color_top.to_json());
    map.insert("color_bottom".into(), textbox.color_bottom.to_json());
    map.insert("unk11".into(), textbox.unk11.into());
    map.insert("text_cutoff".into(), textbox.text_cutoff.into());
    map.insert("text".into(), textbox.text.clone().into());
    Value::Object(map)
}

fn textbox_from_json(map: &Map<String, Value>) -> Result<Textbox> {
    Ok(Textbox {
        pane: pane_from_fields(map)?,
        content_size: field_u16(map, "size")?,
        unk1: field_u16(map, "unk1")?,
        material: field_str(map, "material")?.to_string(),
        signed_unk3: field_i16(map, "signedunk3")?,
        signed_unk4: field_i16(map, "signedunk4")?,
        unk5: field_u16(map, "unk5")?,
        unk6: field_u16(map, "unk6")?,
        unk7: field_u8(map, "unk7byte")?,
        unk8: field_u8(map, "unk8byte")?,
        color_top: Color::from_json(field(map, "color_top")?)?,
        color_bottom: Color::from_json(field(map, "color_bottom")?)?,
        unk11: field_u8(map, "unk11")?,
        text_cutoff: field_u16(map, "text_cutoff")?,
        text: field_str(map, "text")?.to_string(),
    })
}

// --- Shared tables ---

fn resources_to_json(list: &ResourceList) -> Value {
    json!({
        "type": match list.kind {
            ResourceKind::Textures => "TEX1",
            ResourceKind::Fonts => "FNT1",
        },
        "references": list.references,
    })
}

fn resources_from_json(map: &Map<String, Value>, kind: ResourceKind) -> Result<ResourceList> {
    let raw = field(map, "references")?
        .as_array()
        .ok_or_else(|| Error::json("references must be an array".to_string()))?;
    let mut list = ResourceList::new(kind);
    for item in raw {
        let name = item
            .as_str()
            .ok_or_else(|| Error::json("references must be strings".to_string()))?;
        list.references.push(name.to_string());
    }
    Ok(list)
}

fn option_to_json(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}

fn blob_array_to_json<const N: usize>(blobs: &[Option<Blob<N>>]) -> Value {
    Value::Array(
        blobs
            .iter()
            .map(|b| option_to_json(b.as_ref().map(Blob::to_json)))
            .collect(),
    )
}

fn blob_array_from_json<const N: usize, const LEN: usize>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<[Option<Blob<N>>; LEN]> {
    let raw = field_array(map, key, LEN)?;
    let mut out = [None; LEN];
    for (slot, item) in out.iter_mut().zip(raw) {
        if !item.is_null() {
            *slot = Some(Blob::from_json(item)?);
        }
    }
    Ok(out)
}

fn i8_array_from_json<const LEN: usize>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<[i8; LEN]> {
    let raw = field_array(map, key, LEN)?;
    let mut out = [0i8; LEN];
    for (slot, item) in out.iter_mut().zip(raw) {
        *slot = item
            .as_i64()
            .and_then(|v| i8::try_from(v).ok())
            .ok_or_else(|| Error::json(format!("field {key:?} entries must be i8")))?;
    }
    Ok(out)
}

/// Serialize one material, resolving texture indices to names where the
/// index is inside the reference list.
fn material_to_json(material: &Material, textures: &ResourceList) -> Value {
    let texture_slots: Vec<Value> = material
        .textures
        .iter()
        .map(|slot| match slot {
            None => Value::Null,
            Some(index) => match textures.name(*index as usize) {
                Ok(name) => name.into(),
                Err(_) => (*index).into(),
            },
        })
        .collect();

    let mut map = Map::new();
    map.insert("name".into(), material.name.clone().into());
    map.insert("flag".into(), material.flag.into());
    map.insert("cullmode".into(), material.cull_mode.to_json());
    map.insert("color_channel_count".into(), material.color_channel_count.into());
    map.insert("tex_gen_count".into(), material.tex_gen_count.into());
    map.insert("tev_stage_count".into(), material.tev_stage_count.into());
    map.insert("dither".into(), material.dither.into());
    map.insert("unk".into(), material.unk.into());
    map.insert(
        "matcolors".into(),
        Value::Array(
            material
                .mat_colors
                .iter()
                .map(|c| option_to_json(c.map(Color::to_json)))
                .collect(),
        ),
    );
    map.insert("color_channels".into(), blob_array_to_json(&material.color_channels));
    map.insert(
        "tex_coord_generators".into(),
        blob_array_to_json(&material.tex_coord_generators),
    );
    map.insert("tex_matrices".into(), blob_array_to_json(&material.tex_matrices));
    map.insert("textures".into(), Value::Array(texture_slots));
    map.insert(
        "font".into(),
        option_to_json(material.font.as_ref().map(Blob::to_json)),
    );
    map.insert("tevkcolors".into(), blob_array_to_json(&material.tev_k_colors));
    map.insert(
        "tevkcolor_selects".into(),
        Value::Array(material.tev_k_color_selects.iter().map(|&v| v.into()).collect()),
    );
    map.insert(
        "tevkalpha_selects".into(),
        Value::Array(material.tev_k_alpha_selects.iter().map(|&v| v.into()).collect()),
    );
    map.insert("tevorders".into(), blob_array_to_json(&material.tev_orders));
    map.insert("tevcolors".into(), blob_array_to_json(&material.tev_colors));
    map.insert("tevstages".into(), blob_array_to_json(&material.tev_stages));
    map.insert(
        "tevstage_swapmodes".into(),
        blob_array_to_json(&material.tev_swap_modes),
    );
    map.insert(
        "tev_swapmode_tables".into(),
        blob_array_to_json(&material.tev_swap_mode_tables),
    );
    map.insert("alphacomp".into(), material.alpha_compare.to_json());
    map.insert("blend".into(), material.blend.to_json());
    map.insert(
        "indirectdata".into(),
        option_to_json(material.indirect.as_ref().map(Blob::to_json)),
    );
    Value::Object(map)
}

/// Deserialize one material, resolving texture names back to indices and
/// registering names the list does not know yet.
fn material_from_json(value: &Value, textures: &mut ResourceList) -> Result<Material> {
    let map = obj(value)?;

    let raw_textures = field_array(map, "textures", 8)?;
    let mut texture_slots = [None; 8];
    for (slot, item) in texture_slots.iter_mut().zip(raw_textures) {
        *slot = match item {
            Value::Null => None,
            Value::String(name) => Some(textures.index_or_register(name)),
            other => Some(
                other
                    .as_u64()
                    .and_then(|v| u16::try_from(v).ok())
                    .ok_or_else(|| Error::json(format!("bad texture slot: {other}")))?,
            ),
        };
    }

    let raw_colors = field_array(map, "matcolors", 2)?;
    let mut mat_colors = [None; 2];
    for (slot, item) in mat_colors.iter_mut().zip(raw_colors) {
        if !item.is_null() {
            *slot = Some(Color::from_json(item)?);
        }
    }

    let font = match field(map, "font")? {
        Value::Null => None,
        other => Some(FontNumber::from_json(other)?),
    };
    let indirect = match map.get("indirectdata") {
        None | Some(Value::Null) => None,
        Some(other) => Some(IndirectInitData::from_json(other)?),
    };

    Ok(Material {
        name: field_str(map, "name")?.to_string(),
        flag: field_i8(map, "flag")?,
        cull_mode: CullMode::from_json(field(map, "cullmode")?)?,
        color_channel_count: field_u8(map, "color_channel_count")?,
        tex_gen_count: field_u8(map, "tex_gen_count")?,
        tev_stage_count: field_u8(map, "tev_stage_count")?,
        dither: field_u8(map, "dither")?,
        unk: field_i8(map, "unk")?,
        mat_colors,
        color_channels: blob_array_from_json::<{ ChannelControl::SIZE }, 4>(map, "color_channels")?,
        tex_coord_generators: blob_array_from_json::<{ TexCoordInfo::SIZE }, 8>(
            map,
            "tex_coord_generators",
        )?,
        tex_matrices: blob_array_from_json::<{ TexMatrix::SIZE }, 8>(map, "tex_matrices")?,
        textures: texture_slots,
        font,
        tev_k_colors: blob_array_from_json::<{ TevKColor::SIZE }, 4>(map, "tevkcolors")?,
        tev_k_color_selects: i8_array_from_json(map, "tevkcolor_selects")?,
        tev_k_alpha_selects: i8_array_from_json(map, "tevkalpha_selects")?,
        tev_orders: blob_array_from_json::<{ TevOrder::SIZE }, 16>(map, "tevorders")?,
        tev_colors: blob_array_from_json::<{ TevColor::SIZE }, 4>(map, "tevcolors")?,
        tev_stages: blob_array_from_json::<{ TevStage::SIZE }, 16>(map, "tevstages")?,
        tev_swap_modes: blob_array_from_json::<{ TevSwapMode::SIZE }, 16>(
            map,
            "tevstage_swapmodes",
        )?,
        tev_swap_mode_tables: blob_array_from_json::<{ TevSwapModeTable::SIZE }, 4>(
            map,
            "tev_swapmode_tables",
        )?,
        alpha_compare: AlphaCompare::from_json(field(map, "alphacomp")?)?,
        blend: Blend::from_json(field(map, "blend")?)?,
        indirect,
    })
}

fn mat1_to_json(mat1: &Mat1, textures: &ResourceList) -> Value {
    json!({
        "type": "MAT1",
        "Materials": mat1
            .materials
            .iter()
            .map(|m| material_to_json(m, textures))
            .collect::<Vec<Value>>(),
    })
}

fn mat1_from_json(map: &Map<String, Value>, textures: &mut ResourceList) -> Result<Mat1> {
    let raw = field(map, "Materials")?
        .as_array()
        .ok_or_else(|| Error::json("Materials must be an array".to_string()))?;
    let mut mat1 = Mat1::new();
    for item in raw {
        mat1.materials.push(material_from_json(item, textures)?);
    }
    Ok(mat1)
}

// --- Node lists ---

fn node_to_json(arena: &Arena, node: NodeId) -> Value {
    let mut items = Vec::new();
    for &id in &arena.node(node).children {
        let element = arena.element(id);
        items.push(match &element.kind {
            ElementKind::Pane(pane) => pane_to_json(pane),
            ElementKind::Window(window) => window_to_json(window),
            ElementKind::Picture(picture) => picture_to_json(picture),
            ElementKind::Textbox(textbox) => textbox_to_json(textbox),
            ElementKind::Materials => mat1_to_json(&arena.materials, &arena.textures),
            ElementKind::Textures => resources_to_json(&arena.textures),
            ElementKind::Fonts => resources_to_json(&arena.fonts),
        });
        if let Some(child) = element.child {
            items.push(node_to_json(arena, child));
        }
    }
    Value::Array(items)
}

fn node_from_json(arena: &mut Arena, value: &Value) -> Result<NodeId> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::json("node must be an array".to_string()))?;
    let node = arena.alloc_node();
    let mut last = None;

    for item in items {
        if item.is_array() {
            let owner = last.take().ok_or_else(|| {
                Error::json("child list without a preceding element".to_string())
            })?;
            let child = node_from_json(arena, item)?;
            arena.attach_child(owner, child);
            continue;
        }
        let map = obj(item)?;
        match type_of(map)? {
            "PAN2" | "pan2" => {
                let pane = pane_from_fields(map)?;
                last = Some(arena.push_element(node, ElementKind::Pane(pane)));
            }
            "WIN2" => {
                let window = window_from_json(map)?;
                last = Some(arena.push_element(node, ElementKind::Window(window)));
            }
            "PIC2" => {
                let picture = picture_from_json(map)?;
                last = Some(arena.push_element(node, ElementKind::Picture(picture)));
            }
            "TBX2" => {
                let textbox = textbox_from_json(map)?;
                last = Some(arena.push_element(node, ElementKind::Textbox(textbox)));
            }
            "MAT1" => {
                arena.materials = mat1_from_json(map, &mut arena.textures)?;
                arena.push_element(node, ElementKind::Materials);
            }
            "TEX1" => {
                arena.textures = resources_from_json(map, ResourceKind::Textures)?;
                arena.push_element(node, ElementKind::Textures);
            }
            "FNT1" => {
                arena.fonts = resources_from_json(map, ResourceKind::Fonts)?;
                arena.push_element(node, ElementKind::Fonts);
            }
            other => return Err(Error::json(format!("unknown element type {other:?}"))),
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat1::TevStage;

    fn named_pane(name: &str) -> Pane {
        Pane {
            name: format!("{name:<8}"),
            ..Pane::new()
        }
    }

    fn sample_material(name: &str) -> Material {
        let mut mat = Material {
            name: name.to_string(),
            flag: 1,
            cull_mode: CullMode::Back,
            ..Material::default()
        };
        mat.mat_colors[0] = Some(Color::new(255, 255, 255, 255));
        mat.textures[0] = Some(0);
        mat.tev_stages[0] = Some(TevStage::new([0xC0; 0x14]));
        mat
    }

    fn sample_screen() -> ScreenBlo {
        let mut screen = ScreenBlo::new();
        screen.arena.textures.references.push("icon.bti".into());
        screen.arena.materials.materials.push(sample_material("mat_a"));
        screen.arena.push_element(screen.root, ElementKind::Textures);
        screen.arena.push_element(screen.root, ElementKind::Materials);

        let parent = screen
            .arena
            .push_element(screen.root, ElementKind::Pane(named_pane("root____")));
        let inner = screen.arena.alloc_node();
        let picture = Picture {
            pane: named_pane("pic_____"),
            content_size: 0,
            unk_index: 0,
            material: "mat_a".into(),
            color1: Gradient::default(),
            color2: Gradient::default(),
        };
        screen
            .arena
            .push_element(inner, ElementKind::Picture(picture));
        screen.arena.attach_child(parent, inner);
        screen
    }

    #[test]
    fn test_round_trip() {
        let screen = sample_screen();
        let doc = to_json(&screen);
        let restored = from_json(&doc).unwrap();
        assert_eq!(restored.info, screen.info);
        assert_eq!(restored.arena, screen.arena);
        // Serialization is a fixed point.
        assert_eq!(to_json(&restored), doc);
    }

    #[test]
    fn test_document_shape() {
        let screen = sample_screen();
        let doc = to_json(&screen);
        let parts = doc.as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "INF1");

        let root = parts[1].as_array().unwrap();
        assert_eq!(root[0]["type"], "TEX1");
        assert_eq!(root[1]["type"], "MAT1");
        assert_eq!(root[2]["type"], "PAN2");
        assert_eq!(root[2]["p_panename"], "root____");
        // The pane's child node follows as a bare list.
        assert!(root[3].is_array());
        assert_eq!(root[3][0]["type"], "PIC2");
    }

    #[test]
    fn test_texture_index_becomes_name() {
        let screen = sample_screen();
        let doc = to_json(&screen);
        let mat = &doc[1][1]["Materials"][0];
        assert_eq!(mat["textures"][0], "icon.bti");
        assert_eq!(mat["textures"][1], Value::Null);
    }

    #[test]
    fn test_out_of_range_texture_index_stays_numeric() {
        let mut screen = sample_screen();
        screen.arena.materials.materials[0].textures[0] = Some(7);
        let doc = to_json(&screen);
        assert_eq!(doc[1][1]["Materials"][0]["textures"][0], 7);
    }

    #[test]
    fn test_unknown_texture_name_auto_registers() {
        let screen = sample_screen();
        let mut doc = to_json(&screen);
        doc[1][1]["Materials"][0]["textures"][1] = "extra.bti".into();
        let restored = from_json(&doc).unwrap();
        assert_eq!(
            restored.arena.textures.references,
            vec!["icon.bti".to_string(), "extra.bti".to_string()]
        );
        assert_eq!(restored.arena.materials.materials[0].textures[1], Some(1));
    }

    #[test]
    fn test_missing_indirectdata_key_tolerated() {
        let screen = sample_screen();
        let mut doc = to_json(&screen);
        doc[1][1]["Materials"][0]
            .as_object_mut()
            .unwrap()
            .remove("indirectdata");
        let restored = from_json(&doc).unwrap();
        assert_eq!(restored.arena.materials.materials[0].indirect, None);
    }

    #[test]
    fn test_dangling_child_list_rejected() {
        let doc = json!([
            {"type": "INF1", "width": 640, "height": 480, "values": [0, 0, 0, 0]},
            [[{"type": "PAN2"}]]
        ]);
        assert!(matches!(from_json(&doc), Err(Error::Json(_))));
    }

    #[test]
    fn test_json_text_round_trip() {
        // Through actual serde_json text, the way the CLI uses it.
        let screen = sample_screen();
        let text = serde_json::to_string_pretty(&to_json(&screen)).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        let restored = from_json(&doc).unwrap();
        assert_eq!(restored.arena, screen.arena);
    }
}
