use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;

use crate::app::{TileFlags, Tilemap, TilemapError};

const SOLID_PROPERTY: &str = "solid";
const OCCUPIED_PROPERTY: &str = "occupied";
const TRUE_VALUE: &str = "true";
// Tiled stores flip/rotation bits in the top of each gid.
const GID_FLAG_MASK: u32 = 0x1FFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum TmxError {
    #[error("failed to read tile map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML at {location}: {message}")]
    Malformed {
        message: String,
        location: SourceLocation,
    },
    #[error("root element must be <map>, found <{found}>")]
    InvalidRoot { found: String },
    #[error("<{element}> is missing attribute '{attribute}' at {location}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        location: SourceLocation,
    },
    #[error("<{element}> attribute '{attribute}' has invalid value '{value}' at {location}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
        location: SourceLocation,
    },
    #[error("external tileset '{source_path}' is not supported; embed the tileset in the map")]
    ExternalTileset { source_path: String },
    #[error("layer data encoding '{encoding}' is not supported; save the map with CSV encoding")]
    UnsupportedEncoding { encoding: String },
    #[error("map has no <layer> with <data>")]
    MissingLayer,
    #[error("invalid tile gid '{value}' at {location}")]
    InvalidGid {
        value: String,
        location: SourceLocation,
    },
    #[error(transparent)]
    Shape(#[from] TilemapError),
}

pub fn load_tmx(path: &Path) -> Result<Tilemap, TmxError> {
    let raw = fs::read_to_string(path).map_err(|source| TmxError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tmx(&raw)
}

/// Reads the map grid, the `solid`/`occupied` tile properties of inline tilesets and
/// the first CSV-encoded layer. Everything else in the document is ignored.
pub fn parse_tmx(raw: &str) -> Result<Tilemap, TmxError> {
    let doc = Document::parse(raw).map_err(|error| TmxError::Malformed {
        message: error.to_string(),
        location: SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        },
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(TmxError::InvalidRoot {
            found: root.tag_name().name().to_string(),
        });
    }

    let width = required_u32(&doc, root, "map", "width")?;
    let height = required_u32(&doc, root, "map", "height")?;
    let tile_width = required_u32(&doc, root, "map", "tilewidth")?;
    let tile_height = required_u32(&doc, root, "map", "tileheight")?;

    let mut flags_by_gid = BTreeMap::<u32, TileFlags>::new();
    for tileset in root
        .children()
        .filter(|node| node.has_tag_name("tileset"))
    {
        if let Some(source_path) = tileset.attribute("source") {
            return Err(TmxError::ExternalTileset {
                source_path: source_path.to_string(),
            });
        }
        let first_gid = required_u32(&doc, tileset, "tileset", "firstgid")?;
        for tile in tileset.children().filter(|node| node.has_tag_name("tile")) {
            let local_id = required_u32(&doc, tile, "tile", "id")?;
            let flags = tile_flags(tile);
            if flags != TileFlags::CLEAR {
                flags_by_gid.insert(first_gid.saturating_add(local_id), flags);
            }
        }
    }

    let data = root
        .children()
        .filter(|node| node.has_tag_name("layer"))
        .find_map(|layer| layer.children().find(|node| node.has_tag_name("data")))
        .ok_or(TmxError::MissingLayer)?;
    let encoding = data.attribute("encoding").unwrap_or("xml");
    if encoding != "csv" {
        return Err(TmxError::UnsupportedEncoding {
            encoding: encoding.to_string(),
        });
    }

    let data_location = location_of(&doc, data);
    let mut tiles = Vec::new();
    for token in data
        .text()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        let gid = token.parse::<u32>().map_err(|_| TmxError::InvalidGid {
            value: token.to_string(),
            location: data_location,
        })? & GID_FLAG_MASK;
        tiles.push(flags_by_gid.get(&gid).copied().unwrap_or_default());
    }

    Ok(Tilemap::new(width, height, tile_width, tile_height, tiles)?)
}

fn tile_flags(tile: Node<'_, '_>) -> TileFlags {
    let mut flags = TileFlags::CLEAR;
    let properties = tile
        .children()
        .filter(|node| node.has_tag_name("properties"))
        .flat_map(|node| node.children())
        .filter(|node| node.has_tag_name("property"));
    for property in properties {
        let is_true = property.attribute("value") == Some(TRUE_VALUE);
        match property.attribute("name") {
            Some(SOLID_PROPERTY) => flags.solid = is_true,
            Some(OCCUPIED_PROPERTY) => flags.occupied = is_true,
            _ => {}
        }
    }
    flags
}

fn required_u32(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<u32, TmxError> {
    let Some(value) = node.attribute(attribute) else {
        return Err(TmxError::MissingAttribute {
            element,
            attribute,
            location: location_of(doc, node),
        });
    };
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| TmxError::InvalidAttribute {
            element,
            attribute,
            value: value.to_string(),
            location: location_of(doc, node),
        })
}

fn location_of(doc: &Document<'_>, node: Node<'_, '_>) -> SourceLocation {
    let pos = doc.text_pos_at(node.range().start);
    SourceLocation {
        line: pos.row as usize,
        column: pos.col as usize,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::app::Position;

    const SMALL_MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.0" orientation="orthogonal" width="3" height="2" tilewidth="32" tileheight="32">
 <tileset firstgid="1" name="terrain" tilewidth="32" tileheight="32">
  <image source="terrain.png" width="64" height="64"/>
  <tile id="1">
   <properties>
    <property name="solid" value="true"/>
    <property name="occupied" value="true"/>
   </properties>
  </tile>
  <tile id="2">
   <properties>
    <property name="occupied" value="true"/>
   </properties>
  </tile>
 </tileset>
 <layer name="ground" width="3" height="2">
  <data encoding="csv">
1,2,1,
3,1,0
</data>
 </layer>
</map>"#;

    #[test]
    fn reads_flags_from_inline_tileset() {
        let map = parse_tmx(SMALL_MAP).expect("parse");
        assert_eq!((map.width(), map.height()), (3, 2));
        assert_eq!(map.tile_at(0, 0), Some(TileFlags::CLEAR));
        assert_eq!(map.tile_at(1, 0), Some(TileFlags::SOLID));
        assert_eq!(
            map.tile_at(0, 1),
            Some(TileFlags {
                solid: false,
                occupied: true
            })
        );
        assert_eq!(map.tile_at(2, 1), Some(TileFlags::CLEAR));
        assert!(map.is_solid(Position::new(40.0, 10.0)));
        assert!(map.is_occupied(Position::new(10.0, 40.0)));
    }

    #[test]
    fn masks_flip_bits_in_gids() {
        let flipped = SMALL_MAP.replace("1,2,1,", "1,2147483650,1,");
        let map = parse_tmx(&flipped).expect("parse");
        assert_eq!(map.tile_at(1, 0), Some(TileFlags::SOLID));
    }

    #[test]
    fn rejects_non_csv_layers() {
        let base64 = SMALL_MAP.replace("encoding=\"csv\"", "encoding=\"base64\"");
        let error = parse_tmx(&base64).unwrap_err();
        assert!(matches!(error, TmxError::UnsupportedEncoding { encoding } if encoding == "base64"));
    }

    #[test]
    fn rejects_external_tilesets() {
        let raw = r#"<map width="1" height="1" tilewidth="32" tileheight="32">
<tileset firstgid="1" source="terrain.tsx"/>
<layer><data encoding="csv">1</data></layer></map>"#;
        assert!(matches!(
            parse_tmx(raw),
            Err(TmxError::ExternalTileset { .. })
        ));
    }

    #[test]
    fn reports_missing_attribute_with_location() {
        let raw = "<map width=\"2\" height=\"2\" tilewidth=\"32\">\n</map>";
        match parse_tmx(raw) {
            Err(TmxError::MissingAttribute {
                element,
                attribute,
                location,
            }) => {
                assert_eq!(element, "map");
                assert_eq!(attribute, "tileheight");
                assert_eq!(location.line, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn tile_count_must_match_grid() {
        let short = SMALL_MAP.replace("3,1,0", "3,1");
        assert!(matches!(
            parse_tmx(&short),
            Err(TmxError::Shape(TilemapError::TileCountMismatch {
                expected: 6,
                actual: 5
            }))
        ));
    }

    #[test]
    fn oversized_grid_is_an_error_not_an_allocation() {
        let raw = r#"<map width="4294967295" height="4294967295" tilewidth="32" tileheight="32">
<layer><data encoding="csv">0</data></layer></map>"#;
        assert!(matches!(
            parse_tmx(raw),
            Err(TmxError::Shape(TilemapError::TooLarge { .. }))
        ));
    }

    #[test]
    fn malformed_xml_and_bad_gids_are_errors() {
        assert!(matches!(
            parse_tmx("<map"),
            Err(TmxError::Malformed { .. })
        ));
        let bad = SMALL_MAP.replace("3,1,0", "3,x,0");
        assert!(matches!(parse_tmx(&bad), Err(TmxError::InvalidGid { .. })));
    }

    #[test]
    fn loads_from_disk() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("main.tmx");
        fs::write(&path, SMALL_MAP).expect("write map");
        let map = load_tmx(&path).expect("load");
        assert_eq!(map.pixel_width(), 96.0);

        let missing = load_tmx(&temp.path().join("absent.tmx")).unwrap_err();
        assert!(matches!(missing, TmxError::Read { .. }));
    }
}
