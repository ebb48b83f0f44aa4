//! Record and stream identifiers of the Visio 2003 binary format.

/// All-bits-set sentinel meaning "no reference" for any optional id.
pub const MINUS_ONE: u32 = 0xFFFF_FFFF;

/// Name of the drawing stream inside the OLE container
pub const VISIO_DOCUMENT_STREAM: &str = "VisioDocument";

/// Signature at the start of the drawing stream
pub const VISIO_SIGNATURE: &[u8] = b"Visio (TM) Drawing";

/// Offset of the file-format version byte in the drawing stream
pub const VERSION_OFFSET: usize = 0x1A;

/// File-format version of Visio 2003 drawings
pub const VERSION_11: u8 = 11;

/// Offset of the trailer pointer in the drawing stream
pub const TRAILER_POINTER_OFFSET: usize = 0x24;

/// Size of a serialized pointer in bytes
pub const POINTER_SIZE: usize = 18;

/// Size of a serialized chunk header in bytes
pub const CHUNK_HEADER_SIZE: usize = 19;

/// Pointer-info shift applied inside compressed sub-streams
pub const COMPRESSED_SHIFT: usize = 4;

/// Default character height: 12pt expressed in inches
pub const DEFAULT_FONT_SIZE: f64 = 12.0 / 72.0;

/// Chunk and pointer type identifiers.
///
/// The same numeric space is shared by pointer types (which locate
/// sub-streams) and chunk types (which tag records inside a chunk list).
pub mod chunk {
    pub const FOREIGN_DATA: u32 = 0x0c;
    pub const OLE_LIST: u32 = 0x0d;
    pub const TEXT: u32 = 0x0e;
    pub const TRAILER_STREAM: u32 = 0x14;
    pub const PAGE: u32 = 0x15;
    pub const COLORS: u32 = 0x16;
    pub const FONT_LIST: u32 = 0x18;
    pub const STYLES: u32 = 0x1a;
    pub const STENCILS: u32 = 0x1d;
    pub const STENCIL_PAGE: u32 = 0x1e;
    pub const OLE_DATA: u32 = 0x1f;
    pub const PAGES: u32 = 0x27;
    pub const NAME_LIST: u32 = 0x2c;
    pub const NAME: u32 = 0x2d;
    pub const NAME_LIST2: u32 = 0x32;
    pub const NAME2: u32 = 0x33;
    pub const PAGE_SHEET: u32 = 0x46;
    pub const SHAPE_GROUP: u32 = 0x47;
    pub const SHAPE_SHAPE: u32 = 0x48;
    pub const STYLE_SHEET: u32 = 0x4a;
    pub const SHAPE_FOREIGN: u32 = 0x4e;
    pub const SHAPE_LIST: u32 = 0x65;
    pub const FIELD_LIST: u32 = 0x66;
    pub const CHAR_LIST: u32 = 0x69;
    pub const PARA_LIST: u32 = 0x6a;
    pub const GEOM_LIST: u32 = 0x6c;
    pub const LAYER_LIST: u32 = 0x6f;
    pub const SHAPE_ID: u32 = 0x83;
    pub const LINE: u32 = 0x85;
    pub const FILL_AND_SHADOW: u32 = 0x86;
    pub const TEXT_BLOCK: u32 = 0x87;
    pub const GEOMETRY: u32 = 0x89;
    pub const MOVE_TO: u32 = 0x8a;
    pub const LINE_TO: u32 = 0x8b;
    pub const ARC_TO: u32 = 0x8c;
    pub const INFINITE_LINE: u32 = 0x8d;
    pub const ELLIPSE: u32 = 0x8f;
    pub const ELLIPTICAL_ARC_TO: u32 = 0x90;
    pub const PAGE_PROPS: u32 = 0x92;
    pub const CHAR_IX: u32 = 0x94;
    pub const PARA_IX: u32 = 0x95;
    pub const FOREIGN_DATA_TYPE: u32 = 0x98;
    pub const XFORM_DATA: u32 = 0x9a;
    pub const TEXT_XFORM: u32 = 0x9b;
    pub const TEXT_FIELD: u32 = 0x9c;
    pub const SPLINE_START: u32 = 0xa5;
    pub const SPLINE_KNOT: u32 = 0xa6;
    pub const LAYER_MEMBERSHIP: u32 = 0xa7;
    pub const LAYER: u32 = 0xa8;
    pub const POLYLINE_TO: u32 = 0xc1;
    pub const NURBS_TO: u32 = 0xc3;
    pub const NAMEIDX: u32 = 0xc9;
    pub const SHAPE_DATA: u32 = 0xd1;
    pub const FONTFACES: u32 = 0xd8;
}

/// Chunk types whose header is always followed by an 8-byte list trailer.
pub const LIST_TRAILER_CHUNKS: [u32; 10] = [0x0d, 0x2c, 0x64, 0x65, 0x66, 0x69, 0x6a, 0x6b, 0x70, 0x71];

/// Chunk types that carry a 4-byte separator unless the trailer is already 4 or 12 bytes.
pub const SEPARATOR_TRAILER_CHUNKS: [u32; 14] = [
    0x64, 0x65, 0x66, 0x69, 0x6a, 0x6b, 0x6f, 0x71, 0x92, 0xa9, 0xb4, 0xb6, 0xb9, 0xc7,
];

/// Chunk types that never have a trailer.
pub const NO_TRAILER_CHUNKS: [u32; 4] = [0x1f, 0xc9, 0x2d, 0xd1];

/// Shape-data payload kinds
pub const SHAPE_DATA_POLYLINE: u8 = 0x80;
pub const SHAPE_DATA_NURBS: u8 = 0x82;

/// Text field code marking a name-table text field
pub const TEXT_FIELD_CODE: u8 = 0xe8;

/// Layer colour index meaning "layer does not override colour"
pub const LAYER_NO_COLOUR: u8 = 0xff;
