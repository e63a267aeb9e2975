//! Application constants for HSPF post-processing
//!
//! Block markers, fixed-width field offsets and default values used by the
//! UCI parsers, the binary reader and the report builders.

// =============================================================================
// Report Defaults
// =============================================================================

/// Default land-cover modulus: PERLND 1, 21, 41, ... are land cover 1
pub const DEFAULT_MODULUS: u32 = 20;

/// Default float format for balance tables
pub const DEFAULT_BALANCE_FLOAT_FORMAT: &str = ".2f";

/// Default float format for mapping and parameter tables
pub const DEFAULT_TABLE_FLOAT_FORMAT: &str = "g";

/// Smallest and largest valid land unit identifier
pub const MIN_UNIT_ID: i64 = 1;
pub const MAX_UNIT_ID: i64 = 999;

// =============================================================================
// Output Column Names
// =============================================================================

/// Index column of balance tables
pub const BALANCE_TERM_COLUMN: &str = "BALANCE TERM";

/// Summary column of balance tables
pub const ALL_COLUMN: &str = "ALL";

/// Index column of mapping and parameter tables
pub const UNIT_INDEX_COLUMN: &str = "lue";

/// Year column of the loaded binary table
pub const YEAR_COLUMN: &str = "year";

/// Area header rows, prepended when a UCI file is supplied
pub const PERVIOUS_AREA_ACRES: &str = "PERVIOUS AREA(acres)";
pub const PERVIOUS_AREA_PERCENT: &str = "PERVIOUS AREA(%)";
pub const IMPERVIOUS_AREA_ACRES: &str = "IMPERVIOUS AREA(acres)";
pub const IMPERVIOUS_AREA_PERCENT: &str = "IMPERVIOUS AREA(%)";

// =============================================================================
// UCI Layout
// =============================================================================

/// UCI block markers and fixed-width field layout
pub mod uci {
    /// Marker that flags a comment line
    pub const COMMENT_MARKER: &str = "***";

    /// Lines are truncated to this many columns before parsing
    pub const LINE_WIDTH: usize = 80;

    /// Parameter tables keep one extra column
    pub const PARAMETER_LINE_WIDTH: usize = 81;

    pub const SCHEMATIC: &str = "SCHEMATIC";
    pub const PERLND: &str = "PERLND";
    pub const GEN_INFO: &str = "  GEN-INFO";
    pub const MASS_LINK: &str = "MASS-LINK";
    pub const FILES: &str = "FILES";

    /// Table header lines following the SCHEMATIC marker
    pub const SCHEMATIC_HEADER_LINES: usize = 2;

    /// Whitespace token positions within a SCHEMATIC record
    pub const SCHEMATIC_OPERATION_TOKEN: usize = 0;
    pub const SCHEMATIC_UNIT_TOKEN: usize = 1;
    pub const SCHEMATIC_AREA_TOKEN: usize = 2;
    pub const SCHEMATIC_MASS_LINK_TOKEN: usize = 5;

    /// GEN-INFO unit id, range end and name columns
    pub const UNIT_ID_FIELD: (usize, usize) = (0, 5);
    pub const RANGE_END_FIELD: (usize, usize) = (5, 10);
    pub const NAME_FIELD: (usize, usize) = (10, 30);

    /// Parameter tables: values start at this column, one per field width
    pub const VALUE_START_COLUMN: usize = 10;
    pub const VALUE_FIELD_WIDTH: usize = 10;

    /// FILES block entry naming the supplemental (PEST) file
    pub const SUPPLEMENTAL_FILE_TYPE: &str = "PESTSU";
}

// =============================================================================
// HBN Layout
// =============================================================================

/// HSPF binary output (HBN) record layout
pub mod hbn {
    /// First byte of every HBN file
    pub const MAGIC: u8 = 0xFD;

    /// Record types
    pub const CATALOG_RECORD: u32 = 0;
    pub const DATA_RECORD: u32 = 1;

    /// Bytes in the record header following the length prefix
    pub const RECORD_HEADER_LEN: usize = 24;

    /// Aggregation level code of yearly records
    pub const YEARLY_LEVEL: u32 = 5;
}

// =============================================================================
// Parameter Tables
// =============================================================================

/// PWATER parameter blocks and their fields, in output order
pub const PARAMETER_BLOCKS: &[(&str, &[&str])] = &[
    (
        "PWAT-PARM2",
        &["FOREST", "LZSN", "INFILT", "LSUR", "SLSUR", "KVARY", "AGWRC"],
    ),
    (
        "PWAT-PARM3",
        &[
            "PETMAX", "PETMIN", "INFEXP", "INFILD", "DEEPFR", "BASETP", "AGWETP",
        ],
    ),
    ("PWAT-PARM4", &["CEPSC", "UZSN", "NSUR", "INTFW", "IRC", "LZETP"]),
];

/// HSPF defaults used when a parameter field is left blank
pub const PARAMETER_DEFAULTS: &[(&str, f64)] = &[
    ("FOREST", 0.0),
    ("KVARY", 0.0),
    ("PETMAX", 40.0),
    ("PETMIN", 35.0),
    ("INFEXP", 2.0),
    ("INFILD", 2.0),
    ("DEEPFR", 0.0),
    ("BASETP", 0.0),
    ("AGWETP", 0.0),
    ("CEPSC", 0.0),
    ("NSUR", 0.1),
    ("LZETP", 0.0),
];
