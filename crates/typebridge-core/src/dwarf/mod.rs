//! # DWARF Producer
//!
//! Loads debug information from an object file and drives the type store's
//! construction API from it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use typebridge_core::dwarf::DebugImage;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let image = DebugImage::open("/path/to/binary")?;
//!     let store = image.load_types()?;
//!
//!     for id in store.find_types_by_name("core::option::Option<u32>") {
//!         println!("{}", store.describe_type(id));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Both ELF (`.debug_*`) and Mach-O (`__debug_*`) section names are
//! recognised. Missing sections load as empty.

mod importer;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{Dwarf, EndianArcSlice, RunTimeEndian, SectionId};
use object::{Object, ObjectSection};
use once_cell::sync::OnceCell;
use tracing::debug;

pub use importer::{DwarfImporter, ImportSummary};

use crate::error::{map_dwarf_error, TypeBridgeError, TypeBridgeResult};
use crate::store::TypeStore;

/// Reader over a shared, owned section buffer
pub type OwnedReader = EndianArcSlice<RunTimeEndian>;
/// DWARF sections backed by [`OwnedReader`]s
pub type OwnedDwarf = Dwarf<OwnedReader>;

const DWARF_SECTIONS: &[(SectionId, &[&str])] = &[
    (SectionId::DebugAbbrev, &[".debug_abbrev", "__debug_abbrev"]),
    (SectionId::DebugAddr, &[".debug_addr", "__debug_addr"]),
    (SectionId::DebugInfo, &[".debug_info", "__debug_info"]),
    (SectionId::DebugLine, &[".debug_line", "__debug_line"]),
    (SectionId::DebugLineStr, &[".debug_line_str", "__debug_line_str"]),
    (SectionId::DebugRanges, &[".debug_ranges", "__debug_ranges"]),
    (SectionId::DebugRngLists, &[".debug_rnglists", "__debug_rnglists"]),
    (SectionId::DebugStr, &[".debug_str", "__debug_str"]),
    (SectionId::DebugStrOffsets, &[".debug_str_offsets", "__debug_str_offs"]),
    (SectionId::DebugTypes, &[".debug_types", "__debug_types"]),
    (SectionId::DebugLoc, &[".debug_loc", "__debug_loc"]),
    (SectionId::DebugLocLists, &[".debug_loclists", "__debug_loclists"]),
];

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> TypeBridgeResult<Option<Arc<[u8]>>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| TypeBridgeError::ObjectParse(format!("failed to read {name}: {err}")))?;
            return Ok(Some(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes),
                Cow::Owned(vec) => vec.into(),
            }));
        }
    }
    Ok(None)
}

/// Debug sections of one binary plus the facts needed to interpret them
pub struct DebugImage
{
    path: Option<PathBuf>,
    endian: RunTimeEndian,
    pointer_size: u64,
    sections: HashMap<SectionId, Arc<[u8]>>,
    dwarf_cache: OnceCell<OwnedDwarf>,
}

impl std::fmt::Debug for DebugImage
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("DebugImage")
            .field("path", &self.path)
            .field("endian", &self.endian)
            .field("pointer_size", &self.pointer_size)
            .field("sections", &self.sections.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl DebugImage
{
    /// Read and parse the object file at `path`
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read or is not a supported
    /// object format.
    pub fn open(path: impl AsRef<Path>) -> TypeBridgeResult<Self>
    {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut image = Self::parse(&bytes)
            .map_err(|err| TypeBridgeError::ObjectParse(format!("{}: {err}", path.display())))?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Parse an object file held in memory
    ///
    /// ## Errors
    ///
    /// Returns an error if the bytes are not a supported object format or a
    /// debug section cannot be decompressed.
    pub fn parse(data: &[u8]) -> TypeBridgeResult<Self>
    {
        let file = object::File::parse(data).map_err(|err| TypeBridgeError::ObjectParse(err.to_string()))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };
        let pointer_size = if file.is_64() { 8 } else { 4 };

        let mut sections = HashMap::new();
        for (id, aliases) in DWARF_SECTIONS {
            if let Some(data) = load_section_bytes(&file, aliases)? {
                sections.insert(*id, data);
            }
        }
        debug!(sections = sections.len(), pointer_size, ?endian, "parsed object file");

        Ok(Self {
            path: None,
            endian,
            pointer_size,
            sections,
            dwarf_cache: OnceCell::new(),
        })
    }

    /// Image built from raw section contents
    #[must_use]
    pub fn from_sections(sections: HashMap<SectionId, Vec<u8>>, endian: RunTimeEndian, pointer_size: u64) -> Self
    {
        Self {
            path: None,
            endian,
            pointer_size,
            sections: sections.into_iter().map(|(id, data)| (id, Arc::<[u8]>::from(data))).collect(),
            dwarf_cache: OnceCell::new(),
        }
    }

    /// File the image was read from
    #[must_use]
    pub fn path(&self) -> Option<&Path>
    {
        self.path.as_deref()
    }

    /// Byte order of the target
    #[must_use]
    pub fn endian(&self) -> RunTimeEndian
    {
        self.endian
    }

    /// Pointer width of the target
    #[must_use]
    pub fn pointer_size(&self) -> u64
    {
        self.pointer_size
    }

    /// Parsed DWARF, built on first use
    ///
    /// ## Errors
    ///
    /// Returns an error if the section set cannot be loaded.
    pub fn dwarf(&self) -> TypeBridgeResult<&OwnedDwarf>
    {
        self.dwarf_cache.get_or_try_init(|| {
            Dwarf::load(|section| Ok::<_, gimli::Error>(self.section_reader(section)))
                .map_err(|err| map_dwarf_error("loading DWARF sections", err))
        })
    }

    fn section_reader(&self, id: SectionId) -> OwnedReader
    {
        let data = self
            .sections
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        EndianArcSlice::new(data, self.endian)
    }

    /// Import every type and namespace into a fresh store
    ///
    /// ## Errors
    ///
    /// Returns an error if the DWARF is malformed.
    pub fn load_types(&self) -> TypeBridgeResult<TypeStore>
    {
        let mut store = TypeStore::new(self.pointer_size);
        let summary = DwarfImporter::new(self.dwarf()?)?.import_into(&mut store)?;
        debug!(
            types = summary.types,
            namespaces = summary.namespaces,
            functions = summary.functions,
            "imported debug info"
        );
        Ok(store)
    }
}
