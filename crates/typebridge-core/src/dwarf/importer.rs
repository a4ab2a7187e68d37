//! Walks DWARF debugging information entries and builds the matching types
//! and declarations in a [`TypeStore`].

use std::collections::HashMap;

use gimli::{
    constants, Attribute, AttributeValue, DebugTypeSignature, DebuggingInformationEntry, DwAt, Reader, Unit,
    UnitOffset, UnitSectionOffset, UnitType,
};
use tracing::{debug, trace, warn};

use super::{OwnedDwarf, OwnedReader};
use crate::decl::DeclContextId;
use crate::error::{map_dwarf_error, TypeBridgeResult};
use crate::store::{Discriminant, TypeStore};
use crate::types::{TypeId, TypeKind};

const MAX_TYPE_REF_DEPTH: usize = 32;

/// Member name older compilers give the leading discriminant of an enum
const LEGACY_DISCRIMINANT_NAME: &str = "RUST$ENUM$DISR";

type Entry<'abbrev, 'unit> = DebuggingInformationEntry<'abbrev, 'unit, OwnedReader>;
type TypeKey = (usize, UnitOffset<usize>);

/// Counts reported by [`DwarfImporter::import_into`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary
{
    /// Compilation and type units visited
    pub units: usize,
    /// Types in the store after the import
    pub types: usize,
    /// Namespace entries visited
    pub namespaces: usize,
    /// Function declarations recorded
    pub functions: usize,
}

/// Mutable side of an import: the store being filled and the DIE → type map
struct ImportState<'s>
{
    store: &'s mut TypeStore,
    cache: HashMap<TypeKey, TypeId>,
    void: Option<TypeId>,
    summary: ImportSummary,
}

impl ImportState<'_>
{
    fn void_type(&mut self) -> TypeId
    {
        if let Some(void) = self.void {
            return void;
        }
        let void = self.store.create_void_type();
        self.void = Some(void);
        void
    }
}

/// Translates the units of a DWARF image into store types
///
/// Every type DIE is imported at most once per import; references between
/// DIEs, including recursive ones, resolve to the same handle.
pub struct DwarfImporter<'a>
{
    dwarf: &'a OwnedDwarf,
    units: Vec<Unit<OwnedReader>>,
}

impl<'a> DwarfImporter<'a>
{
    /// Parse all unit headers of `dwarf`
    ///
    /// ## Errors
    ///
    /// Returns an error if a unit header is malformed.
    pub fn new(dwarf: &'a OwnedDwarf) -> TypeBridgeResult<Self>
    {
        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_info unit header", err))?
        {
            units.push(
                dwarf
                    .unit(header)
                    .map_err(|err| map_dwarf_error("parsing compilation unit", err))?,
            );
        }

        let mut type_headers = dwarf.type_units();
        while let Some(header) = type_headers
            .next()
            .map_err(|err| map_dwarf_error("reading .debug_types unit header", err))?
        {
            units.push(dwarf.unit(header).map_err(|err| map_dwarf_error("parsing type unit", err))?);
        }

        debug!(units = units.len(), "collected DWARF units");
        Ok(Self { dwarf, units })
    }

    /// Number of units found
    #[must_use]
    pub fn unit_count(&self) -> usize
    {
        self.units.len()
    }

    /// Import every type, namespace and function declaration into `store`
    ///
    /// ## Errors
    ///
    /// Returns an error if an entry cannot be decoded.
    pub fn import_into(&self, store: &mut TypeStore) -> TypeBridgeResult<ImportSummary>
    {
        let mut state = ImportState {
            store,
            cache: HashMap::new(),
            void: None,
            summary: ImportSummary::default(),
        };

        for (unit_index, unit) in self.units.iter().enumerate() {
            let mut tree = unit
                .entries_tree(None)
                .map_err(|err| map_dwarf_error("building unit tree", err))?;
            let root = tree.root().map_err(|err| map_dwarf_error("navigating unit root", err))?;
            let root_offset = root.entry().offset();
            let context = state.store.decls().translation_unit();
            self.walk_scope(&mut state, unit_index, root_offset, context)?;
            state.summary.units += 1;
        }

        state.summary.types = state.store.len();
        Ok(state.summary)
    }

    fn walk_scope(&self, state: &mut ImportState<'_>, unit_index: usize, offset: UnitOffset<usize>, context: DeclContextId) -> TypeBridgeResult<()>
    {
        let Some(unit) = self.units.get(unit_index) else {
            return Ok(());
        };
        for entry in Self::children(unit, offset)? {
            match entry.tag() {
                constants::DW_TAG_namespace => {
                    state.summary.namespaces += 1;
                    let inner = match self.string_attr(unit, &entry, constants::DW_AT_name)? {
                        Some(name) => state.store.decls_mut().namespace(context, &name),
                        None => context,
                    };
                    self.walk_scope(state, unit_index, entry.offset(), inner)?;
                }
                constants::DW_TAG_subprogram => {
                    let Some(name) = self.string_attr(unit, &entry, constants::DW_AT_name)? else {
                        continue;
                    };
                    let mangled = match self.string_attr(unit, &entry, constants::DW_AT_linkage_name)? {
                        Some(mangled) => Some(mangled),
                        None => self.string_attr(unit, &entry, constants::DW_AT_MIPS_linkage_name)?,
                    };
                    state
                        .store
                        .decls_mut()
                        .decl(context, &name, mangled.as_deref().unwrap_or_default());
                    state.summary.functions += 1;
                }
                tag if is_type_tag(tag) => {
                    self.import_type(state, unit_index, entry.offset(), 0)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn import_type(&self, state: &mut ImportState<'_>, unit_index: usize, offset: UnitOffset<usize>, depth: usize) -> TypeBridgeResult<TypeId>
    {
        if let Some(id) = state.cache.get(&(unit_index, offset)) {
            return Ok(*id);
        }
        if depth >= MAX_TYPE_REF_DEPTH {
            warn!(unit = unit_index, offset = offset.0, "type reference chain too deep");
            return Ok(TypeId::NULL);
        }
        let Some(unit) = self.units.get(unit_index) else {
            return Ok(TypeId::NULL);
        };
        let entry = unit
            .entry(offset)
            .map_err(|err| map_dwarf_error("resolving type reference", err))?;
        let name = self.string_attr(unit, &entry, constants::DW_AT_name)?;

        let id = match entry.tag() {
            constants::DW_TAG_base_type => self.import_base_type(state, &entry, name)?,
            constants::DW_TAG_pointer_type | constants::DW_TAG_reference_type | constants::DW_TAG_rvalue_reference_type => {
                let pointee = match self.referenced_type(state, unit_index, &entry, depth)? {
                    Some(pointee) => pointee,
                    None => state.void_type(),
                };
                let byte_size = udata_attr(&entry, constants::DW_AT_byte_size)?;
                match (name, byte_size) {
                    (None, None) => state.store.pointer_type_to(pointee),
                    (name, byte_size) => {
                        let name = match name {
                            Some(name) => name,
                            None => format!("*mut {}", state.store.name_of(pointee).unwrap_or_default()),
                        };
                        let byte_size = byte_size.unwrap_or_else(|| state.store.pointer_byte_size());
                        state.store.create_pointer_type(name, pointee, byte_size)
                    }
                }
            }
            constants::DW_TAG_typedef => {
                let underlying = match self.referenced_type(state, unit_index, &entry, depth)? {
                    Some(underlying) => underlying,
                    None => state.void_type(),
                };
                match name {
                    Some(name) => state.store.create_typedef_type(name, underlying),
                    None => underlying,
                }
            }
            constants::DW_TAG_const_type
            | constants::DW_TAG_volatile_type
            | constants::DW_TAG_restrict_type
            | constants::DW_TAG_atomic_type => match self.referenced_type(state, unit_index, &entry, depth)? {
                Some(inner) => inner,
                None => state.void_type(),
            },
            constants::DW_TAG_array_type => self.import_array(state, unit_index, &entry, depth)?,
            constants::DW_TAG_subroutine_type => self.import_subroutine(state, unit_index, &entry, name, depth)?,
            constants::DW_TAG_enumeration_type => self.import_enumeration(state, unit_index, &entry, name, depth)?,
            constants::DW_TAG_structure_type | constants::DW_TAG_class_type | constants::DW_TAG_union_type => {
                self.import_aggregate(state, unit_index, &entry, name, depth)?
            }
            constants::DW_TAG_unspecified_type => state.void_type(),
            tag => {
                trace!(%tag, offset = offset.0, "skipping unsupported type entry");
                TypeId::NULL
            }
        };

        state.cache.insert((unit_index, offset), id);
        Ok(id)
    }

    fn import_base_type(&self, state: &mut ImportState<'_>, entry: &Entry<'_, '_>, name: Option<String>) -> TypeBridgeResult<TypeId>
    {
        let byte_size = udata_attr(entry, constants::DW_AT_byte_size)?.unwrap_or(0);
        let encoding = attr(entry, constants::DW_AT_encoding)?.and_then(|attr| match attr.value() {
            AttributeValue::Encoding(encoding) => Some(encoding),
            _ => None,
        });
        let store = &mut *state.store;

        let id = match encoding {
            Some(constants::DW_ATE_boolean) => store.create_bool_type(name.unwrap_or_else(|| "bool".to_string())),
            Some(constants::DW_ATE_float) => {
                let name = name.unwrap_or_else(|| format!("f{}", byte_size * 8));
                store.create_float_type(name, byte_size)
            }
            Some(constants::DW_ATE_UTF) => {
                store.create_integral_type(name.unwrap_or_else(|| "char".to_string()), false, byte_size, true)
            }
            Some(constants::DW_ATE_signed | constants::DW_ATE_signed_char) => match name {
                Some(name) => store.create_integral_type(name, true, byte_size, false),
                None => store.create_intrinsic_integral_type(true, byte_size),
            },
            Some(constants::DW_ATE_unsigned | constants::DW_ATE_unsigned_char) => match name {
                Some(name) => store.create_integral_type(name, false, byte_size, false),
                None => store.create_intrinsic_integral_type(false, byte_size),
            },
            other => {
                trace!(encoding = ?other, name = ?name, "skipping base type with unsupported encoding");
                TypeId::NULL
            }
        };
        Ok(id)
    }

    fn import_array(&self, state: &mut ImportState<'_>, unit_index: usize, entry: &Entry<'_, '_>, depth: usize) -> TypeBridgeResult<TypeId>
    {
        let Some(unit) = self.units.get(unit_index) else {
            return Ok(TypeId::NULL);
        };
        let mut element = match self.referenced_type(state, unit_index, entry, depth)? {
            Some(element) => element,
            None => return Ok(TypeId::NULL),
        };

        let mut dimensions = Vec::new();
        for child in Self::children(unit, entry.offset())? {
            if child.tag() == constants::DW_TAG_subrange_type {
                dimensions.push(subrange_length(&child)?);
            }
        }
        if dimensions.is_empty() {
            dimensions.push(0);
        }

        // `int a[2][3]` is an array of 2 arrays of 3.
        for length in dimensions.into_iter().rev() {
            element = state.store.create_array_type(element, length);
        }
        Ok(element)
    }

    fn import_subroutine(
        &self,
        state: &mut ImportState<'_>,
        unit_index: usize,
        entry: &Entry<'_, '_>,
        name: Option<String>,
        depth: usize,
    ) -> TypeBridgeResult<TypeId>
    {
        let Some(unit) = self.units.get(unit_index) else {
            return Ok(TypeId::NULL);
        };
        let return_type = self.referenced_type(state, unit_index, entry, depth)?;

        let mut params = Vec::new();
        for child in Self::children(unit, entry.offset())? {
            if child.tag() != constants::DW_TAG_formal_parameter {
                continue;
            }
            if let Some(param) = self.referenced_type(state, unit_index, &child, depth)? {
                params.push(param);
            }
        }

        let name = match name {
            Some(name) => name,
            None => {
                let store = &*state.store;
                let args: Vec<&str> = params
                    .iter()
                    .map(|param| store.name_of(*param).unwrap_or_default())
                    .collect();
                match return_type.and_then(|ret| store.name_of(ret)) {
                    Some(ret) => format!("fn({}) -> {ret}", args.join(", ")),
                    None => format!("fn({})", args.join(", ")),
                }
            }
        };
        let return_type = match return_type {
            Some(ret) => ret,
            None => state.void_type(),
        };
        Ok(state.store.create_function_type(name, return_type, params, []))
    }

    fn import_enumeration(
        &self,
        state: &mut ImportState<'_>,
        unit_index: usize,
        entry: &Entry<'_, '_>,
        name: Option<String>,
        depth: usize,
    ) -> TypeBridgeResult<TypeId>
    {
        let Some(unit) = self.units.get(unit_index) else {
            return Ok(TypeId::NULL);
        };
        let underlying = match self.referenced_type(state, unit_index, entry, depth)? {
            Some(underlying) => underlying,
            None => {
                let byte_size = udata_attr(entry, constants::DW_AT_byte_size)?.unwrap_or(4);
                state.store.create_intrinsic_integral_type(false, byte_size)
            }
        };

        let mut values = Vec::new();
        for child in Self::children(unit, entry.offset())? {
            if child.tag() != constants::DW_TAG_enumerator {
                continue;
            }
            let Some(value) = attr(&child, constants::DW_AT_const_value)?.and_then(|attr| attribute_to_u64(&attr)) else {
                continue;
            };
            let variant = self.string_attr(unit, &child, constants::DW_AT_name)?.unwrap_or_default();
            values.push((value, variant));
        }

        Ok(state.store.create_c_like_enum_type(name.unwrap_or_default(), underlying, values))
    }

    fn import_aggregate(
        &self,
        state: &mut ImportState<'_>,
        unit_index: usize,
        entry: &Entry<'_, '_>,
        name: Option<String>,
        depth: usize,
    ) -> TypeBridgeResult<TypeId>
    {
        let Some(unit) = self.units.get(unit_index) else {
            return Ok(TypeId::NULL);
        };
        let name = name.unwrap_or_default();
        let byte_size = udata_attr(entry, constants::DW_AT_byte_size)?.unwrap_or(0);

        let mut members = Vec::new();
        let mut template_params = Vec::new();
        let mut variant_part = None;
        for child in Self::children(unit, entry.offset())? {
            match child.tag() {
                constants::DW_TAG_member => members.push(child),
                constants::DW_TAG_variant_part => variant_part = Some(child),
                constants::DW_TAG_template_type_parameter => template_params.push(child),
                _ => {}
            }
        }

        let mut member_names = Vec::with_capacity(members.len());
        for member in &members {
            member_names.push(self.string_attr(unit, member, constants::DW_AT_name)?.unwrap_or_default());
        }

        // Older compilers encode an enum as a union of variant structs that
        // each lead with the discriminant.
        let legacy_discriminant = match &variant_part {
            None if entry.tag() == constants::DW_TAG_union_type => {
                match self.legacy_discriminant_member(unit_index, &members)? {
                    Some((member_unit, member_offset_in_unit)) => {
                        Some(self.discriminant_member(state, member_unit, member_offset_in_unit, depth)?)
                    }
                    None => None,
                }
            }
            _ => None,
        };

        let mut builder = if let Some(part) = &variant_part {
            let (discr_offset, discr_byte_size) = self.discriminant_location(state, unit_index, part, depth)?;
            state
                .store
                .create_enum_type(name, byte_size, discr_offset, discr_byte_size)
        } else if let Some((discr_offset, discr_byte_size, _)) = legacy_discriminant {
            state
                .store
                .create_enum_type(name, byte_size, discr_offset, discr_byte_size)
        } else if entry.tag() == constants::DW_TAG_union_type {
            state.store.create_union_type(name, byte_size)
        } else {
            let has_discriminant = member_names.first().is_some_and(|first| first == LEGACY_DISCRIMINANT_NAME);
            if is_tuple_layout(&name, &member_names) {
                state.store.create_tuple_type(name, byte_size, has_discriminant)
            } else {
                state.store.create_struct_type(name, byte_size, has_discriminant)
            }
        };
        // Members may point back at this aggregate.
        state.cache.insert((unit_index, entry.offset()), builder.id());

        for (index, (member, member_name)) in members.iter().zip(member_names).enumerate() {
            let ty = self
                .referenced_type(state, unit_index, member, depth)?
                .unwrap_or(TypeId::NULL);
            let offset = member_offset(member)?;
            match legacy_discriminant {
                Some((_, _, discr_ty)) => {
                    let value = legacy_discriminant_value(&*state.store, discr_ty, &member_name, index);
                    builder.add_variant(member_name, ty, offset, Discriminant::Value(value));
                }
                None => {
                    builder.add_field(member_name, ty, offset);
                }
            }
        }

        if let Some(part) = &variant_part {
            for variant in Self::children(unit, part.offset())? {
                if variant.tag() != constants::DW_TAG_variant {
                    continue;
                }
                let discriminant = match attr(&variant, constants::DW_AT_discr_value)?.and_then(|attr| attribute_to_u64(&attr)) {
                    Some(value) => Discriminant::Value(value),
                    None => Discriminant::Default,
                };
                for member in Self::children(unit, variant.offset())? {
                    if member.tag() != constants::DW_TAG_member {
                        continue;
                    }
                    let variant_name = self.string_attr(unit, &member, constants::DW_AT_name)?.unwrap_or_default();
                    let ty = self
                        .referenced_type(state, unit_index, &member, depth)?
                        .unwrap_or(TypeId::NULL);
                    builder.add_variant(variant_name, ty, member_offset(&member)?, discriminant);
                }
            }
        }

        for param in &template_params {
            if let Some(ty) = self.referenced_type(state, unit_index, param, depth)? {
                builder.add_template_argument(ty);
            }
        }

        Ok(state.store.finish(builder))
    }

    /// Offset and width of the member a variant part's `DW_AT_discr` names
    fn discriminant_location(&self, state: &mut ImportState<'_>, unit_index: usize, part: &Entry<'_, '_>, depth: usize) -> TypeBridgeResult<(u64, u64)>
    {
        let Some(discr) = attr(part, constants::DW_AT_discr)? else {
            return Ok((0, 0));
        };
        let Some((member_unit, member_offset_in_unit)) = self.resolve_reference(unit_index, discr.value()) else {
            return Ok((0, 0));
        };
        let (offset, byte_size, _) = self.discriminant_member(state, member_unit, member_offset_in_unit, depth)?;
        Ok((offset, byte_size))
    }

    /// Offset, width, and type of a discriminant member
    fn discriminant_member(
        &self,
        state: &mut ImportState<'_>,
        member_unit: usize,
        member_offset_in_unit: UnitOffset<usize>,
        depth: usize,
    ) -> TypeBridgeResult<(u64, u64, Option<TypeId>)>
    {
        let Some(unit) = self.units.get(member_unit) else {
            return Ok((0, 0, None));
        };
        let member = unit
            .entry(member_offset_in_unit)
            .map_err(|err| map_dwarf_error("resolving discriminant member", err))?;
        let offset = member_offset(&member)?;
        let ty = self.referenced_type(state, member_unit, &member, depth)?;
        let byte_size = ty.and_then(|ty| state.store.byte_size(ty)).unwrap_or(0);
        Ok((offset, byte_size, ty))
    }

    /// Leading `RUST$ENUM$DISR` member of the first variant, if every union
    /// member is a struct that starts with one
    fn legacy_discriminant_member(
        &self,
        unit_index: usize,
        members: &[Entry<'_, '_>],
    ) -> TypeBridgeResult<Option<(usize, UnitOffset<usize>)>>
    {
        let mut first = None;
        for member in members {
            let Some(ty) = attr(member, constants::DW_AT_type)? else {
                return Ok(None);
            };
            let Some((variant_unit, variant_offset)) = self.resolve_reference(unit_index, ty.value()) else {
                return Ok(None);
            };
            let Some(unit) = self.units.get(variant_unit) else {
                return Ok(None);
            };
            let Some(leading) = Self::children(unit, variant_offset)?
                .into_iter()
                .find(|child| child.tag() == constants::DW_TAG_member)
            else {
                return Ok(None);
            };
            if self.string_attr(unit, &leading, constants::DW_AT_name)?.as_deref() != Some(LEGACY_DISCRIMINANT_NAME) {
                return Ok(None);
            }
            first.get_or_insert((variant_unit, leading.offset()));
        }
        Ok(first)
    }

    /// Import the type named by `entry`'s `DW_AT_type`, if it has one
    fn referenced_type(&self, state: &mut ImportState<'_>, unit_index: usize, entry: &Entry<'_, '_>, depth: usize) -> TypeBridgeResult<Option<TypeId>>
    {
        let Some(attr) = attr(entry, constants::DW_AT_type)? else {
            return Ok(None);
        };
        match self.resolve_reference(unit_index, attr.value()) {
            Some((target_unit, offset)) => self.import_type(state, target_unit, offset, depth + 1).map(Some),
            None => Ok(Some(TypeId::NULL)),
        }
    }

    fn resolve_reference(&self, unit_index: usize, value: AttributeValue<OwnedReader>) -> Option<(usize, UnitOffset<usize>)>
    {
        match value {
            AttributeValue::UnitRef(offset) => Some((unit_index, offset)),
            AttributeValue::DebugInfoRef(offset) => self.find_unit_for_offset(UnitSectionOffset::from(offset)),
            AttributeValue::DebugTypesRef(signature) => self.find_unit_for_signature(signature),
            _ => None,
        }
    }

    fn find_unit_for_offset(&self, target: UnitSectionOffset<usize>) -> Option<(usize, UnitOffset<usize>)>
    {
        self.units
            .iter()
            .enumerate()
            .find_map(|(index, unit)| target.to_unit_offset(unit).map(|offset| (index, offset)))
    }

    fn find_unit_for_signature(&self, signature: DebugTypeSignature) -> Option<(usize, UnitOffset<usize>)>
    {
        self.units.iter().enumerate().find_map(|(index, unit)| match unit.header.type_() {
            UnitType::Type {
                type_signature,
                type_offset,
            }
            | UnitType::SplitType {
                type_signature,
                type_offset,
            } if type_signature == signature => Some((index, type_offset)),
            _ => None,
        })
    }

    /// Direct children of the entry at `offset`
    fn children(unit: &Unit<OwnedReader>, offset: UnitOffset<usize>) -> TypeBridgeResult<Vec<Entry<'_, '_>>>
    {
        let mut entries = Vec::new();
        let mut tree = unit
            .entries_tree(Some(offset))
            .map_err(|err| map_dwarf_error("building entry tree", err))?;
        let root = tree.root().map_err(|err| map_dwarf_error("navigating entry root", err))?;
        let mut children = root.children();
        while let Some(child) = children
            .next()
            .map_err(|err| map_dwarf_error("iterating entry children", err))?
        {
            entries.push(child.entry().clone());
        }
        Ok(entries)
    }

    fn string_attr(&self, unit: &Unit<OwnedReader>, entry: &Entry<'_, '_>, name: DwAt) -> TypeBridgeResult<Option<String>>
    {
        let Some(attr) = attr(entry, name)? else {
            return Ok(None);
        };
        let reader = self
            .dwarf
            .attr_string(unit, attr.value())
            .map_err(|err| map_dwarf_error("resolving DWARF string", err))?;
        let owned = match reader.to_string() {
            Ok(cow) => cow.into_owned(),
            Err(_) => reader
                .to_string_lossy()
                .map_err(|err| map_dwarf_error("decoding DWARF string", err))?
                .into_owned(),
        };
        Ok(Some(owned))
    }
}

fn attr(entry: &Entry<'_, '_>, name: DwAt) -> TypeBridgeResult<Option<Attribute<OwnedReader>>>
{
    entry
        .attr(name)
        .map_err(|err| map_dwarf_error(&format!("reading {name}"), err))
}

fn udata_attr(entry: &Entry<'_, '_>, name: DwAt) -> TypeBridgeResult<Option<u64>>
{
    Ok(attr(entry, name)?.and_then(|attr| attr.udata_value()))
}

/// Discriminant of a legacy enum variant: the enumerator of the discriminant
/// type named after the variant, else the variant's position
fn legacy_discriminant_value(
    store: &TypeStore,
    discr_ty: Option<TypeId>,
    variant_name: &str,
    index: usize,
) -> u64
{
    let named = discr_ty
        .and_then(|ty| store.node(store.canonical_type(ty)))
        .and_then(|node| match node.kind() {
            TypeKind::CLikeEnum { values, .. } => values
                .iter()
                .find(|(_, name)| name.as_str() == variant_name)
                .map(|(value, _)| *value),
            _ => None,
        });
    named.unwrap_or_else(|| u64::try_from(index).unwrap_or(u64::MAX))
}

/// Constant as raw bits; negative values keep their two's complement form
fn attribute_to_u64(attr: &Attribute<OwnedReader>) -> Option<u64>
{
    attr.udata_value()
        .or_else(|| attr.sdata_value().map(|value| u64::from_ne_bytes(value.to_ne_bytes())))
}

fn member_offset(entry: &Entry<'_, '_>) -> TypeBridgeResult<u64>
{
    if let Some(bytes) = udata_attr(entry, constants::DW_AT_data_member_location)? {
        return Ok(bytes);
    }
    Ok(udata_attr(entry, constants::DW_AT_data_bit_offset)?.map_or(0, |bits| bits / 8))
}

fn subrange_length(entry: &Entry<'_, '_>) -> TypeBridgeResult<u64>
{
    if let Some(count) = udata_attr(entry, constants::DW_AT_count)? {
        return Ok(count);
    }
    let Some(upper) = attr(entry, constants::DW_AT_upper_bound)? else {
        return Ok(0);
    };
    // An upper bound of -1 marks an empty or unsized range.
    let Some(upper) = upper.udata_value() else {
        return Ok(0);
    };
    let lower = udata_attr(entry, constants::DW_AT_lower_bound)?.unwrap_or(0);
    Ok(upper.checked_sub(lower).map_or(0, |span| span.saturating_add(1)))
}

/// Tuples either carry a `(..)` name or number their fields `__0`, `__1`, ...
fn is_tuple_layout(name: &str, member_names: &[String]) -> bool
{
    if name.starts_with('(') {
        return true;
    }
    !member_names.is_empty()
        && member_names
            .iter()
            .filter(|member| member.as_str() != LEGACY_DISCRIMINANT_NAME)
            .enumerate()
            .all(|(index, member)| member.strip_prefix("__") == Some(index.to_string().as_str()))
}

fn is_type_tag(tag: gimli::DwTag) -> bool
{
    matches!(
        tag,
        constants::DW_TAG_base_type
            | constants::DW_TAG_pointer_type
            | constants::DW_TAG_reference_type
            | constants::DW_TAG_rvalue_reference_type
            | constants::DW_TAG_typedef
            | constants::DW_TAG_array_type
            | constants::DW_TAG_subroutine_type
            | constants::DW_TAG_enumeration_type
            | constants::DW_TAG_structure_type
            | constants::DW_TAG_class_type
            | constants::DW_TAG_union_type
    )
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_tuple_layout_detection()
    {
        let numbered = vec!["__0".to_string(), "__1".to_string()];
        assert!(is_tuple_layout("Some", &numbered));
        assert!(is_tuple_layout("(u8, u32)", &[]));
        assert!(!is_tuple_layout("Point", &["x".to_string(), "y".to_string()]));
        assert!(!is_tuple_layout("Empty", &[]));
        let legacy = vec![LEGACY_DISCRIMINANT_NAME.to_string(), "__0".to_string()];
        assert!(is_tuple_layout("Some", &legacy));
    }
}
