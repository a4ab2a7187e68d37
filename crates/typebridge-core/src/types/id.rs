//! Type handles.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_STORE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a [`TypeStore`](crate::store::TypeStore)
///
/// Every store gets a fresh id from a process-wide counter. Handles carry the
/// id of the store that minted them so a store can recognise (and refuse)
/// handles that belong to another store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreId(u32);

impl StoreId
{
    /// Store id carried by [`TypeId::NULL`]; never assigned to a real store.
    pub const NONE: Self = StoreId(0);

    pub(crate) fn allocate() -> Self
    {
        StoreId(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id
    #[must_use]
    pub const fn value(self) -> u32
    {
        self.0
    }
}

/// Handle to a type node owned by a [`TypeStore`](crate::store::TypeStore)
///
/// Handles are cheap to copy and stay valid for as long as the store lives.
/// They compare equal only when they name the same node of the same store;
/// two structurally identical types created separately get distinct handles.
///
/// The null handle ([`TypeId::NULL`]) is the "invalid type": every query on
/// it returns a neutral answer.
///
/// ## Example
///
/// ```rust
/// use typebridge_core::store::TypeStore;
/// use typebridge_core::types::TypeId;
///
/// let mut store = TypeStore::new(8);
/// let a = store.create_bool_type("bool");
/// let b = store.create_bool_type("bool");
/// assert_ne!(a, b);
/// assert!(!TypeId::NULL.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId
{
    store: StoreId,
    index: u32,
}

impl TypeId
{
    /// The invalid type handle
    pub const NULL: Self = TypeId {
        store: StoreId::NONE,
        index: 0,
    };

    pub(crate) const fn new(store: StoreId, index: u32) -> Self
    {
        TypeId { store, index }
    }

    /// Whether this handle could name a node (it is not [`TypeId::NULL`])
    ///
    /// A non-null handle can still be unknown to a particular store; use
    /// [`TypeStore::is_valid`](crate::store::TypeStore::is_valid) for that.
    #[must_use]
    pub const fn is_valid(self) -> bool
    {
        self.store.0 != StoreId::NONE.0
    }

    /// Store that minted this handle
    #[must_use]
    pub const fn store(self) -> StoreId
    {
        self.store
    }

    /// Position of the node inside its store
    #[must_use]
    pub const fn index(self) -> u32
    {
        self.index
    }
}

impl Default for TypeId
{
    fn default() -> Self
    {
        TypeId::NULL
    }
}

impl fmt::Display for TypeId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.is_valid() {
            write!(f, "type#{}.{}", self.store.0, self.index)
        } else {
            f.write_str("type#null")
        }
    }
}
