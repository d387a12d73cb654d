//! Deterministic plugin ordering from partial preference lists.
//!
//! [`resolve`] is a stable partition rather than a topological sort. Items
//! whose id appears in the preference list come first, in preference order;
//! every other item follows in discovery order. The two groups are never
//! interleaved. Because a preference list is a sequence and not a dependency
//! graph, cycles cannot occur.
//!
//! | Input                                  | Effect                         |
//! |----------------------------------------|--------------------------------|
//! | preferred id not discovered            | ignored                        |
//! | id repeated in the preference list     | first occurrence wins          |
//! | discovered id not in the list          | appended in discovery order    |

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::descriptor::PluginDescriptor;

/// Anything carrying a stable plugin identifier.
pub trait Identified {
    /// Returns the identifier used for ordering.
    fn id(&self) -> &str;
}

impl Identified for PluginDescriptor {
    fn id(&self) -> &str {
        PluginDescriptor::id(self)
    }
}

impl Identified for String {
    fn id(&self) -> &str {
        self.as_str()
    }
}

impl Identified for str {
    fn id(&self) -> &str {
        self
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
}

/// Total execution order produced by [`resolve`].
///
/// Always a permutation of the discovered items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder<T> {
    items: Vec<T>,
}

impl<T> ResolvedOrder<T> {
    /// Returns the ordered items.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterates over the ordered items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Number of ordered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when nothing was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the order, returning the items.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Identified> ResolvedOrder<T> {
    /// Iterates over the ordered identifiers.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Identified::id)
    }
}

impl<T> IntoIterator for ResolvedOrder<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResolvedOrder<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Orders `discovered` against the `preferred` id list.
///
/// # Example
///
/// ```
/// use orimath_plugins::order::resolve;
///
/// let order = resolve(["A", "B", "C", "D"], &["C", "A"]);
/// assert_eq!(order.into_vec(), ["C", "A", "B", "D"]);
/// ```
pub fn resolve<I, S>(discovered: I, preferred: &[S]) -> ResolvedOrder<I::Item>
where
    I: IntoIterator,
    I::Item: Identified,
    S: AsRef<str>,
{
    let mut ranks: HashMap<&str, usize> = HashMap::with_capacity(preferred.len());
    for (rank, id) in preferred.iter().enumerate() {
        if let Entry::Vacant(slot) = ranks.entry(id.as_ref()) {
            slot.insert(rank);
        }
    }

    let mut ranked = Vec::new();
    let mut remainder = Vec::new();
    for item in discovered {
        match ranks.get(item.id()).copied() {
            Some(rank) => ranked.push((rank, item)),
            None => remainder.push(item),
        }
    }

    // Stable: items sharing a rank keep discovery order.
    ranked.sort_by_key(|(rank, _)| *rank);

    let mut items = Vec::with_capacity(ranked.len() + remainder.len());
    items.extend(ranked.into_iter().map(|(_, item)| item));
    items.extend(remainder);
    ResolvedOrder { items }
}
