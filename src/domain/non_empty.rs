//! Vector that always holds at least one element

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::ops::Deref;

/// An ordered list with at least one element.
///
/// Serializes as a plain JSON array and refuses to deserialize an empty one,
/// so a persisted record keeps the same guarantee as an extracted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyVec<T>(Vec<T>);

impl<T> NonEmptyVec<T> {
    /// Build from a head element and the remaining elements
    pub fn new(head: T, tail: Vec<T>) -> Self {
        let mut items = Vec::with_capacity(tail.len() + 1);
        items.push(head);
        items.extend(tail);
        Self(items)
    }

    /// Single-element list
    pub fn of(item: T) -> Self {
        Self(vec![item])
    }

    /// Returns `None` when `items` is empty
    pub fn from_vec(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn first(&self) -> &T {
        &self.0[0]
    }

    pub fn map<U, F>(self, f: F) -> NonEmptyVec<U>
    where
        F: FnMut(T) -> U,
    {
        NonEmptyVec(self.0.into_iter().map(f).collect())
    }

    /// Like [`NonEmptyVec::map`], also passing each element's position
    pub fn map_indexed<U, F>(self, mut f: F) -> NonEmptyVec<U>
    where
        F: FnMut(usize, T) -> U,
    {
        NonEmptyVec(
            self.0
                .into_iter()
                .enumerate()
                .map(|(index, item)| f(index, item))
                .collect(),
        )
    }

    /// Split into the head element and the (possibly empty) rest
    pub fn split_first(self) -> (T, Vec<T>) {
        let mut items = self.0;
        let head = items.remove(0);
        (head, items)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for NonEmptyVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> IntoIterator for NonEmptyVec<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NonEmptyVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> From<NonEmptyVec<T>> for Vec<T> {
    fn from(value: NonEmptyVec<T>) -> Self {
        value.0
    }
}

impl<T: Serialize> Serialize for NonEmptyVec<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NonEmptyVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::from_vec(items).ok_or_else(|| de::Error::invalid_length(0, &"at least one element"))
    }
}
