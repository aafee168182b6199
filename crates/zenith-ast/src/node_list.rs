// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Child sequences with inline storage.
//!
//! Most argument lists, annotation lists and template argument lists hold
//! zero to four entries. `NodeList` keeps up to four children inline and
//! moves them to the heap on the fifth push. Consumers only see it as a
//! slice through `Deref`.
//!
//! Lists whose element type can contain the list's owner (an `Expr` inside
//! call arguments, a `Type` inside template arguments) hold `Box`ed
//! elements so the inline array has a fixed size.

use std::fmt;
use std::ops::{Deref, DerefMut};

use smallvec::SmallVec;

/// Inline capacity before spilling to the heap.
const INLINE: usize = 4;

#[derive(Clone, PartialEq)]
pub struct NodeList<T>(SmallVec<[T; INLINE]>);

impl<T> NodeList<T> {
    pub fn new() -> Self {
        NodeList(SmallVec::new())
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    /// True once the list has outgrown its inline storage.
    pub fn spilled(&self) -> bool {
        self.0.spilled()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0.into_vec()
    }
}

impl<T> Default for NodeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for NodeList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> DerefMut for NodeList<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for NodeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        NodeList(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for NodeList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<T> IntoIterator for NodeList<T> {
    type Item = T;
    type IntoIter = smallvec::IntoIter<[T; INLINE]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NodeList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for NodeList<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_inline_up_to_four() {
        let mut list: NodeList<i32> = NodeList::new();
        assert!(list.is_empty());
        for i in 0..4 {
            list.push(i);
            assert!(!list.spilled());
        }
        assert_eq!(&*list, &[0, 1, 2, 3]);
    }

    #[test]
    fn spills_on_fifth_push() {
        let mut list: NodeList<String> = (0..4).map(|i| i.to_string()).collect();
        list.push("4".to_string());
        assert!(list.spilled());
        list.push("5".to_string());
        assert_eq!(list.len(), 6);
        assert_eq!(list[5], "5");
        assert_eq!(list.into_vec(), vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn slice_api_and_mutation() {
        let mut list: NodeList<i32> = [3, 1, 2].into_iter().collect();
        list.sort();
        assert_eq!(list.first(), Some(&1));
        assert_eq!(list.iter().sum::<i32>(), 6);
        list[0] = 10;
        assert_eq!(list.clone(), [10, 2, 3].into_iter().collect::<NodeList<i32>>());
        assert_eq!(format!("{:?}", list), "[10, 2, 3]");
    }

    #[test]
    fn boxed_elements_deref_to_the_node() {
        let list: NodeList<Box<String>> = ["a", "bc"].into_iter().map(|s| Box::new(s.to_string())).collect();
        let lens: Vec<usize> = list.iter().map(|s| s.len()).collect();
        assert_eq!(lens, [1, 2]);
    }
}
