use crate::tag::Tag;
use crate::value::Value;

/// Ordered sequence of `(Tag, Value)` pairs: the in-memory form of a List.
///
/// Insertion order is significant, anonymous and repeated tags are allowed and
/// nothing is ever deduplicated. Pairs can be addressed by position with
/// [`TaggedList::get`] or by tag with [`TaggedList::by_tag`], which returns the
/// value of the first pair carrying that tag.
///
/// The list only grows: there is no removal or reordering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaggedList {
    items: Vec<(Tag, Value)>,
}

impl TaggedList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Appends a pair at the end of the list.
    pub fn push(&mut self, tag: impl Into<Tag>, value: impl Into<Value>) {
        self.items.push((tag.into(), value.into()));
    }

    /// The `index`-th pair.
    pub fn get(&self, index: usize) -> Option<&(Tag, Value)> {
        self.items.get(index)
    }

    /// Value of the first pair tagged `tag`.
    pub fn by_tag(&self, tag: impl Into<Tag>) -> Option<&Value> {
        let tag = tag.into();
        self.items.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    /// Values of every pair tagged `tag`, in list order.
    pub fn all_by_tag(&self, tag: impl Into<Tag>) -> impl Iterator<Item = &Value> + '_ {
        let tag = tag.into();
        self.items
            .iter()
            .filter(move |(t, _)| *t == tag)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Tag, Value)> {
        self.items.iter()
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.items.iter().map(|(t, _)| *t)
    }

    pub fn as_slice(&self) -> &[(Tag, Value)] {
        &self.items
    }
}

impl<T: Into<Tag>, V: Into<Value>> FromIterator<(T, V)> for TaggedList {
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        let mut list = TaggedList::new();
        list.extend(iter);
        list
    }
}

impl<T: Into<Tag>, V: Into<Value>> Extend<(T, V)> for TaggedList {
    fn extend<I: IntoIterator<Item = (T, V)>>(&mut self, iter: I) {
        for (tag, value) in iter {
            self.push(tag, value);
        }
    }
}

impl IntoIterator for TaggedList {
    type Item = (Tag, Value);
    type IntoIter = std::vec::IntoIter<(Tag, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a TaggedList {
    type Item = &'a (Tag, Value);
    type IntoIter = std::slice::Iter<'a, (Tag, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TaggedList {
        let mut list = TaggedList::new();
        list.push(Tag::Anonymous, 1i64);
        list.push(Tag::Anonymous, 2i64);
        list.push(1u8, 3i64);
        list.push(1u8, 4i64);
        list
    }

    #[test]
    fn positional_access() {
        let list = sample();
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(2), Some(&(Tag::Context(1), Value::Signed(3))));
        assert_eq!(list.get(4), None);
    }

    #[test]
    fn by_tag_returns_first_match() {
        let list = sample();
        assert_eq!(list.by_tag(1u8), Some(&Value::Signed(3)));
        assert_eq!(list.by_tag(Tag::Anonymous), Some(&Value::Signed(1)));
        assert_eq!(list.by_tag(9u8), None);
        assert_eq!(list.all_by_tag(1u8).count(), 2);
    }

    #[test]
    fn order_matters_for_equality() {
        let a: TaggedList = vec![(Tag::Anonymous, 1i64), (Tag::Context(1), 2i64)]
            .into_iter()
            .collect();
        let b: TaggedList = vec![(Tag::Context(1), 2i64), (Tag::Anonymous, 1i64)]
            .into_iter()
            .collect();
        assert_ne!(a, b);
    }
}
