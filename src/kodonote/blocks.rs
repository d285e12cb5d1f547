//! # Block Sequence
//!
//! The body of a notebook: an ordered run of [`ContentBlock`]s. Order is render
//! order, so the only structural edits are at the tail. `append` and
//! `remove_last` never shift an earlier block, and `set_value` only ever touches
//! the payload of one block.

use crate::error::{KodoError, Result};
use crate::model::{ContentBlock, SectionType};
use serde::{Deserialize, Serialize};
use std::ops::Index;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blocks(Vec<ContentBlock>);

impl Blocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an empty block of the given type onto the tail.
    pub fn append(&mut self, section_type: SectionType) {
        self.0.push(ContentBlock::new(section_type));
    }

    /// Drops the tail block. An empty sequence stays empty.
    pub fn remove_last(&mut self) -> Option<ContentBlock> {
        self.0.pop()
    }

    /// Replaces the payload of the block at `index`.
    ///
    /// Callers only pass indexes they just rendered, so an out of range index
    /// is a caller bug. It is still reported rather than panicking.
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        let len = self.0.len();
        let block = self
            .0
            .get_mut(index)
            .ok_or(KodoError::IndexOutOfRange { index, len })?;
        block.value = value.into();
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&ContentBlock> {
        self.0.get(index)
    }

    pub fn last(&self) -> Option<&ContentBlock> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentBlock> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ContentBlock] {
        &self.0
    }
}

impl Index<usize> for Blocks {
    type Output = ContentBlock;

    fn index(&self, index: usize) -> &ContentBlock {
        &self.0[index]
    }
}

impl From<Vec<ContentBlock>> for Blocks {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        Self(blocks)
    }
}

impl FromIterator<ContentBlock> for Blocks {
    fn from_iter<I: IntoIterator<Item = ContentBlock>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Blocks {
    type Item = &'a ContentBlock;
    type IntoIter = std::slice::Iter<'a, ContentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: &[(SectionType, &str)]) -> Blocks {
        values
            .iter()
            .map(|(t, v)| ContentBlock::with_value(*t, *v))
            .collect()
    }

    #[test]
    fn append_adds_empty_block_at_tail() {
        let mut blocks = Blocks::new();
        blocks.append(SectionType::Code);
        blocks.append(SectionType::Text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].section_type(), SectionType::Code);
        assert_eq!(blocks[1].section_type(), SectionType::Text);
        assert!(blocks.iter().all(|b| b.value.is_empty()));
    }

    #[test]
    fn remove_last_on_empty_is_noop() {
        let mut blocks = Blocks::new();
        assert!(blocks.remove_last().is_none());
        assert!(blocks.remove_last().is_none());
        assert!(blocks.is_empty());
    }

    #[test]
    fn remove_last_keeps_survivors_in_order() {
        let mut blocks = filled(&[
            (SectionType::Code, "a"),
            (SectionType::Text, "b"),
            (SectionType::Code, "c"),
        ]);

        let removed = blocks.remove_last().unwrap();
        assert_eq!(removed.value, "c");
        blocks.remove_last();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], ContentBlock::with_value(SectionType::Code, "a"));
    }

    #[test]
    fn length_tracks_appends_minus_removals() {
        // a = append, r = remove; more removals than appends at times
        let script = "aarrraaararaaarrrrrra";
        let mut blocks = Blocks::new();
        let mut expected: Vec<usize> = Vec::new();
        let mut next = 0usize;

        for op in script.chars() {
            if op == 'a' {
                blocks.append(SectionType::Text);
                let last = blocks.len() - 1;
                blocks.set_value(last, next.to_string()).unwrap();
                expected.push(next);
                next += 1;
            } else {
                blocks.remove_last();
                expected.pop();
            }
            assert_eq!(blocks.len(), expected.len());
        }

        let values: Vec<String> = blocks.iter().map(|b| b.value.clone()).collect();
        let expected: Vec<String> = expected.iter().map(|n| n.to_string()).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn set_value_touches_only_target() {
        let mut blocks = filled(&[
            (SectionType::Code, "one"),
            (SectionType::Text, "two"),
            (SectionType::Code, "three"),
        ]);
        let before = blocks.clone();

        blocks.set_value(1, "changed").unwrap();

        assert_eq!(blocks[1].value, "changed");
        assert_eq!(blocks[1].section_type(), SectionType::Text);
        assert_eq!(blocks[0], before[0]);
        assert_eq!(blocks[2], before[2]);
    }

    #[test]
    fn set_value_out_of_range_is_reported() {
        let mut blocks = filled(&[(SectionType::Code, "x")]);
        let err = blocks.set_value(3, "nope").unwrap_err();
        assert!(matches!(
            err,
            KodoError::IndexOutOfRange { index: 3, len: 1 }
        ));
        assert_eq!(blocks[0].value, "x");
    }

    #[test]
    fn serializes_as_plain_array() {
        let blocks = filled(&[(SectionType::Code, "print(1)"), (SectionType::Text, "notes")]);
        let json = serde_json::to_value(&blocks).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"sectionType": "code", "value": "print(1)"},
                {"sectionType": "text", "value": "notes"}
            ])
        );
    }
}
