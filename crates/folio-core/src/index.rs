//! Name and position lookup over a parsed block sequence.

use std::collections::HashMap;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::block::Block;

/// Owns the blocks of one loaded file plus a lowercase name map.
///
/// The map is populated once, in block order, and duplicates do not
/// overwrite earlier entries: repeated names (`## Notes` twice, say) keep
/// jumping to their first occurrence. Follow-mode mutation goes through
/// [`push`](BlockIndex::push) and [`replace`](BlockIndex::replace), which
/// patch the map as they go — there the most recent block wins its name.
#[derive(Debug, Default)]
pub struct BlockIndex {
    blocks: Vec<Block>,
    by_name: HashMap<String, usize>,
}

impl BlockIndex {
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut by_name = HashMap::new();
        for (i, block) in blocks.iter().enumerate() {
            by_name.entry(block.name.to_lowercase()).or_insert(i);
        }
        BlockIndex { blocks, by_name }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Bounds-checked positional access.
    pub fn get(&self, position: usize) -> Option<&Block> {
        self.blocks.get(position)
    }

    /// Position of a block by name: exact case-insensitive match first,
    /// then the earliest name containing the query as a substring, then
    /// the best fuzzy (subsequence) match. `None` when nothing scores.
    pub fn find(&self, query: &str) -> Option<usize> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        if let Some(&i) = self.by_name.get(&query) {
            return Some(i);
        }
        if let Some(i) = self
            .blocks
            .iter()
            .position(|b| b.name.to_lowercase().contains(&query))
        {
            return Some(i);
        }
        let matcher = SkimMatcherV2::default();
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| matcher.fuzzy_match(&b.name, &query).map(|score| (score, i)))
            .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, i)| i)
    }

    /// Position after the named block, `None` at the end or when the name
    /// is unknown.
    pub fn next(&self, current: &str) -> Option<usize> {
        let i = *self.by_name.get(&current.to_lowercase())?;
        (i + 1 < self.blocks.len()).then_some(i + 1)
    }

    /// Position before the named block, `None` at the start or when the
    /// name is unknown.
    pub fn prev(&self, current: &str) -> Option<usize> {
        let i = *self.by_name.get(&current.to_lowercase())?;
        i.checked_sub(1)
    }

    /// All block names in document order.
    pub fn names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name.as_str()).collect()
    }

    /// Append a block (follow mode: a new conversation turn). The new
    /// block takes over its name in the map.
    pub fn push(&mut self, block: Block) -> usize {
        let position = self.blocks.len();
        self.by_name.insert(block.name.to_lowercase(), position);
        self.blocks.push(block);
        position
    }

    /// Swap the block at `position` in place (follow mode: a turn grew).
    /// Returns false for out-of-range positions, which can happen when a
    /// rewrite races a full reload; stale rewrites are dropped.
    pub fn replace(&mut self, position: usize, block: Block) -> bool {
        let Some(slot) = self.blocks.get_mut(position) else {
            return false;
        };
        let old_key = slot.name.to_lowercase();
        if self.by_name.get(&old_key) == Some(&position) {
            self.by_name.remove(&old_key);
        }
        self.by_name.insert(block.name.to_lowercase(), position);
        *slot = block;
        true
    }

    /// Throw everything away and re-index (generic watched files, where a
    /// change reparses the whole file).
    pub fn rebuild(&mut self, blocks: Vec<Block>) {
        *self = BlockIndex::new(blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::SourceKind;

    fn named(names: &[&str]) -> BlockIndex {
        BlockIndex::new(
            names
                .iter()
                .map(|n| Block::from_content(*n, format!("content of {n}"), 0, SourceKind::Other))
                .collect(),
        )
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let index = named(&["Introduction", "Setup"]);
        assert_eq!(index.find("setup"), Some(1));
        assert_eq!(index.find("  SETUP  "), Some(1));
    }

    #[test]
    fn test_substring_match_earliest_wins() {
        let index = named(&["Install notes", "More notes"]);
        assert_eq!(index.find("notes"), Some(0));
    }

    #[test]
    fn test_fuzzy_match_falls_back_to_subsequence() {
        let index = named(&["Introduction", "Setup"]);
        // "into" is a subsequence of "Introduction", not a substring.
        assert_eq!(index.find("into"), Some(0));
        assert_eq!(index.find("zzz"), None);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let index = named(&["Notes", "Other", "Notes"]);
        assert_eq!(index.find("notes"), Some(0));
        // Neighbors of a duplicated name are relative to its first position.
        assert_eq!(index.next("notes"), Some(1));
        assert_eq!(index.prev("notes"), None);
    }

    #[test]
    fn test_next_prev_boundaries() {
        let index = named(&["a", "b", "c"]);
        assert_eq!(index.next("c"), None);
        assert_eq!(index.prev("a"), None);
        assert_eq!(index.next("missing"), None);
        assert_eq!(index.next("a"), Some(1));
        assert_eq!(index.prev("c"), Some(1));
    }

    #[test]
    fn test_get_is_bounds_checked() {
        let index = named(&["only"]);
        assert!(index.get(0).is_some());
        assert!(index.get(1).is_none());
    }

    #[test]
    fn test_push_upserts_name() {
        let mut index = named(&["block-1"]);
        let block = Block::from_content("block-1", "newer", 0, SourceKind::Chat);
        let position = index.push(block);
        assert_eq!(position, 1);
        // After an append, the most recent holder of the name wins.
        assert_eq!(index.find("block-1"), Some(1));
    }

    #[test]
    fn test_replace_swaps_in_place() {
        let mut index = named(&["block-1", "block-2"]);
        let grown = Block::from_content("block-2", "turn grew", 0, SourceKind::Chat);
        assert!(index.replace(1, grown));
        let block = index.get(1).unwrap();
        assert_eq!(block.content, "turn grew");
        assert_eq!(index.find("block-2"), Some(1));
        // Stale positions are ignored.
        let stale = Block::from_content("ghost", "x", 0, SourceKind::Chat);
        assert!(!index.replace(9, stale));
        assert_eq!(index.find("ghost"), None);
    }

    #[test]
    fn test_rebuild_resets_everything() {
        let mut index = named(&["old-a", "old-b"]);
        index.rebuild(vec![Block::from_content(
            "fresh",
            "text",
            0,
            SourceKind::Other,
        )]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.find("old-a"), None);
        assert_eq!(index.find("fresh"), Some(0));
    }

    #[test]
    fn test_names_in_document_order() {
        let index = named(&["z", "a", "m"]);
        assert_eq!(index.names(), vec!["z", "a", "m"]);
    }
}
