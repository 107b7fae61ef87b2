// SPDX-License-Identifier: AGPL-3.0-or-later
//! Book promotion
//!
//! A document with more than one top-level (level 1) heading is a multi-part
//! document. It becomes an AsciiDoc book: `:doctype: book` is declared and
//! every section heading moves down one level.

use crate::ast::Block;
use std::collections::BTreeSet;

/// Outcome of scanning the top-level blocks, decided once per document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Structure {
    /// Distinct heading levels among the top-level blocks
    pub levels: BTreeSet<u8>,
    /// Number of level 1 headings among the top-level blocks
    pub parts: usize,
    /// Added to every section heading level
    pub level_offset: u8,
}

impl Structure {
    /// Read-only scan of the top-level blocks. Nested headings (inside quotes,
    /// lists, ...) do not take part in the decision.
    pub fn scan(blocks: &[Block]) -> Self {
        let mut levels = BTreeSet::new();
        let mut parts = 0;
        for block in blocks {
            if let Block::Heading { level, .. } = block {
                levels.insert(*level);
                if *level == 1 {
                    parts += 1;
                }
            }
        }

        let level_offset = u8::from(parts > 1);
        if level_offset > 0 {
            tracing::debug!(parts, ?levels, "promoting multi-part document to book");
        }

        Self {
            levels,
            parts,
            level_offset,
        }
    }

    pub fn is_book(&self) -> bool {
        self.level_offset > 0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ast::Inline;
    use proptest::prelude::*;

    fn block_strategy() -> impl Strategy<Value = Block> {
        prop_oneof![
            (1u8..=6).prop_map(|level| Block::Heading {
                level,
                content: vec![],
                id: None,
                span: None,
            }),
            Just(Block::Paragraph {
                content: vec![Inline::Text { content: "x".to_string() }],
                span: None,
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_book_iff_more_than_one_part(blocks in prop::collection::vec(block_strategy(), 0..12)) {
            let parts = blocks
                .iter()
                .filter(|b| matches!(b, Block::Heading { level: 1, .. }))
                .count();
            let structure = Structure::scan(&blocks);
            prop_assert_eq!(structure.parts, parts);
            prop_assert_eq!(structure.is_book(), parts > 1);
            prop_assert!(structure.level_offset <= 1);
        }
    }
}
