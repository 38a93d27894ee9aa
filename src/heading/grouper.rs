//! Groups a page's blocks into logical lines.

use std::collections::BTreeMap;

use crate::model::{Block, Line};

/// Merge text blocks sharing a top edge (to one decimal place) into lines.
///
/// Lines come out in ascending vertical order; blocks within a line keep
/// their provided order. Non-text blocks and blank lines are dropped.
pub fn group_lines(page: u32, blocks: &[Block]) -> Vec<Line> {
    let mut rows: BTreeMap<i64, Vec<&Block>> = BTreeMap::new();
    for block in blocks.iter().filter(|b| b.is_text()) {
        if !block.bbox.y0.is_finite() {
            log::debug!("page {}: skipping block with invalid position", page);
            continue;
        }
        rows.entry(row_key(block.bbox.y0)).or_default().push(block);
    }

    rows.into_iter()
        .filter_map(|(key, row)| {
            let text = row
                .iter()
                .map(|b| b.flat_text())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if text.is_empty() {
                return None;
            }
            let first = row[0];
            Some(Line {
                text,
                page,
                y: key as f32 / 10.0,
                x0: first.bbox.x0,
                spans: first.spans.clone(),
            })
        })
        .collect()
}

fn row_key(y: f32) -> i64 {
    (f64::from(y) * 10.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Span};

    fn block(x0: f32, y0: f32, text: &str) -> Block {
        Block::text(
            BBox::new(x0, y0, x0 + 100.0, y0 + 12.0),
            text,
            vec![Span::new(text, "Helvetica", 12.0)],
        )
    }

    #[test]
    fn test_same_row_blocks_join() {
        let blocks = vec![
            block(72.0, 100.02, "Chapter"),
            block(200.0, 100.04, " One\n"),
            block(72.0, 140.0, "Body text"),
        ];
        let lines = group_lines(2, &blocks);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Chapter One");
        assert_eq!(lines[0].x0, 72.0);
        assert_eq!(lines[0].spans[0].text, "Chapter");
        assert_eq!(lines[0].page, 2);
        assert_eq!(lines[1].text, "Body text");
    }

    #[test]
    fn test_lines_sorted_by_position() {
        let blocks = vec![block(72.0, 300.0, "Lower"), block(72.0, 50.0, "Upper")];
        let lines = group_lines(3, &blocks);
        assert_eq!(lines[0].text, "Upper");
        assert_eq!(lines[1].text, "Lower");
        assert_eq!(lines[0].y, 50.0);
    }

    #[test]
    fn test_multiline_block_flattened() {
        let lines = group_lines(2, &[block(72.0, 10.0, "first\nsecond")]);
        assert_eq!(lines[0].text, "first second");
    }

    #[test]
    fn test_skips_images_and_blank_rows() {
        let blocks = vec![
            Block::image(BBox::new(0.0, 10.0, 100.0, 100.0)),
            block(72.0, 20.0, "   "),
            block(72.0, 30.0, "Kept"),
        ];
        let lines = group_lines(2, &blocks);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Kept");
    }
}
