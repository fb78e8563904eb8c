//! Word document rendering for generated copy.
//!
//! The generated text arrives as light Markdown with optional
//! `[[TABLE_START]]`/`[[TABLE_END]]` sentinels around tabular data (the
//! prompt's structure rules). This module parses that into blocks and
//! renders one document section per platform with real Word headings,
//! bullet lists, and tables.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, Start, Style, StyleType, Table, TableCell, TableRow,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;
use crate::generation::pipeline::GenerationResult;

const TABLE_START: &str = "[[TABLE_START]]";
const TABLE_END: &str = "[[TABLE_END]]";
const BULLET_NUMBERING_ID: usize = 2;

/// Column splitter for space-aligned table rows.
static TABLE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("static regex"));

/// One structural element of a platform section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Markdown heading, level 1-3.
    Heading(u8, String),
    Bullet(String),
    /// Rows of cells, padded to the widest row.
    Table(Vec<Vec<String>>),
    Paragraph(String),
}

/// Builds the downloadable .docx: a document title, then one Heading1
/// section per platform in stable platform order with that platform's
/// copy parsed into blocks.
pub fn build_document(title: &str, outputs: &GenerationResult) -> Result<Vec<u8>, AppError> {
    if outputs.is_empty() {
        return Err(AppError::Formatting(
            "Nothing to render: the conversion produced no outputs".to_string(),
        ));
    }

    let mut docx = base_document();

    docx = docx.add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(title))
            .style("Title"),
    );

    for (platform, text) in outputs {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(platform.display_name()))
                .style("Heading1"),
        );
        for block in parse_blocks(text) {
            docx = append_block(docx, block);
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| AppError::Formatting(format!("Could not pack .docx: {e}")))?;

    Ok(cursor.into_inner())
}

/// Document skeleton: heading styles plus the bullet-list numbering.
fn base_document() -> Docx {
    Docx::new()
        .add_style(
            Style::new("Title", StyleType::Paragraph)
                .name("Title")
                .size(40)
                .bold(),
        )
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_style(
            Style::new("Heading2", StyleType::Paragraph)
                .name("Heading 2")
                .size(28)
                .bold(),
        )
        .add_style(
            Style::new("Heading3", StyleType::Paragraph)
                .name("Heading 3")
                .size(24)
                .bold(),
        )
        .add_abstract_numbering(
            AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(Level::new(
                0,
                Start::new(1),
                NumberFormat::new("bullet"),
                LevelText::new("•"),
                LevelJc::new("left"),
            )),
        )
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
}

fn append_block(docx: Docx, block: Block) -> Docx {
    match block {
        Block::Heading(level, text) => {
            // Platform names take Heading1, so in-copy headings start one
            // level down.
            let style = match level {
                1 => "Heading2",
                _ => "Heading3",
            };
            docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(text))
                    .style(style),
            )
        }
        Block::Bullet(text) => docx.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(text))
                .numbering(
                    NumberingId::new(BULLET_NUMBERING_ID),
                    IndentLevel::new(0),
                ),
        ),
        Block::Table(rows) => {
            let table_rows = rows
                .into_iter()
                .map(|cells| {
                    TableRow::new(
                        cells
                            .into_iter()
                            .map(|cell| {
                                TableCell::new().add_paragraph(
                                    Paragraph::new().add_run(Run::new().add_text(cell)),
                                )
                            })
                            .collect(),
                    )
                })
                .collect();
            docx.add_table(Table::new(table_rows))
        }
        Block::Paragraph(text) => {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
        }
    }
}

/// Splits generated text into blocks: table-sentinel regions become tables,
/// everything else is parsed line by line.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(TABLE_START) {
        parse_lines(&rest[..start], &mut blocks);
        let after_tag = &rest[start + TABLE_START.len()..];
        match after_tag.find(TABLE_END) {
            Some(end) => {
                push_table(&after_tag[..end], &mut blocks);
                rest = &after_tag[end + TABLE_END.len()..];
            }
            None => {
                // Unterminated sentinel: treat the remainder as a table
                // rather than leaking the raw tag into the document.
                push_table(after_tag, &mut blocks);
                rest = "";
            }
        }
    }
    parse_lines(rest, &mut blocks);

    blocks
}

fn parse_lines(segment: &str, blocks: &mut Vec<Block>) {
    for line in segment.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(text) = line.strip_prefix("### ") {
            blocks.push(Block::Heading(3, text.trim().to_string()));
        } else if let Some(text) = line.strip_prefix("## ") {
            blocks.push(Block::Heading(2, text.trim().to_string()));
        } else if let Some(text) = line.strip_prefix("# ") {
            blocks.push(Block::Heading(1, text.trim().to_string()));
        } else if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            blocks.push(Block::Bullet(text.trim().to_string()));
        } else {
            blocks.push(Block::Paragraph(line.to_string()));
        }
    }
}

fn push_table(raw: &str, blocks: &mut Vec<Block>) {
    let rows = parse_table(raw);
    if rows.is_empty() {
        // Malformed table content degrades to plain lines, never lost.
        parse_lines(raw, blocks);
    } else {
        blocks.push(Block::Table(rows));
    }
}

/// Parses sentinel-wrapped table text into rows of cells.
/// Cells split on '|' when present, otherwise on runs of 2+ spaces.
/// Ruling lines (only pipes, dashes, colons, spaces) are skipped and all
/// rows are padded to the widest row.
pub fn parse_table(raw: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || is_ruling_line(line) {
            continue;
        }

        let cells: Vec<String> = if line.contains('|') {
            line.split('|')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect()
        } else {
            TABLE_SPLIT
                .split(line)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect()
        };

        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if let Some(max_cols) = rows.iter().map(Vec::len).max() {
        for row in &mut rows {
            row.resize(max_cols, String::new());
        }
    }

    rows
}

fn is_ruling_line(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::platform::Platform;

    fn outputs_with(platform: Platform, text: &str) -> GenerationResult {
        let mut outputs = GenerationResult::new();
        outputs.insert(platform, text.to_string());
        outputs
    }

    #[test]
    fn test_parse_blocks_headings_bullets_paragraphs() {
        let text = "# Big headline\nOpening paragraph.\n## Detail\n- first point\n* second point";
        let blocks = parse_blocks(text);
        assert_eq!(
            blocks,
            vec![
                Block::Heading(1, "Big headline".into()),
                Block::Paragraph("Opening paragraph.".into()),
                Block::Heading(2, "Detail".into()),
                Block::Bullet("first point".into()),
                Block::Bullet("second point".into()),
            ]
        );
    }

    #[test]
    fn test_parse_blocks_extracts_sentinel_table() {
        let text = "Intro line\n[[TABLE_START]]\nMetric | Q3 | Q4\n--- | --- | ---\nRevenue | 10 | 12\n[[TABLE_END]]\nClosing line";
        let blocks = parse_blocks(text);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], Block::Paragraph("Intro line".into()));
        assert_eq!(
            blocks[1],
            Block::Table(vec![
                vec!["Metric".to_string(), "Q3".to_string(), "Q4".to_string()],
                vec!["Revenue".to_string(), "10".to_string(), "12".to_string()],
            ])
        );
        assert_eq!(blocks[2], Block::Paragraph("Closing line".into()));
    }

    #[test]
    fn test_parse_blocks_unterminated_table_keeps_content() {
        let text = "[[TABLE_START]]\nA | B\n1 | 2";
        let blocks = parse_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::Table(_)));
    }

    #[test]
    fn test_parse_table_pads_ragged_rows() {
        let rows = parse_table("Name | Value | Note\nCash | 40\n");
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1], vec!["Cash".to_string(), "40".to_string(), String::new()]);
    }

    #[test]
    fn test_parse_table_splits_on_wide_spaces() {
        let rows = parse_table("Metric    Q3    Q4\nRevenue    10    12");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Metric", "Q3", "Q4"]);
    }

    #[test]
    fn test_build_document_produces_docx_bytes() {
        let outputs = outputs_with(
            Platform::LinkedIn,
            "# Headline\nBody text.\n- a point\n[[TABLE_START]]\nA | B\n1 | 2\n[[TABLE_END]]",
        );
        let bytes = build_document("report.pdf", &outputs).unwrap();
        // .docx is a zip container.
        assert_eq!(&bytes[..2], &b"PK"[..]);
    }

    #[test]
    fn test_build_document_rejects_empty_outputs() {
        let err = build_document("report.pdf", &GenerationResult::new()).unwrap_err();
        assert!(matches!(err, AppError::Formatting(_)));
    }

    #[test]
    fn test_section_text_survives_verbatim_in_blocks() {
        let text = "Exactly this sentence, word for word.";
        let blocks = parse_blocks(text);
        assert_eq!(blocks, vec![Block::Paragraph(text.into())]);
    }
}
