//! Text extraction from various file formats

use crate::error::{CvRankerError, Result};
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild,
    TableRowChild,
};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let display = path.display().to_string();

        // The parser can panic on malformed input, so it runs on its own thread.
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                CvRankerError::PdfExtraction(format!("PDF parser aborted on '{}': {}", display, e))
            })?
            .map_err(|e| {
                CvRankerError::PdfExtraction(format!(
                    "Failed to extract text from PDF '{}': {}",
                    display, e
                ))
            })
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let display = path.display().to_string();

        tokio::task::spawn_blocking(move || {
            docx_rs::read_docx(&bytes)
                .map(|docx| docx_text(&docx))
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| {
            CvRankerError::DocxExtraction(format!("DOCX reader aborted on '{}': {}", display, e))
        })?
        .map_err(|e| {
            CvRankerError::DocxExtraction(format!(
                "Failed to extract text from DOCX '{}': {}",
                display, e
            ))
        })
    }
}

/// One line per paragraph; table cells are flattened in reading order.
fn docx_text(docx: &docx_rs::Docx) -> String {
    let mut lines = Vec::new();

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => lines.push(paragraph_text(paragraph)),
            DocumentChild::Table(table) => {
                for row in &table.rows {
                    #[allow(irrefutable_let_patterns)]
                    let TableChild::TableRow(row) = row else { continue };
                    for cell in &row.cells {
                        #[allow(irrefutable_let_patterns)]
                        let TableRowChild::TableCell(cell) = cell else { continue };
                        for content in &cell.children {
                            if let TableCellContent::Paragraph(paragraph) = content {
                                lines.push(paragraph_text(paragraph));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    lines.join("\n")
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    _ => {}
                }
            }
        }
    }
    text
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run, Table, TableCell, TableRow};
    use std::io::Cursor;

    fn write_docx(path: &Path, docx: Docx) {
        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        std::fs::write(path, buffer.into_inner()).unwrap();
    }

    #[tokio::test]
    async fn test_docx_paragraphs_and_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");

        let docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Roe")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Senior Python engineer")))
            .add_table(Table::new(vec![TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Docker"))),
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("AWS"))),
            ])]));
        write_docx(&path, docx);

        let text = DocxExtractor.extract(&path).await.unwrap();
        assert!(text.contains("Jane Roe"));
        assert!(text.contains("Senior Python engineer"));
        assert!(text.contains("Docker"));
        assert!(text.contains("AWS"));
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = DocxExtractor.extract(&path).await.unwrap_err();
        assert!(matches!(err, CvRankerError::DocxExtraction(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfExtractor.extract(&path).await.unwrap_err();
        assert!(matches!(err, CvRankerError::PdfExtraction(_)));
    }

    #[tokio::test]
    async fn test_plain_text_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        assert!(PlainTextExtractor.extract(&path).await.is_err());
    }
}
