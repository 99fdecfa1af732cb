//! Tabular export of `Choice` records as CSV or XLSX.
//!
//! Both formats share one header row and one cell renderer, so a CSV and an
//! XLSX built from the same records always carry the same cells in the same
//! order. The XLSX workbook is assembled by hand (one sheet, inline strings)
//! and zipped with the `zip` crate.

use std::io::{Cursor, Write};

use time::UtcOffset;
use tracing::debug;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::error::ExportError;
use super::format::format_event_time;
use super::platform;
use super::records::{Choice, ChoiceField};

/// Rows encoded between two yields to the event loop.
pub const CHUNK_ROWS: usize = 500;

/// Excel's hard limit on the length of a single cell.
pub const MAX_CELL_CHARS: usize = 32_767;

pub const SHEET_NAME: &str = "Choix";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Xlsx, ExportFormat::Csv];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "XLSX",
        }
    }

    pub fn filename(self, basename: &str) -> String {
        format!("{basename}.{}", self.extension())
    }
}

/// An encoded export, ready to hand to the platform download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Header row; identical for both formats and never localized.
pub fn header() -> [&'static str; 5] {
    ChoiceField::ALL.map(ChoiceField::label)
}

/// Turns a record into its five exported cells.
#[derive(Debug, Clone, Copy)]
pub struct CellRenderer {
    offset: UtcOffset,
}

impl CellRenderer {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Cells in header order. The video cell keeps the full path.
    pub fn row(&self, choice: &Choice) -> Result<[String; 5], ExportError> {
        Ok([
            choice.id.clone(),
            choice.choix.clone(),
            choice.machine.clone(),
            choice.video.clone(),
            format_event_time(choice.event_time, self.offset)?,
        ])
    }
}

/// Encodes `choices` in the given order, blocking until done.
pub fn encode(
    format: ExportFormat,
    choices: &[Choice],
    offset: UtcOffset,
    basename: &str,
) -> Result<ExportFile, ExportError> {
    let renderer = CellRenderer::new(offset);
    let mut encoder = Encoder::new(format);
    for (index, choice) in choices.iter().enumerate() {
        encoder.push_row(index, &renderer.row(choice)?)?;
    }
    finish(format, encoder, basename, choices.len())
}

/// Same output as [`encode`], yielding every [`CHUNK_ROWS`] rows so the UI
/// stays responsive on large tables.
pub async fn encode_yielding(
    format: ExportFormat,
    choices: &[Choice],
    offset: UtcOffset,
    basename: &str,
) -> Result<ExportFile, ExportError> {
    let renderer = CellRenderer::new(offset);
    let mut encoder = Encoder::new(format);
    for (chunk_index, chunk) in choices.chunks(CHUNK_ROWS).enumerate() {
        for (index, choice) in chunk.iter().enumerate() {
            encoder.push_row(chunk_index * CHUNK_ROWS + index, &renderer.row(choice)?)?;
        }
        platform::yield_now().await;
    }
    finish(format, encoder, basename, choices.len())
}

fn finish(
    format: ExportFormat,
    encoder: Encoder,
    basename: &str,
    rows: usize,
) -> Result<ExportFile, ExportError> {
    let bytes = encoder.finish()?;
    debug!(format = format.label(), rows, size = bytes.len(), "export encoded");
    Ok(ExportFile {
        filename: format.filename(basename),
        mime: format.mime(),
        bytes,
    })
}

enum Encoder {
    Csv(String),
    Xlsx(String),
}

impl Encoder {
    fn new(format: ExportFormat) -> Self {
        let header = header();
        match format {
            ExportFormat::Csv => {
                let mut out = String::new();
                push_csv_line(&mut out, &header);
                Encoder::Csv(out)
            }
            ExportFormat::Xlsx => {
                let mut out = String::from(SHEET_PROLOGUE);
                push_sheet_row(&mut out, 1, &header, Some(HEADER_STYLE));
                Encoder::Xlsx(out)
            }
        }
    }

    /// `index` is the 0-based data row, used for error reporting.
    fn push_row(&mut self, index: usize, cells: &[String; 5]) -> Result<(), ExportError> {
        match self {
            Encoder::Csv(out) => {
                push_csv_line(out, cells);
                Ok(())
            }
            Encoder::Xlsx(out) => {
                for (column, cell) in ChoiceField::ALL.iter().zip(cells) {
                    check_cell(index + 1, column.label(), cell)?;
                }
                push_sheet_row(out, index + 2, cells, None);
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        match self {
            Encoder::Csv(out) => Ok(out.into_bytes()),
            Encoder::Xlsx(mut sheet) => {
                sheet.push_str(SHEET_EPILOGUE);
                write_workbook(&sheet)
            }
        }
    }
}

fn push_csv_line<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    let line = cells
        .iter()
        .map(|cell| escape_csv(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

pub fn escape_csv(value: &str) -> String {
    let needs_quotes = value.contains([',', '"', '\n', '\r']);
    if needs_quotes {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn check_cell(row: usize, column: &'static str, value: &str) -> Result<(), ExportError> {
    if let Some(bad) = value.chars().find(|&ch| !is_xml_char(ch)) {
        return Err(ExportError::InvalidCharacter {
            row,
            column,
            code: bad as u32,
        });
    }
    let len = value.chars().count();
    if len > MAX_CELL_CHARS {
        return Err(ExportError::CellTooLong { row, column, len });
    }
    Ok(())
}

/// Characters allowed in XML 1.0 text.
fn is_xml_char(ch: char) -> bool {
    match ch {
        '\t' | '\n' | '\r' => true,
        '\u{0}'..='\u{1F}' => false,
        '\u{FFFE}' | '\u{FFFF}' => false,
        _ => true,
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// `0` -> `A`, `25` -> `Z`, `26` -> `AA`.
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

const HEADER_STYLE: u8 = 1;

fn push_sheet_row<S: AsRef<str>>(out: &mut String, row: usize, cells: &[S], style: Option<u8>) {
    out.push_str(&format!("<row r=\"{row}\">"));
    for (column, cell) in cells.iter().enumerate() {
        let reference = format!("{}{row}", column_name(column));
        let style_attr = style.map(|s| format!(" s=\"{s}\"")).unwrap_or_default();
        out.push_str(&format!(
            "<c r=\"{reference}\" t=\"inlineStr\"{style_attr}><is><t xml:space=\"preserve\">{}</t></is></c>",
            escape_xml(cell.as_ref())
        ));
    }
    out.push_str("</row>");
}

const SHEET_PROLOGUE: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<sheetViews><sheetView workbookViewId="0">"#,
    r#"<pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/>"#,
    r#"</sheetView></sheetViews>"#,
    r#"<cols>"#,
    r#"<col min="1" max="1" width="10" customWidth="1"/>"#,
    r#"<col min="2" max="2" width="10" customWidth="1"/>"#,
    r#"<col min="3" max="3" width="20" customWidth="1"/>"#,
    r#"<col min="4" max="4" width="50" customWidth="1"/>"#,
    r#"<col min="5" max="5" width="22" customWidth="1"/>"#,
    r#"</cols>"#,
    r#"<sheetData>"#,
);

const SHEET_EPILOGUE: &str = "</sheetData></worksheet>";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"</Types>"#,
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#,
);

const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

fn workbook_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>"#,
            r#"</workbook>"#,
        ),
        escape_xml(SHEET_NAME)
    )
}

fn write_workbook(sheet: &str) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let workbook = workbook_xml();
        let parts: [(&str, &str); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", &workbook),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/styles.xml", STYLES),
            ("xl/worksheets/sheet1.xml", sheet),
        ];
        for (name, contents) in parts {
            zip.start_file(name, options)?;
            zip.write_all(contents.as_bytes())?;
        }
        zip.finish()?;
    }
    Ok(buffer)
}
