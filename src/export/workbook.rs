//! Minimal xlsx writer
//!
//! Produces an Office Open XML workbook (a zip of XML parts) holding plain
//! text and number cells. Text goes through the shared string table, which
//! every xlsx reader understands.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PocketbookError;

/// Longest sheet name Excel accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// One cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// A named grid of rows
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

/// An ordered set of sheets with unique, Excel-safe names
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    reserved: Vec<String>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `name` free for a sheet added later
    pub fn reserve_name(&mut self, name: &str) {
        self.reserved.push(name.to_lowercase());
    }

    /// Add a sheet, sanitizing and de-duplicating its name
    ///
    /// A reserved name is only handed out when asked for with `claim_reserved`.
    /// Returns the name the sheet was given.
    pub fn add_sheet(&mut self, requested: &str, rows: Vec<Vec<Cell>>) -> String {
        self.insert(requested, rows, false)
    }

    /// Add the sheet a name was reserved for
    pub fn add_reserved_sheet(&mut self, requested: &str, rows: Vec<Vec<Cell>>) -> String {
        self.insert(requested, rows, true)
    }

    fn insert(&mut self, requested: &str, rows: Vec<Vec<Cell>>, claim_reserved: bool) -> String {
        let base = sanitize_sheet_name(requested);
        let lower = base.to_lowercase();
        if claim_reserved {
            self.reserved.retain(|r| *r != lower);
        }
        let name = self.unique_name(&base);
        self.sheets.push(Sheet {
            name: name.clone(),
            rows,
        });
        name
    }

    fn taken(&self, candidate: &str) -> bool {
        let lower = candidate.to_lowercase();
        // Excel compares sheet names case-insensitively
        self.reserved.contains(&lower) || self.sheets.iter().any(|s| s.name.to_lowercase() == lower)
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.taken(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let suffix = format!(" ({})", n);
            let room = MAX_SHEET_NAME_LEN - suffix.chars().count();
            let head: String = base.chars().take(room).collect();
            let candidate = format!("{}{}", head, suffix);
            if !self.taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Serialize to xlsx bytes
    pub fn to_xlsx(&self) -> Result<Vec<u8>, PocketbookError> {
        let mut strings = SharedStrings::default();
        let sheet_xml: Vec<String> = self
            .sheets
            .iter()
            .map(|sheet| worksheet_xml(sheet, &mut strings))
            .collect();

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut put = |name: &str, body: &str| -> Result<(), PocketbookError> {
            zip.start_file(name, options)
                .map_err(|e| PocketbookError::Io(format!("Failed to add {}: {}", name, e)))?;
            zip.write_all(body.as_bytes())
                .map_err(|e| PocketbookError::Io(format!("Failed to write {}: {}", name, e)))
        };

        put("[Content_Types].xml", &content_types_xml(self.sheets.len()))?;
        put("_rels/.rels", ROOT_RELS)?;
        put("xl/workbook.xml", &workbook_xml(&self.sheets))?;
        put("xl/_rels/workbook.xml.rels", &workbook_rels_xml(self.sheets.len()))?;
        put("xl/styles.xml", STYLES)?;
        put("xl/sharedStrings.xml", &strings.to_xml())?;
        for (i, xml) in sheet_xml.iter().enumerate() {
            put(&format!("xl/worksheets/sheet{}.xml", i + 1), xml)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| PocketbookError::Io(format!("Failed to finish workbook: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Make a name acceptable to Excel: no `[]:*?/\`, not blank, at most 31 chars
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if INVALID_SHEET_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    if cleaned.is_empty() {
        return "Sheet".to_string();
    }
    cleaned.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// Spreadsheet column letters for a zero-based index (0 -> A, 26 -> AA)
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[derive(Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    values: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, s: &str) -> usize {
        self.references += 1;
        if let Some(&i) = self.index.get(s) {
            return i;
        }
        let i = self.values.len();
        self.index.insert(s.to_string(), i);
        self.values.push(s.to_string());
        i
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.values.len()
        );
        for value in &self.values {
            xml.push_str(r#"<si><t xml:space="preserve">"#);
            xml.push_str(&escape_text(value));
            xml.push_str("</t></si>");
        }
        xml.push_str("</sst>");
        xml
    }
}

fn worksheet_xml(sheet: &Sheet, strings: &mut SharedStrings) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in sheet.rows.iter().enumerate() {
        let row_number = r + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(c), row_number);
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    let i = strings.intern(s);
                    xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, i));
                }
                Cell::Number(n) if n.is_finite() => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n));
                }
                Cell::Number(_) => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn workbook_xml(sheets: &[Sheet]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i, i
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    ));
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
        sheet_count + 2
    ));
    xml.push_str("</Relationships>");
    xml
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        ));
    }
    xml.push_str("</Types>");
    xml
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab, newline and return are not valid XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

/// Escape shared-string text so readers get back exactly what was written
///
/// XML parsers turn `\r` into `\n` and reject most control characters, so
/// those travel as OOXML `_xHHHH_` escapes. A literal `_` that would start
/// such an escape is itself written as `_x005F_`.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '_' if starts_ooxml_escape(&s[i..]) => out.push_str("_x005F_"),
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n') => {
                out.push_str(&format!("_x{:04X}_", c as u32));
            }
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn starts_ooxml_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7
        && b.starts_with(b"_x")
        && b[2..6].iter().all(u8::is_ascii_hexdigit)
        && b[6] == b'_'
}
