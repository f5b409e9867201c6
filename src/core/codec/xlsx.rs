//! Single-sheet XLSX read/write. A workbook is an OPC zip of XML parts; only
//! the pieces needed for tabular data are touched: workbook sheet order, the
//! workbook relationships, shared strings and one worksheet. Reading takes
//! the FIRST sheet in workbook order and silently ignores the rest — a
//! deliberate simplification. Writing produces exactly one sheet, "Sheet1".

use std::io::{Cursor, Read, Seek, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Number, Value};
use zip::result::ZipError;
use zip::write::{FileOptions, ZipWriter};
use zip::ZipArchive;

use crate::domain::model::{Record, RecordSet};
use crate::utils::error::{CodecError, CodecResult};

const SHEET_NAME: &str = "Sheet1";
const XMLNS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const XMLNS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"</Relationships>"#
);

/// Reads the first sheet of a workbook into records: first row = headers,
/// empty cells leave the key absent, blank rows are skipped.
pub fn decode(data: &[u8]) -> CodecResult<RecordSet> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let sheet_path = first_sheet_path(&mut archive)?;
    let shared = match read_entry(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let sheet_xml = read_entry(&mut archive, &sheet_path)?.ok_or_else(|| CodecError::Workbook {
        message: format!("worksheet part {} missing", sheet_path),
    })?;

    let rows = parse_sheet_rows(&sheet_xml, &shared)?;
    Ok(rows_to_records(rows))
}

/// Writes a single-sheet workbook: header row from the column universe,
/// strings as inline strings, numbers and booleans as typed cells, nulls and
/// missing keys as empty cells.
pub fn encode(records: &RecordSet) -> CodecResult<Vec<u8>> {
    let workbook_xml = build_workbook_xml()?;
    let sheet_xml = build_sheet_xml(records)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", workbook_xml.as_slice()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet_xml.as_slice()),
    ];
    for (name, content) in parts {
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(content)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn build_workbook_xml() -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut writer = Writer::new(&mut out);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut workbook = BytesStart::new("workbook");
    workbook.push_attribute(("xmlns", XMLNS_MAIN));
    workbook.push_attribute(("xmlns:r", XMLNS_REL));
    writer.write_event(Event::Start(workbook))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;

    let mut sheet = BytesStart::new("sheet");
    sheet.push_attribute(("name", SHEET_NAME));
    sheet.push_attribute(("sheetId", "1"));
    sheet.push_attribute(("r:id", "rId1"));
    writer.write_event(Event::Empty(sheet))?;

    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(out)
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> CodecResult<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Resolves the worksheet part of the first sheet in workbook order via the
/// workbook relationships, falling back to the conventional part name.
fn first_sheet_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> CodecResult<String> {
    let workbook = read_entry(archive, "xl/workbook.xml")?.ok_or_else(|| CodecError::Workbook {
        message: "xl/workbook.xml missing".to_string(),
    })?;
    let (sheet_name, rel_id) = first_sheet_entry(&workbook)?;
    tracing::debug!("reading first worksheet {:?}", sheet_name);

    if let Some(rel_id) = rel_id {
        if let Some(rels) = read_entry(archive, "xl/_rels/workbook.xml.rels")? {
            if let Some(target) = relationship_target(&rels, &rel_id)? {
                return Ok(match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{}", target),
                });
            }
        }
    }
    Ok("xl/worksheets/sheet1.xml".to_string())
}

fn first_sheet_entry(workbook_xml: &str) -> CodecResult<(String, Option<String>)> {
    let mut reader = Reader::from_str(workbook_xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rel_id = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    match attr.key.as_ref() {
                        b"name" => name = String::from_utf8_lossy(&attr.value).into_owned(),
                        b"r:id" => {
                            rel_id = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                        _ => {}
                    }
                }
                return Ok((name, rel_id));
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }
        buf.clear();
    }

    Err(CodecError::Workbook {
        message: "workbook has no sheets".to_string(),
    })
}

fn relationship_target(rels_xml: &str, rel_id: &str) -> CodecResult<Option<String>> {
    let mut reader = Reader::from_str(rels_xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attr.value).into_owned(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).into_owned(),
                        _ => {}
                    }
                }
                if id == rel_id {
                    return Ok(Some(target));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(None)
}

/// Shared string table: one entry per `<si>`, rich-text runs concatenated,
/// phonetic runs excluded.
fn parse_shared_strings(xml: &str) -> CodecResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_text = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => current.push_str(&e.unescape()?),
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Pulls the sheet's cell grid as sparse rows. Cell positions come from the
/// `r` reference when present, otherwise from document order.
fn parse_sheet_rows(xml: &str, shared: &[String]) -> CodecResult<Vec<Vec<Option<Value>>>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut rows: Vec<Vec<Option<Value>>> = Vec::new();
    let mut row: Vec<Option<Value>> = Vec::new();
    let mut next_col = 0usize;
    let mut cell_col = 0usize;
    let mut cell_type = String::new();
    let mut text = String::new();
    let mut in_cell = false;
    let mut capture = false;

    // Reads `r` (position) and `t` (type) off a cell element, advancing the
    // document-order column cursor for cells without a reference.
    fn cell_attrs(
        e: &BytesStart<'_>,
        next_col: &mut usize,
        cell_type: &mut String,
    ) -> CodecResult<usize> {
        let mut col = *next_col;
        cell_type.clear();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            match attr.key.as_ref() {
                b"r" => col = column_index(&String::from_utf8_lossy(&attr.value)),
                b"t" => *cell_type = String::from_utf8_lossy(&attr.value).into_owned(),
                _ => {}
            }
        }
        *next_col = col + 1;
        Ok(col)
    }

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"row" => {
                row = Vec::new();
                next_col = 0;
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"row" => {
                rows.push(Vec::new());
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"c" => {
                cell_col = cell_attrs(&e, &mut next_col, &mut cell_type)?;
                text.clear();
                in_cell = true;
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                // Self-closing cell: position noted, no value recorded.
                cell_attrs(&e, &mut next_col, &mut cell_type)?;
            }
            Ok(Event::Start(e)) if in_cell && matches!(e.name().as_ref(), b"v" | b"t") => {
                capture = true;
            }
            Ok(Event::Text(e)) if capture => text.push_str(&e.unescape()?),
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"v" | b"t" => capture = false,
                b"c" => {
                    if in_cell {
                        if let Some(value) = cell_value(&cell_type, &text, shared)? {
                            if row.len() <= cell_col {
                                row.resize(cell_col + 1, None);
                            }
                            row[cell_col] = Some(value);
                        }
                        in_cell = false;
                    }
                }
                b"row" => rows.push(std::mem::take(&mut row)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

fn cell_value(cell_type: &str, text: &str, shared: &[String]) -> CodecResult<Option<Value>> {
    match cell_type {
        "s" => {
            let idx: usize = text.trim().parse().map_err(|_| CodecError::Workbook {
                message: format!("invalid shared string reference {:?}", text),
            })?;
            let value = shared.get(idx).ok_or_else(|| CodecError::Workbook {
                message: format!("shared string {} out of range", idx),
            })?;
            Ok(Some(Value::String(value.clone())))
        }
        "inlineStr" | "str" | "e" => Ok(Some(Value::String(text.to_string()))),
        "b" => Ok(Some(Value::Bool(
            text == "1" || text.eq_ignore_ascii_case("true"),
        ))),
        _ => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Ok(Some(parse_number(trimmed)))
        }
    }
}

/// Numeric cell text: integral values become integers so that `1` does not
/// round-trip as `1.0`; anything unparsable stays text.
fn parse_number(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    if let Ok(float) = text.parse::<f64>() {
        if float.fract() == 0.0 && float.abs() < 9.007_199_254_740_992e15 {
            return Value::Number(Number::from(float as i64));
        }
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}

fn rows_to_records(mut rows: Vec<Vec<Option<Value>>>) -> RecordSet {
    if rows.is_empty() {
        return RecordSet::new();
    }

    let header = rows.remove(0);
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        if let Some(value) = cell {
            let name = super::cell_text(value);
            if !name.is_empty() && !columns.iter().any(|(_, existing)| existing == &name) {
                columns.push((idx, name));
            }
        }
    }

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|cell| cell.is_none()) {
            continue;
        }
        let mut data = serde_json::Map::new();
        for (idx, name) in &columns {
            if let Some(value) = row.get(*idx).and_then(|cell| cell.clone()) {
                data.insert(name.clone(), value);
            }
        }
        records.push(Record { data });
    }

    let names = columns.into_iter().map(|(_, name)| name).collect();
    RecordSet::with_columns(names, records)
}

fn build_sheet_xml(records: &RecordSet) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut writer = Writer::new(&mut out);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", XMLNS_MAIN));
    writer.write_event(Event::Start(worksheet))?;

    let columns = records.columns();
    let dimension = if columns.is_empty() {
        "A1".to_string()
    } else {
        format!(
            "A1:{}{}",
            column_letters(columns.len() - 1),
            records.len() + 1
        )
    };
    let mut dim = BytesStart::new("dimension");
    dim.push_attribute(("ref", dimension.as_str()));
    writer.write_event(Event::Empty(dim))?;

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
    if !columns.is_empty() {
        let mut row_el = BytesStart::new("row");
        row_el.push_attribute(("r", "1"));
        writer.write_event(Event::Start(row_el))?;
        for (col, name) in columns.iter().enumerate() {
            write_inline_string(&mut writer, col, 1, name)?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;

        for (row_idx, record) in records.records().iter().enumerate() {
            let row_num = row_idx + 2;
            let mut row_el = BytesStart::new("row");
            row_el.push_attribute(("r", row_num.to_string().as_str()));
            writer.write_event(Event::Start(row_el))?;
            for (col, name) in columns.iter().enumerate() {
                match record.data.get(name) {
                    None | Some(Value::Null) => {}
                    Some(Value::Number(number)) => {
                        write_value_cell(&mut writer, col, row_num, None, &number.to_string())?;
                    }
                    Some(Value::Bool(flag)) => {
                        let v = if *flag { "1" } else { "0" };
                        write_value_cell(&mut writer, col, row_num, Some("b"), v)?;
                    }
                    Some(value) => {
                        write_inline_string(&mut writer, col, row_num, &super::cell_text(value))?;
                    }
                }
            }
            writer.write_event(Event::End(BytesEnd::new("row")))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;

    Ok(out)
}

fn write_value_cell<W: std::io::Write>(
    writer: &mut Writer<W>,
    col: usize,
    row: usize,
    cell_type: Option<&str>,
    value: &str,
) -> CodecResult<()> {
    let cell_ref = format!("{}{}", column_letters(col), row);
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", cell_ref.as_str()));
    if let Some(t) = cell_type {
        cell.push_attribute(("t", t));
    }
    writer.write_event(Event::Start(cell))?;
    writer.write_event(Event::Start(BytesStart::new("v")))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("v")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn write_inline_string<W: std::io::Write>(
    writer: &mut Writer<W>,
    col: usize,
    row: usize,
    text: &str,
) -> CodecResult<()> {
    let cell_ref = format!("{}{}", column_letters(col), row);
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", cell_ref.as_str()));
    cell.push_attribute(("t", "inlineStr"));
    writer.write_event(Event::Start(cell))?;
    writer.write_event(Event::Start(BytesStart::new("is")))?;
    let mut t = BytesStart::new("t");
    if text != text.trim() {
        t.push_attribute(("xml:space", "preserve"));
    }
    writer.write_event(Event::Start(t))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    writer.write_event(Event::End(BytesEnd::new("is")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

/// `0 -> A`, `25 -> Z`, `26 -> AA`.
fn column_letters(mut idx: usize) -> String {
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters
}

/// Column index from a cell reference like `BC12`.
fn column_index(cell_ref: &str) -> usize {
    let mut idx = 0usize;
    for ch in cell_ref.chars() {
        if !ch.is_ascii_alphabetic() {
            break;
        }
        idx = idx * 26 + (ch.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    idx.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(data) => Record { data },
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_column_letters_and_index() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_index("A1"), 0);
        assert_eq!(column_index("Z9"), 25);
        assert_eq!(column_index("AA12"), 26);
        assert_eq!(column_index("BC12"), 54);
    }

    #[test]
    fn test_encode_decode_round_trip_preserves_cell_types() {
        let set = RecordSet::from_records(vec![
            record(json!({"id": 1, "name": "Ada", "score": 29.99, "active": true})),
            record(json!({"id": 2, "name": "Bob"})),
        ]);
        let bytes = encode(&set).unwrap();
        let back = decode(&bytes).unwrap();

        assert_eq!(back.columns().to_vec(), ["id", "name", "score", "active"]);
        assert_eq!(back.len(), 2);
        assert_eq!(back.records()[0].data["id"], json!(1));
        assert_eq!(back.records()[0].data["score"], json!(29.99));
        assert_eq!(back.records()[0].data["active"], json!(true));
        assert_eq!(back.records()[1].data["name"], json!("Bob"));
        assert!(back.records()[1].data.get("score").is_none());
    }

    #[test]
    fn test_round_trip_escapes_markup_in_text() {
        let set = RecordSet::from_records(vec![record(json!({"note": "a < b & \"c\""}))]);
        let back = decode(&encode(&set).unwrap()).unwrap();
        assert_eq!(back.records()[0].data["note"], json!("a < b & \"c\""));
    }

    #[test]
    fn test_encode_empty_set_yields_empty_sheet() {
        let bytes = encode(&RecordSet::new()).unwrap();
        let back = decode(&bytes).unwrap();
        assert!(back.is_empty());
        assert!(back.columns().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_zip_input() {
        assert!(matches!(
            decode(b"definitely not a workbook").unwrap_err(),
            CodecError::Zip(_)
        ));
    }

    #[test]
    fn test_decode_reports_missing_worksheet_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file::<_, ()>("xl/workbook.xml", FileOptions::default())
            .unwrap();
        zip.write_all(&build_workbook_xml().unwrap()).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Workbook { .. }));
    }

    fn workbook_with_sheets(sheets: &[(&str, &str)], shared: Option<&str>) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let mut sheet_entries = String::new();
        let mut rel_entries = String::new();
        for (idx, (name, _)) in sheets.iter().enumerate() {
            let n = idx + 1;
            sheet_entries.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                name, n, n
            ));
            rel_entries.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                n, n
            ));
        }
        let workbook = format!(
            r#"<?xml version="1.0"?><workbook xmlns="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
            XMLNS_MAIN, sheet_entries
        );
        let rels = format!(
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rel_entries
        );

        zip.start_file::<_, ()>("xl/workbook.xml", FileOptions::default())
            .unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file::<_, ()>("xl/_rels/workbook.xml.rels", FileOptions::default())
            .unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        if let Some(sst) = shared {
            zip.start_file::<_, ()>("xl/sharedStrings.xml", FileOptions::default())
                .unwrap();
            zip.write_all(sst.as_bytes()).unwrap();
        }
        for (idx, (_, sheet_xml)) in sheets.iter().enumerate() {
            zip.start_file::<_, ()>(
                format!("xl/worksheets/sheet{}.xml", idx + 1),
                FileOptions::default(),
            )
            .unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_decode_uses_only_the_first_sheet() {
        let first = format!(
            r#"<worksheet xmlns="{}"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>city</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>Lisbon</t></is></c></row></sheetData></worksheet>"#,
            XMLNS_MAIN
        );
        let second = format!(
            r#"<worksheet xmlns="{}"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>secret</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>hidden</t></is></c></row></sheetData></worksheet>"#,
            XMLNS_MAIN
        );
        let bytes = workbook_with_sheets(&[("Cities", &first), ("Extra", &second)], None);

        let set = decode(&bytes).unwrap();
        assert_eq!(set.columns().to_vec(), ["city"]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].data["city"], json!("Lisbon"));
        let text = serde_json::to_string(&set.records()).unwrap();
        assert!(!text.contains("secret"));
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn test_decode_resolves_shared_strings() {
        let sst = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2"><si><t>name</t></si><si><r><t>A</t></r><r><t>da</t></r></si></sst>"#;
        let sheet = format!(
            r#"<worksheet xmlns="{}"><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c></row><row r="2"><c r="A2" t="s"><v>1</v></c></row></sheetData></worksheet>"#,
            XMLNS_MAIN
        );
        let bytes = workbook_with_sheets(&[("Sheet1", &sheet)], Some(sst));

        let set = decode(&bytes).unwrap();
        assert_eq!(set.columns().to_vec(), ["name"]);
        assert_eq!(set.records()[0].data["name"], json!("Ada"));
    }

    #[test]
    fn test_decode_skips_blank_rows_and_keeps_absent_cells_absent() {
        let sheet = format!(
            r#"<worksheet xmlns="{}"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>a</t></is></c><c r="B1" t="inlineStr"><is><t>b</t></is></c></row><row r="2"/><row r="3"><c r="B3"><v>7</v></c></row></sheetData></worksheet>"#,
            XMLNS_MAIN
        );
        let bytes = workbook_with_sheets(&[("Sheet1", &sheet)], None);

        let set = decode(&bytes).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.records()[0].data.get("a").is_none());
        assert_eq!(set.records()[0].data["b"], json!(7));
    }

    #[test]
    fn test_decode_handles_cells_without_references() {
        let sheet = format!(
            r#"<worksheet xmlns="{}"><sheetData><row><c t="inlineStr"><is><t>x</t></is></c><c t="inlineStr"><is><t>y</t></is></c></row><row><c><v>1</v></c><c><v>2.5</v></c></row></sheetData></worksheet>"#,
            XMLNS_MAIN
        );
        let bytes = workbook_with_sheets(&[("Sheet1", &sheet)], None);

        let set = decode(&bytes).unwrap();
        assert_eq!(set.columns().to_vec(), ["x", "y"]);
        assert_eq!(set.records()[0].data["x"], json!(1));
        assert_eq!(set.records()[0].data["y"], json!(2.5));
    }

    #[test]
    fn test_sheet_name_is_fixed() {
        let set = RecordSet::from_records(vec![record(json!({"id": 1}))]);
        let bytes = encode(&set).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert!(workbook.contains(&format!(r#"name="{}""#, SHEET_NAME)));
    }
}
