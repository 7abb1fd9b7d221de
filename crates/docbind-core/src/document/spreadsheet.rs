//! Spreadsheet reading and line-oriented rendering.

use std::io::Cursor;

use calamine::{Data, Reader};
use tracing::debug;

use crate::models::document::SheetData;

/// Read every sheet of a workbook (xlsx, xls, xlsb, ods) into cell grids.
///
/// Grids are anchored at cell A1: leading empty rows and columns are kept,
/// and every row has the same number of cells.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<SheetData>, calamine::Error> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name)?;

        let data = match range.start() {
            Some((first_row, first_col)) => {
                let width = first_col as usize + range.width();
                let mut grid = vec![vec![String::new(); width]; first_row as usize];
                for row in range.rows() {
                    let mut cells = vec![String::new(); first_col as usize];
                    cells.extend(row.iter().map(cell_text));
                    grid.push(cells);
                }
                grid
            }
            None => Vec::new(),
        };

        debug!("Read sheet '{}' with {} rows", sheet_name, data.len());
        sheets.push(SheetData { sheet_name, data });
    }

    Ok(sheets)
}

/// Render sheets as text: a header per sheet, then one `行N: a | b | c`
/// line per row. Empty cells stay as empty segments.
pub fn render_sheets(sheets: &[SheetData]) -> String {
    let mut text = String::new();

    for (index, sheet) in sheets.iter().enumerate() {
        text.push_str(&format!("工作表 {}: {}\n", index + 1, sheet.sheet_name));
        text.push_str("数据内容：\n");

        for (row_index, row) in sheet.data.iter().enumerate() {
            if row.is_empty() {
                continue;
            }
            text.push_str(&format!("行{}: {}\n", row_index + 1, row.join(" | ")));
        }
        text.push('\n');
    }

    text
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => format!("{cell}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(name: &str, rows: &[&[&str]]) -> SheetData {
        SheetData {
            sheet_name: name.to_string(),
            data: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_render_single_sheet() {
        let text = render_sheets(&[sheet("Sheet1", &[&["Name", "Age"], &["Ann", "30"]])]);
        assert_eq!(
            text,
            "工作表 1: Sheet1\n数据内容：\n行1: Name | Age\n行2: Ann | 30\n\n"
        );
    }

    #[test]
    fn test_render_empty_sheet_has_header_only() {
        let text = render_sheets(&[sheet("Empty", &[])]);
        assert!(text.contains("工作表 1: Empty"));
        assert!(!text.contains("行"));
    }

    #[test]
    fn test_render_keeps_empty_cells() {
        let text = render_sheets(&[sheet("S", &[&["a", "", "c"], &["", "", ""]])]);
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with('行')).collect();

        assert_eq!(rows, ["行1: a |  | c", "行2:  |  | "]);
        for row in rows {
            let (_, cells) = row.split_once(": ").unwrap();
            assert_eq!(cells.split(" | ").count(), 3);
        }
    }

    #[test]
    fn test_render_multiple_sheets_numbered() {
        let text = render_sheets(&[sheet("A", &[&["1"]]), sheet("B", &[&["2"]])]);
        assert!(text.contains("工作表 1: A"));
        assert!(text.contains("工作表 2: B"));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(30.0)), "30");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("x".to_string())), "x");
    }

    #[test]
    fn test_read_workbook_rejects_garbage() {
        assert!(read_workbook(b"definitely not a workbook").is_err());
    }
}
