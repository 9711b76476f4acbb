//! Workbook access: named sheets as positional rows of cells.
//! Reads .xlsx/.xlsm/.xls/.ods through calamine, or a directory holding one `<sheet name>.csv` per sheet.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("workbook not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to open workbook {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: calamine::Error,
    },
    #[error("workbook {} has no sheet named '{sheet}' (available: {available})", .path.display())]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: String,
    },
    #[error("failed to read sheet '{sheet}' from {}: {source}", .path.display())]
    ReadSheet {
        path: PathBuf,
        sheet: String,
        source: calamine::Error,
    },
    #[error("failed to read csv sheet {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("failed to list csv sheets in {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One cell value, independent of the backing file format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Error(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// String rendering of the cell, the way a spreadsheet shows its cached value.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Float(f) => format!("{}", f),
            Cell::Int(i) => i.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Error(e) => e.clone(),
        }
    }

    /// Trimmed [Cell::text].
    pub fn trimmed(&self) -> String {
        self.text().trim().to_string()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&calamine::Data> for Cell {
    fn from(d: &calamine::Data) -> Self {
        match d {
            calamine::Data::Empty => Cell::Empty,
            calamine::Data::String(s) => Cell::Text(s.clone()),
            calamine::Data::Float(f) => Cell::Float(*f),
            calamine::Data::Int(i) => Cell::Int(*i),
            calamine::Data::Bool(b) => Cell::Bool(*b),
            calamine::Data::DateTimeIso(s) | calamine::Data::DurationIso(s) => {
                Cell::Text(s.clone())
            }
            // Date-formatted cells keep their serial number, the value a formula would see.
            calamine::Data::DateTime(dt) => Cell::Float(dt.as_f64()),
            calamine::Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// A physical sheet row. `number` is 1-based, `cells[0]` is column A.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Cell at a 1-based column; columns past the end of the row read as empty.
    pub fn cell(&self, column: usize) -> &Cell {
        column
            .checked_sub(1)
            .and_then(|idx| self.cells.get(idx))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn is_used(&self) -> bool {
        self.cells.iter().any(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Rows holding at least one non-empty cell, in sheet order.
    pub fn used_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.is_used())
    }

    /// Builds a sheet from text cells; empty strings become empty cells. Row numbers start at 1.
    pub fn from_text_rows<R, C, S>(name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| Row {
                number: i + 1,
                cells: cells.into_iter().map(|s| text_cell(s.as_ref())).collect(),
            })
            .collect();
        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    fn from_range(name: &str, range: &calamine::Range<calamine::Data>) -> Self {
        // calamine ranges begin at the first used cell, so pad back out to column A / row 1.
        let Some((start_row, start_col)) = range.start() else {
            return Sheet {
                name: name.to_string(),
                rows: Vec::new(),
            };
        };
        let rows = range
            .rows()
            .enumerate()
            .map(|(i, row)| {
                let mut cells = vec![Cell::Empty; start_col as usize];
                cells.extend(row.iter().map(Cell::from));
                Row {
                    number: start_row as usize + i + 1,
                    cells,
                }
            })
            .collect();
        Sheet {
            name: name.to_string(),
            rows,
        }
    }
}

fn text_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

pub enum Workbook {
    Spreadsheet {
        path: PathBuf,
        sheets: calamine::Sheets<BufReader<File>>,
    },
    CsvDir {
        path: PathBuf,
    },
}

impl Workbook {
    /// Opens a spreadsheet file, or a directory of CSV sheets.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(Workbook::CsvDir {
                path: path.to_path_buf(),
            });
        }
        if !path.exists() {
            return Err(WorkbookError::NotFound(path.to_path_buf()));
        }
        let sheets = calamine::open_workbook_auto(path).map_err(|source| WorkbookError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Workbook::Spreadsheet {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            Workbook::Spreadsheet { path, .. } | Workbook::CsvDir { path } => path,
        }
    }

    pub fn sheet_names(&self) -> Result<Vec<String>, WorkbookError> {
        match self {
            Workbook::Spreadsheet { sheets, .. } => Ok(sheets.sheet_names()),
            Workbook::CsvDir { path } => {
                let entries = fs::read_dir(path).map_err(|source| WorkbookError::ListDir {
                    path: path.clone(),
                    source,
                })?;
                let mut names = Vec::new();
                for entry in entries {
                    let entry = entry.map_err(|source| WorkbookError::ListDir {
                        path: path.clone(),
                        source,
                    })?;
                    let file = entry.path();
                    let is_csv = file
                        .extension()
                        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
                    if is_csv {
                        if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
                            names.push(stem.to_string());
                        }
                    }
                }
                names.sort();
                Ok(names)
            }
        }
    }

    /// Loads a sheet by exact name. A missing sheet is an error.
    pub fn sheet(&mut self, name: &str) -> Result<Sheet, WorkbookError> {
        let names = self.sheet_names()?;
        if !names.iter().any(|n| n == name) {
            return Err(WorkbookError::MissingSheet {
                path: self.path().to_path_buf(),
                sheet: name.to_string(),
                available: names.join(", "),
            });
        }
        match self {
            Workbook::Spreadsheet { path, sheets } => {
                let range = sheets
                    .worksheet_range(name)
                    .map_err(|source| WorkbookError::ReadSheet {
                        path: path.clone(),
                        sheet: name.to_string(),
                        source,
                    })?;
                Ok(Sheet::from_range(name, &range))
            }
            Workbook::CsvDir { path } => read_csv_sheet(&path.join(format!("{name}.csv")), name),
        }
    }
}

fn read_csv_sheet(path: &Path, name: &str) -> Result<Sheet, WorkbookError> {
    let csv_err = |source: csv::Error| WorkbookError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        // Blank lines are dropped by the reader; keep the physical line for error messages.
        let number = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(i + 1);
        rows.push(Row {
            number,
            cells: record.iter().map(text_cell).collect(),
        });
    }
    Ok(Sheet {
        name: name.to_string(),
        rows,
    })
}
