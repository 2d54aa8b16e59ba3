//! Bit Matrix Table
//!
//! Converting a bit matrix into a printable table.
//!
//! A simple wrapper on prettytable::Table, because it doesn't provide any public method to
//! retrieve the title row, which the JSON export needs.
//!

use super::bit_matrix::*;
use prettytable::format::TableFormat;
use prettytable::*;

#[derive(Clone)]
pub struct VizTable {
    pub title: Row,
    pub rows: Vec<Row>,
}

impl VizTable {
    /// column indices of more than one digit are written vertically to keep the columns narrow
    pub fn force_single_column(long_str: &str) -> String {
        long_str
            .chars()
            .enumerate()
            .flat_map(|(idx, c)| if idx == 0 { vec![c] } else { vec!['\n', c] })
            .collect()
    }
}

lazy_static! {
    pub static ref DEFAULT_TABLE_FORMAT: TableFormat = {
        let mut format = TableFormat::new();
        format.padding(0, 0);
        format.column_separator('\u{250A}');
        format.borders('\u{250A}');
        use format::LinePosition::*;
        let separators = [
            (Intern, ['\u{2500}', '\u{253C}', '\u{251C}', '\u{2524}']),
            (Top, ['\u{2500}', '\u{252C}', '\u{250C}', '\u{2510}']),
            (Bottom, ['\u{2500}', '\u{2534}', '\u{2514}', '\u{2518}']),
            (Title, ['\u{2550}', '\u{256A}', '\u{255E}', '\u{2561}']),
        ];
        for (position, s) in separators {
            format.separators(&[position], format::LineSeparator::new(s[0], s[1], s[2], s[3]))
        }
        format
    };
}

impl From<&BitMatrix> for VizTable {
    fn from(matrix: &BitMatrix) -> VizTable {
        let mut title = Row::empty();
        title.add_cell(Cell::new(""));
        for column in 0..matrix.columns() {
            let column_str = Self::force_single_column(column.to_string().as_str());
            title.add_cell(Cell::new(column_str.as_str()).style_spec("brFm"));
        }
        let mut rows: Vec<Row> = vec![];
        for row in 0..matrix.rows() {
            let mut table_row = Row::empty();
            table_row.add_cell(Cell::new(row.to_string().as_str()).style_spec("brFb"));
            for column in 0..matrix.columns() {
                table_row.add_cell(Cell::new(if matrix.get(row, column) { "1" } else { " " }));
            }
            rows.push(table_row);
        }
        VizTable { title, rows }
    }
}

impl From<VizTable> for Table {
    fn from(viz_table: VizTable) -> Table {
        let mut table = Table::new();
        table.set_format(*DEFAULT_TABLE_FORMAT);
        table.set_titles(viz_table.title.clone());
        for row in viz_table.rows.iter() {
            table.add_row(row.clone());
        }
        table
    }
}

impl From<VizTable> for serde_json::Value {
    fn from(viz_table: VizTable) -> serde_json::Value {
        let mut table_json = vec![];
        let mut title_json = vec![];
        for cell in viz_table.title.iter() {
            title_json.push(cell.get_content());
        }
        table_json.push(title_json);
        for row in viz_table.rows.iter() {
            let mut row_json = vec![];
            for cell in row {
                row_json.push(cell.get_content());
            }
            table_json.push(row_json);
        }
        json!(table_json)
    }
}

pub trait VizTrait {
    fn viz_table(&self) -> VizTable;
    fn printstd_str(&self) -> String {
        Table::from(self.viz_table()).to_string().replace('\r', "")
    }
    fn printstd(&self) {
        #[cfg(feature = "colorful")]
        Table::from(self.viz_table()).printstd();
        #[cfg(not(feature = "colorful"))]
        println!("{}", self.printstd_str());
    }
    fn snapshot_json(&self) -> serde_json::Value {
        self.viz_table().into()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn viz_table_bit_matrix() {
        // cargo test --features=colorful viz_table_bit_matrix -- --nocapture
        let matrix = BitMatrix::from_bit_strs(&["1101", "0111"]).unwrap();
        matrix.printstd();
        assert_eq!(
            matrix.printstd_str(),
            "\
┌─┬─┬─┬─┬─┐
┊ ┊0┊1┊2┊3┊
╞═╪═╪═╪═╪═╡
┊0┊1┊1┊ ┊1┊
├─┼─┼─┼─┼─┤
┊1┊ ┊1┊1┊1┊
└─┴─┴─┴─┴─┘
"
        );
        assert_eq!(
            matrix.snapshot_json(),
            json!([["", "0", "1", "2", "3"], ["0", "1", "1", " ", "1"], ["1", " ", "1", "1", "1"]])
        );
    }

    #[test]
    fn viz_table_force_single_column() {
        // cargo test viz_table_force_single_column -- --nocapture
        assert_eq!(VizTable::force_single_column("12"), "1\n2");
        assert_eq!(VizTable::force_single_column("7"), "7");
    }
}
