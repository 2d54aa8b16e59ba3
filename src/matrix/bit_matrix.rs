use super::row::*;
use super::visualize::*;
use crate::error::*;
use crate::util::*;
use derivative::Derivative;

/// a dense matrix over GF(2) with a fixed number of columns
#[derive(Clone, Derivative, PartialEq, Eq)]
#[derivative(Default(new = "true"))]
pub struct BitMatrix {
    columns: usize,
    rows: Vec<BitRow>,
}

impl BitMatrix {
    pub fn new_zero(rows: usize, columns: usize) -> Self {
        Self {
            columns,
            rows: vec![BitRow::new_length(columns); rows],
        }
    }

    /// every row must have the same length
    pub fn from_rows(rows: &[Vec<Bit>]) -> KernelResult<Self> {
        let columns = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut matrix = Self {
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows.iter() {
            matrix.push_row(BitRow::from_bits(row))?;
        }
        Ok(matrix)
    }

    pub fn from_bit_strs<S: AsRef<str>>(rows: &[S]) -> KernelResult<Self> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(row, bits)| parse_bits(bits.as_ref()).map_err(|error| KernelError::in_row(row, error)))
            .collect::<KernelResult<Vec<_>>>()?;
        Self::from_rows(&rows)
    }

    pub fn push_row(&mut self, row: BitRow) -> KernelResult<()> {
        if self.rows.is_empty() && self.columns == 0 {
            self.columns = row.len();
        }
        if row.len() != self.columns {
            return Err(KernelError::ShapeMismatch(format!(
                "row {} has {} columns, expected {}",
                self.rows.len(),
                row.len(),
                self.columns
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Bit {
        self.rows[row].get(column)
    }

    pub fn set(&mut self, row: usize, column: usize, value: Bit) {
        self.rows[row].set(column, value)
    }

    pub fn row(&self, row: usize) -> &BitRow {
        &self.rows[row]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &BitRow> {
        self.rows.iter()
    }

    pub fn column(&self, column: usize) -> Vec<Bit> {
        self.rows.iter().map(|row| row.get(column)).collect()
    }

    /// `H * v` over GF(2): one output bit per row
    pub fn multiply_vector(&self, vector: &[Bit]) -> KernelResult<Vec<Bit>> {
        if vector.len() != self.columns {
            return Err(KernelError::ShapeMismatch(format!(
                "vector of length {} against a matrix of {} columns",
                vector.len(),
                self.columns
            )));
        }
        let vector = BitRow::from_bits(vector);
        Ok(self.rows.iter().map(|row| row.dot(&vector)).collect())
    }

    pub fn to_bit_strings(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.to_string()).collect()
    }
}

impl std::fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rows.iter()).finish()
    }
}

impl VizTrait for BitMatrix {
    fn viz_table(&self) -> VizTable {
        VizTable::from(self)
    }
}
