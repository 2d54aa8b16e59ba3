pub mod bit_matrix;
pub mod row;
pub mod visualize;

pub use bit_matrix::BitMatrix;
pub use row::BitRow;
pub use visualize::{VizTable, VizTrait};
