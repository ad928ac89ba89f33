use core::fmt;

const ROW_WIDTH: usize = 5;

/// Console table of a sequence, five values per row.
///
/// Each row is preceded by a `Column {start} through Column {end}` header (tab separated). A
/// trailing partial row ends at the sequence length.
///
/// ```rust
/// use fftconv::SequenceTable;
///
/// let table = SequenceTable(&[1.0, 2.0, 3.0]).to_string();
/// assert_eq!(table, "Column 0\t through \tColumn 3\n1, 2, 3\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SequenceTable<'a>(pub &'a [f64]);

impl fmt::Display for SequenceTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_index, row) in self.0.chunks(ROW_WIDTH).enumerate() {
            let start = row_index * ROW_WIDTH;
            writeln!(f, "Column {start}\t through \tColumn {}", start + row.len())?;

            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{value}")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
