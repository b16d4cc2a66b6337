//! Embedded NUL characters in char variables.

use argo_model::{DataFile, DataType, ValidationOutcome};
use tracing::debug;

/// Warns about the first NUL of every record of every char variable.
///
/// Indices in the message are 1-based, one per dimension of the variable.
pub fn check(data: &dyn DataFile, outcome: &mut ValidationOutcome) {
    for var in data.variables().iter().filter(|var| var.data_type == DataType::Char) {
        let Some(records) = data.raw_text(&var.name) else {
            continue;
        };
        let leading: Vec<usize> = match var.dimensions.split_last() {
            Some((_, leading)) if var.rank() > 1 => leading
                .iter()
                .map(|dim| data.dimension_length(dim).unwrap_or(0))
                .collect(),
            _ => Vec::new(),
        };

        for (record, text) in records.iter().enumerate() {
            let Some(position) = text.chars().position(|c| c == '\0') else {
                continue;
            };
            let mut index = record_index(record, &leading);
            index.push(position);
            let label = index
                .iter()
                .map(|i| (i + 1).to_string())
                .collect::<Vec<_>>()
                .join(",");
            debug!(variable = var.name.as_str(), index = %label, "NULL character");
            outcome.add_warning(format!("{}: NULL character at [{label}]", var.name));
        }
    }
}

/// Row-major position of record `n` over the leading dimensions.
fn record_index(mut n: usize, leading: &[usize]) -> Vec<usize> {
    let mut index = vec![0; leading.len()];
    for (slot, &len) in index.iter_mut().zip(leading).rev() {
        if len == 0 {
            continue;
        }
        *slot = n % len;
        n /= len;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_index_is_row_major() {
        assert_eq!(record_index(0, &[]), Vec::<usize>::new());
        assert_eq!(record_index(4, &[5]), vec![4]);
        assert_eq!(record_index(5, &[2, 3]), vec![1, 2]);
        assert_eq!(record_index(3, &[2, 3]), vec![1, 0]);
    }
}
