//! LibSVM format dataset loader
//!
//! Loads multiclass datasets in the libsvm text format:
//!
//! ```text
//! label index:value index:value ...
//! ```
//!
//! Labels are non-negative integer class indices; feature indices are
//! 1-based in the file and converted to 0-based internally.

use crate::core::{Dataset, Result, SparseVector, SvmError};
use crate::data::VecDataset;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Multiclass dataset loaded from a LibSVM format file
#[derive(Debug, Clone)]
pub struct LibSvmDataset {
    inner: VecDataset,
    dimensions: usize,
}

impl LibSvmDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut max_dimension = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SvmError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (feature, label, max_idx) = Self::parse_line(line).map_err(|e| {
                SvmError::ParseError(format!("line {}: {}", line_num + 1, e))
            })?;
            features.push(feature);
            labels.push(label);
            max_dimension = max_dimension.max(max_idx + 1);
        }

        if features.is_empty() {
            return Err(SvmError::InvalidArgument("empty dataset".to_string()));
        }

        Ok(Self {
            inner: VecDataset::new(features, labels)?,
            dimensions: max_dimension,
        })
    }

    /// Number of feature dimensions observed in the file
    pub fn dim(&self) -> usize {
        self.dimensions
    }

    /// All labels, in sample order
    pub fn labels(&self) -> &[usize] {
        self.inner.labels()
    }

    fn parse_line(line: &str) -> std::result::Result<(SparseVector, usize, usize), String> {
        let mut parts = line.split_whitespace();

        let label_str = parts.next().ok_or_else(|| "empty line".to_string())?;
        let label_value = label_str
            .parse::<f64>()
            .map_err(|_| format!("invalid label: {}", label_str))?;
        if label_value < 0.0 || label_value.fract() != 0.0 {
            return Err(format!(
                "label must be a non-negative integer class index, got {}",
                label_str
            ));
        }
        let label = label_value as usize;

        let mut indices = Vec::new();
        let mut values = Vec::new();
        let mut max_index = 0;

        for feature_str in parts {
            let (index_str, value_str) = feature_str
                .split_once(':')
                .ok_or_else(|| format!("invalid feature format: {}", feature_str))?;

            let index = index_str
                .parse::<usize>()
                .map_err(|_| format!("invalid feature index: {}", index_str))?;
            if index == 0 {
                return Err("feature index must be positive (1-based)".to_string());
            }
            let value = value_str
                .parse::<f64>()
                .map_err(|_| format!("invalid feature value: {}", value_str))?;

            // libsvm uses 1-based indexing, convert to 0-based
            indices.push(index - 1);
            values.push(value);
            max_index = max_index.max(index - 1);
        }

        Ok((SparseVector::new(indices, values), label, max_index))
    }
}

impl Dataset for LibSvmDataset {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn feature(&self, i: usize) -> &SparseVector {
        self.inner.feature(i)
    }

    fn label(&self, i: usize) -> usize {
        self.inner.label(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_multiclass_file() {
        let data = "0 1:0.5 3:1.2\n1 2:0.3\n2 1:-1.0 2:2.0\n";
        let dataset = LibSvmDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.labels(), &[0, 1, 2]);
        assert_eq!(dataset.dim(), 3);

        // 1-based file indices become 0-based
        assert_eq!(dataset.feature(0).get(0), 0.5);
        assert_eq!(dataset.feature(0).get(2), 1.2);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let data = "# header\n\n0 1:1.0\n1 1:-1.0\n";
        let dataset = LibSvmDataset::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_rejects_negative_label() {
        let data = "-1 1:1.0\n";
        let result = LibSvmDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SvmError::ParseError(_))));
    }

    #[test]
    fn test_rejects_fractional_label() {
        let data = "1.5 1:1.0\n";
        let result = LibSvmDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SvmError::ParseError(_))));
    }

    #[test]
    fn test_rejects_zero_feature_index() {
        let data = "0 0:1.0\n";
        let result = LibSvmDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SvmError::ParseError(_))));
    }

    #[test]
    fn test_rejects_malformed_pair() {
        let data = "0 1=3.0\n";
        let result = LibSvmDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SvmError::ParseError(_))));
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = LibSvmDataset::from_reader(Cursor::new("# only a comment\n"));
        assert!(matches!(result, Err(SvmError::InvalidArgument(_))));
    }
}
