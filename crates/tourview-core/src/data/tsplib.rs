//! TSPLIB coordinate reader
//!
//! Reads the subset of the TSPLIB 95 format needed for display: the
//! header entries and the node coordinates. Edge weight sections are
//! skipped. `DISPLAY_DATA_SECTION` is used when a file has no
//! `NODE_COORD_SECTION` (explicit-weight problems usually ship one).

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::{Point, PointSet, Problem};
use crate::error::ProblemError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    NodeCoords,
    DisplayData,
    Skipped,
}

#[derive(Debug, Default)]
struct Header {
    name: Option<String>,
    comments: Vec<String>,
    dimension: Option<usize>,
}

/// Read and parse a TSPLIB file from disk.
///
/// A file without a NAME entry is named after its file stem.
pub fn read_tsplib(path: &Path) -> Result<Problem, ProblemError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProblemError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut problem = parse_tsplib(&content)?;
    if problem.name.is_empty() {
        if let Some(stem) = path.file_stem() {
            problem.name = stem.to_string_lossy().into_owned();
        }
    }
    debug!(
        path = %path.display(),
        name = %problem.name,
        nodes = problem.dimension(),
        "Loaded TSPLIB problem"
    );
    Ok(problem)
}

/// Parse TSPLIB content
pub fn parse_tsplib(content: &str) -> Result<Problem, ProblemError> {
    let mut header = Header::default();
    let mut section = Section::Header;
    let mut node_coords = Vec::new();
    let mut display_data = Vec::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "EOF" {
            break;
        }

        let starts_keyword = line
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());

        if starts_keyword {
            section = parse_keyword_line(line, line_number, &mut header)?;
            continue;
        }

        match section {
            Section::NodeCoords => node_coords.push(parse_coord_row(line, line_number)?),
            Section::DisplayData => display_data.push(parse_coord_row(line, line_number)?),
            Section::Skipped => {}
            Section::Header => {
                return Err(ProblemError::InvalidSyntax {
                    line_number,
                    reason: format!("unexpected data outside a section: '{}'", line),
                });
            }
        }
    }

    let name = header.name.unwrap_or_default();
    let rows = if !node_coords.is_empty() {
        node_coords
    } else {
        display_data
    };

    if rows.is_empty() {
        return Err(ProblemError::MissingCoordinates { name });
    }

    if let Some(declared) = header.dimension {
        if declared != rows.len() {
            return Err(ProblemError::DimensionMismatch {
                declared,
                found: rows.len(),
            });
        }
    }

    let mut seen = HashSet::with_capacity(rows.len());
    let mut points = Vec::with_capacity(rows.len());
    for (line_number, point) in rows {
        if !seen.insert(point.id) {
            return Err(ProblemError::DuplicateNode {
                id: point.id,
                line_number,
            });
        }
        points.push(point);
    }

    Ok(Problem::new(
        name,
        header.comments.join(" "),
        PointSet::new(points),
    ))
}

fn parse_keyword_line(
    line: &str,
    line_number: usize,
    header: &mut Header,
) -> Result<Section, ProblemError> {
    let (key, value) = match line.split_once(':') {
        Some((key, value)) => (key.trim(), Some(value.trim())),
        None => (line, None),
    };

    match (key.to_ascii_uppercase().as_str(), value) {
        ("NAME", Some(value)) => header.name = Some(value.to_string()),
        ("COMMENT", Some(value)) => header.comments.push(value.to_string()),
        ("DIMENSION", Some(value)) => {
            let dimension = value
                .parse::<usize>()
                .map_err(|_| ProblemError::InvalidSyntax {
                    line_number,
                    reason: format!("invalid DIMENSION '{}'", value),
                })?;
            header.dimension = Some(dimension);
        }
        ("NODE_COORD_SECTION", _) => return Ok(Section::NodeCoords),
        ("DISPLAY_DATA_SECTION", _) => return Ok(Section::DisplayData),
        (key, _) if key.ends_with("_SECTION") => return Ok(Section::Skipped),
        // TYPE, EDGE_WEIGHT_TYPE, CAPACITY and friends carry nothing the viewer needs
        _ => {}
    }
    Ok(Section::Header)
}

fn parse_coord_row(line: &str, line_number: usize) -> Result<(usize, Point), ProblemError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(ProblemError::InvalidSyntax {
            line_number,
            reason: format!("expected 'id x y', got '{}'", line),
        });
    }

    let id = fields[0]
        .parse::<usize>()
        .map_err(|_| ProblemError::InvalidSyntax {
            line_number,
            reason: format!("invalid node id '{}'", fields[0]),
        })?;
    let x = parse_coordinate(fields[1], line_number)?;
    let y = parse_coordinate(fields[2], line_number)?;

    Ok((line_number, Point::new(id, x, y)))
}

fn parse_coordinate(field: &str, line_number: usize) -> Result<f64, ProblemError> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(ProblemError::InvalidSyntax {
            line_number,
            reason: format!("non-finite coordinate '{}'", field),
        }),
        Err(_) => Err(ProblemError::InvalidSyntax {
            line_number,
            reason: format!("invalid coordinate '{}'", field),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "NAME : square4
COMMENT : Four corners
COMMENT : of a square
TYPE : TSP
DIMENSION : 4
EDGE_WEIGHT_TYPE : EUC_2D
NODE_COORD_SECTION
1 0 0
2 10 0
3 10 10
4 0 10
EOF
";

    #[test]
    fn test_parse_header_and_coords() {
        let problem = parse_tsplib(SMALL).unwrap();
        assert_eq!(problem.name, "square4");
        assert_eq!(problem.comment, "Four corners of a square");
        assert_eq!(problem.dimension(), 4);
        assert_eq!(problem.points.resolve(2).map(|p| (p.x, p.y)), Some((10.0, 10.0)));
    }

    #[test]
    fn test_scientific_notation() {
        let content = "NAME: sci\nNODE_COORD_SECTION\n1 1.5e+03 2.0e-01\nEOF\n";
        let problem = parse_tsplib(content).unwrap();
        let point = problem.points.as_slice()[0];
        assert_eq!(point.x, 1500.0);
        assert_eq!(point.y, 0.2);
    }

    #[test]
    fn test_display_data_fallback() {
        let content = "NAME: explicit
TYPE: TSP
DIMENSION: 2
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: FULL_MATRIX
EDGE_WEIGHT_SECTION
0 5
5 0
DISPLAY_DATA_SECTION
1 3.0 4.0
2 6.0 8.0
EOF
";
        let problem = parse_tsplib(content).unwrap();
        assert_eq!(problem.dimension(), 2);
    }

    #[test]
    fn test_missing_coordinates() {
        let content = "NAME: nothing\nTYPE: TSP\nEOF\n";
        assert_eq!(
            parse_tsplib(content),
            Err(ProblemError::MissingCoordinates {
                name: "nothing".to_string()
            })
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let content = "DIMENSION: 3\nNODE_COORD_SECTION\n1 0 0\n2 1 1\n";
        assert_eq!(
            parse_tsplib(content),
            Err(ProblemError::DimensionMismatch {
                declared: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_duplicate_node() {
        let content = "NODE_COORD_SECTION\n1 0 0\n1 1 1\n";
        assert_eq!(
            parse_tsplib(content),
            Err(ProblemError::DuplicateNode {
                id: 1,
                line_number: 3
            })
        );
    }

    #[test]
    fn test_bad_rows() {
        let short = "NODE_COORD_SECTION\n1 0\n";
        assert!(matches!(
            parse_tsplib(short),
            Err(ProblemError::InvalidSyntax { line_number: 2, .. })
        ));

        let nan = "NODE_COORD_SECTION\n1 NaN 0\n";
        assert!(matches!(
            parse_tsplib(nan),
            Err(ProblemError::InvalidSyntax { line_number: 2, .. })
        ));
    }
}
