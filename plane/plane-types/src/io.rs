//! Point cloud file I/O.
//!
//! Supported formats:
//! - **XYZ** - ASCII, one point per line: `x y z [nx ny nz [curvature]]`
//! - **PCD** - ASCII point cloud data with `x y z` and optional
//!   `normal_x normal_y normal_z curvature` fields (reading only)
//!
//! # Example
//!
//! ```no_run
//! use plane_types::PointCloud;
//!
//! let cloud = PointCloud::load("scan.xyz").unwrap();
//! cloud.save("copy.xyz").unwrap();
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::cloud::{CloudPoint, PointCloud};
use crate::error::{TypesError, TypesResult};

/// Supported point cloud file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudFormat {
    /// Simple XYZ ASCII format.
    Xyz,
    /// ASCII PCD format.
    Pcd,
}

impl PointCloudFormat {
    /// Detects the format from a file extension.
    ///
    /// # Example
    ///
    /// ```
    /// use plane_types::io::PointCloudFormat;
    ///
    /// assert_eq!(PointCloudFormat::from_extension("XYZ"), Some(PointCloudFormat::Xyz));
    /// assert_eq!(PointCloudFormat::from_extension("pcd"), Some(PointCloudFormat::Pcd));
    /// assert_eq!(PointCloudFormat::from_extension("stl"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xyz" | "txt" | "pts" => Some(Self::Xyz),
            "pcd" => Some(Self::Pcd),
            _ => None,
        }
    }

    /// Detects the format from a file path.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

fn unsupported(path: &Path) -> TypesError {
    TypesError::UnsupportedFormat {
        format: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    }
}

impl PointCloud {
    /// Loads a point cloud, detecting the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the format is
    /// unsupported.
    pub fn load<P: AsRef<Path>>(path: P) -> TypesResult<Self> {
        let path = path.as_ref();
        let format = PointCloudFormat::from_path(path).ok_or_else(|| unsupported(path))?;

        let reader = BufReader::new(File::open(path)?);
        let cloud = match format {
            PointCloudFormat::Xyz => read_xyz(reader)?,
            PointCloudFormat::Pcd => read_pcd(reader)?,
        };

        info!(
            points = cloud.len(),
            normals = cloud.has_normals(),
            path = %path.display(),
            "Point cloud loaded"
        );
        Ok(cloud)
    }

    /// Saves the point cloud as XYZ.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the extension is not
    /// an XYZ one.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TypesResult<()> {
        let path = path.as_ref();
        match PointCloudFormat::from_path(path) {
            Some(PointCloudFormat::Xyz) => write_xyz(self, BufWriter::new(File::create(path)?)),
            _ => Err(unsupported(path)),
        }
    }
}

fn parse_f64(token: &str, line: usize, what: &str) -> TypesResult<f64> {
    token.parse::<f64>().map_err(|_| TypesError::Parse {
        line,
        reason: format!("invalid {what}: {token}"),
    })
}

/// Reads XYZ data from any buffered reader.
///
/// # Errors
///
/// Returns an error on I/O failure or an unparseable coordinate.
pub fn read_xyz<R: BufRead>(reader: R) -> TypesResult<PointCloud> {
    let mut cloud = PointCloud::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = n + 1;

        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let x = parse_f64(parts[0], line_no, "x coordinate")?;
        let y = parse_f64(parts[1], line_no, "y coordinate")?;
        let z = parse_f64(parts[2], line_no, "z coordinate")?;
        let mut point = CloudPoint::new(Point3::new(x, y, z));

        if parts.len() >= 6 {
            let nx = parse_f64(parts[3], line_no, "normal x")?;
            let ny = parse_f64(parts[4], line_no, "normal y")?;
            let nz = parse_f64(parts[5], line_no, "normal z")?;
            point.normal = Some(Vector3::new(nx, ny, nz));
        }
        if parts.len() >= 7 {
            point.curvature = Some(parse_f64(parts[6], line_no, "curvature")?);
        }

        cloud.push(point);
    }

    Ok(cloud)
}

/// Reads ASCII PCD data from any buffered reader.
///
/// # Errors
///
/// Returns an error for binary PCD files, a missing `x y z` field set, or an
/// unparseable value.
pub fn read_pcd<R: BufRead>(reader: R) -> TypesResult<PointCloud> {
    let mut fields: Vec<String> = Vec::new();
    let mut in_data = false;
    let mut cloud = PointCloud::new();
    let mut columns: Option<PcdColumns> = None;

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = n + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if !in_data {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("FIELDS") => fields = parts.map(str::to_string).collect(),
                Some("DATA") => {
                    let kind = parts.next().unwrap_or("");
                    if kind != "ascii" {
                        return Err(TypesError::UnsupportedFormat {
                            format: format!("pcd ({kind})"),
                        });
                    }
                    columns = Some(PcdColumns::from_fields(&fields, line_no)?);
                    in_data = true;
                }
                _ => {}
            }
            continue;
        }

        let Some(cols) = columns.as_ref() else {
            continue;
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        let value = |idx: usize, what: &str| -> TypesResult<f64> {
            let token = parts.get(idx).ok_or_else(|| TypesError::Parse {
                line: line_no,
                reason: format!("missing {what}"),
            })?;
            parse_f64(token, line_no, what)
        };

        let mut point = CloudPoint::from_coords(
            value(cols.xyz[0], "x")?,
            value(cols.xyz[1], "y")?,
            value(cols.xyz[2], "z")?,
        );
        if let Some(nrm) = cols.normal {
            point.normal = Some(Vector3::new(
                value(nrm[0], "normal_x")?,
                value(nrm[1], "normal_y")?,
                value(nrm[2], "normal_z")?,
            ));
        }
        if let Some(c) = cols.curvature {
            point.curvature = Some(value(c, "curvature")?);
        }
        cloud.push(point);
    }

    Ok(cloud)
}

/// Column positions of the fields we read from a PCD file.
struct PcdColumns {
    xyz: [usize; 3],
    normal: Option<[usize; 3]>,
    curvature: Option<usize>,
}

impl PcdColumns {
    fn from_fields(fields: &[String], line: usize) -> TypesResult<Self> {
        let find = |name: &str| fields.iter().position(|f| f == name);
        let (Some(x), Some(y), Some(z)) = (find("x"), find("y"), find("z")) else {
            return Err(TypesError::Parse {
                line,
                reason: "PCD header lacks x y z fields".to_string(),
            });
        };
        let normal = match (find("normal_x"), find("normal_y"), find("normal_z")) {
            (Some(a), Some(b), Some(c)) => Some([a, b, c]),
            _ => None,
        };
        Ok(Self {
            xyz: [x, y, z],
            normal,
            curvature: find("curvature"),
        })
    }
}

/// Writes the cloud as XYZ to any writer.
///
/// Normals are written only when every point has one; curvature only when
/// every point has normals and curvature.
///
/// # Errors
///
/// Returns an error on I/O failure.
pub fn write_xyz<W: Write>(cloud: &PointCloud, mut writer: W) -> TypesResult<()> {
    writeln!(writer, "# Point cloud written by plane-types")?;
    writeln!(writer, "# Format: x y z [nx ny nz [curvature]]")?;

    let has_normals = cloud.has_normals();
    let has_curvature = has_normals && cloud.has_curvature();

    for point in &cloud.points {
        let p = point.position;
        write!(writer, "{} {} {}", p.x, p.y, p.z)?;
        if has_normals {
            let n = point.normal_or_z();
            write!(writer, " {} {} {}", n.x, n.y, n.z)?;
        }
        if has_curvature {
            write!(writer, " {}", point.curvature_or_flat())?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            PointCloudFormat::from_path("scan.pts"),
            Some(PointCloudFormat::Xyz)
        );
        assert_eq!(PointCloudFormat::from_path("scan"), None);
    }

    #[test]
    fn test_read_xyz_with_comments_and_normals() {
        let data = "# header\n0 0 1\n\n1 0 1 0 0 1 0.01\n2 0 1 0 0 1\n";
        let cloud = read_xyz(Cursor::new(data)).unwrap();

        assert_eq!(cloud.len(), 3);
        assert!(cloud.points[0].normal.is_none());
        assert_eq!(cloud.points[1].curvature, Some(0.01));
        assert_eq!(cloud.points[2].normal, Some(Vector3::z()));
    }

    #[test]
    fn test_read_xyz_reports_line() {
        let data = "0 0 0\n1 abc 0\n";
        let err = read_xyz(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, TypesError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_read_pcd_ascii() {
        let data = "\
# .PCD v0.7
VERSION 0.7
FIELDS x y z normal_x normal_y normal_z curvature
SIZE 4 4 4 4 4 4 4
TYPE F F F F F F F
COUNT 1 1 1 1 1 1 1
WIDTH 2
HEIGHT 1
POINTS 2
DATA ascii
0 0 1 0 0 1 0.001
1 0 1 0 0 1 0.002
";
        let cloud = read_pcd(Cursor::new(data)).unwrap();
        assert_eq!(cloud.len(), 2);
        assert!(cloud.has_normals());
        assert_relative_eq!(cloud.points[1].curvature.unwrap(), 0.002);
    }

    #[test]
    fn test_read_pcd_binary_rejected() {
        let data = "FIELDS x y z\nDATA binary\n";
        let err = read_pcd(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, TypesError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_xyz_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plane.xyz");

        let mut cloud = PointCloud::new();
        cloud.push(
            CloudPoint::with_normal(Point3::new(0.5, 1.5, 2.5), Vector3::y()).with_curvature(0.1),
        );
        cloud.push(CloudPoint::with_normal(Point3::new(-1.0, 0.0, 3.0), Vector3::y()).with_curvature(0.2));
        cloud.save(&path).unwrap();

        let loaded = PointCloud::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_relative_eq!(loaded.points[0].position.z, 2.5);
        assert_eq!(loaded.points[1].normal, Some(Vector3::y()));
        assert_eq!(loaded.points[1].curvature, Some(0.2));
    }

    #[test]
    fn test_unsupported_extension() {
        let cloud = PointCloud::new();
        let err = cloud.save("cloud.ply").unwrap_err();
        assert!(matches!(err, TypesError::UnsupportedFormat { .. }));

        let err = PointCloud::load("cloud.ply").unwrap_err();
        assert!(matches!(err, TypesError::UnsupportedFormat { .. }));
    }
}
