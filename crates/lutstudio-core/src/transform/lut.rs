//! 3D LUT decoding, application, and `.cube` file I/O.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::GradeError;
use crate::image::PixelBuffer;
use crate::transform::hald::{HALD_LEVELS, HALD_SIZE, HALD_TILES};

/// Grid sizes accepted when reading a `.cube` file.
pub const CUBE_SIZE_RANGE: std::ops::RangeInclusive<u32> = 2..=256;

/// A 3D lookup table with normalized `[0, 1]` RGB entries.
///
/// Entries are stored red-fastest: `index = (b * size + g) * size + r`,
/// which is also the row order of a `.cube` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Grid size per axis.
    pub size: u32,
    /// LUT entries. Length = size³.
    pub data: Vec<[f32; 3]>,
}

impl Lut3D {
    /// The identity cube at the given grid size.
    pub fn identity(size: u32) -> Self {
        let n = size as usize;
        let scale = (size.max(2) - 1) as f32;
        let mut data = Vec::with_capacity(n * n * n);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push([r as f32 / scale, g as f32 / scale, b as f32 / scale]);
                }
            }
        }
        Self { size, data }
    }

    /// Decode a graded 512×512 Hald image into a 64³ cube.
    pub fn from_hald(hald: &PixelBuffer) -> Result<Self, GradeError> {
        if hald.width() != HALD_SIZE || hald.height() != HALD_SIZE {
            return Err(GradeError::HaldSize {
                width: hald.width(),
                height: hald.height(),
                expected: HALD_SIZE,
            });
        }

        let n = HALD_LEVELS as usize;
        let mut data = Vec::with_capacity(n * n * n);
        let pixels = hald.pixels();
        for b in 0..HALD_LEVELS {
            let (tile_x, tile_y) = (b % HALD_TILES, b / HALD_TILES);
            for g in 0..HALD_LEVELS {
                let y = (tile_y * HALD_LEVELS + g) as usize;
                for r in 0..HALD_LEVELS {
                    let x = (tile_x * HALD_LEVELS + r) as usize;
                    let px = pixels[y * HALD_SIZE as usize + x];
                    data.push([
                        px[0] as f32 / 255.0,
                        px[1] as f32 / 255.0,
                        px[2] as f32 / 255.0,
                    ]);
                }
            }
        }
        Ok(Self {
            size: HALD_LEVELS,
            data,
        })
    }

    #[inline]
    fn entry(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let n = self.size as usize;
        self.data[(b * n + g) * n + r]
    }

    /// Apply this LUT to a normalized RGB pixel using trilinear interpolation.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.size < 2 {
            return self.data.first().copied().unwrap_or(rgb);
        }
        let max = (self.size - 1) as f32;
        let pos = rgb.map(|c| c.clamp(0.0, 1.0) * max);
        let lo = pos.map(|p| (p.floor() as usize).min(self.size as usize - 2));
        let t = [
            pos[0] - lo[0] as f32,
            pos[1] - lo[1] as f32,
            pos[2] - lo[2] as f32,
        ];

        let lerp = |a: [f32; 3], b: [f32; 3], t: f32| {
            [
                a[0] + (b[0] - a[0]) * t,
                a[1] + (b[1] - a[1]) * t,
                a[2] + (b[2] - a[2]) * t,
            ]
        };

        let [r0, g0, b0] = lo;
        let c00 = lerp(self.entry(r0, g0, b0), self.entry(r0 + 1, g0, b0), t[0]);
        let c10 = lerp(self.entry(r0, g0 + 1, b0), self.entry(r0 + 1, g0 + 1, b0), t[0]);
        let c01 = lerp(self.entry(r0, g0, b0 + 1), self.entry(r0 + 1, g0, b0 + 1), t[0]);
        let c11 = lerp(
            self.entry(r0, g0 + 1, b0 + 1),
            self.entry(r0 + 1, g0 + 1, b0 + 1),
            t[0],
        );
        let c0 = lerp(c00, c10, t[1]);
        let c1 = lerp(c01, c11, t[1]);
        lerp(c0, c1, t[2])
    }

    /// Write this LUT in `.cube` format.
    pub fn write_cube<W: Write>(&self, mut w: W, title: &str) -> Result<(), GradeError> {
        writeln!(w, "TITLE \"{}\"", title.replace('"', "'"))?;
        writeln!(w, "LUT_3D_SIZE {}", self.size)?;
        writeln!(w, "DOMAIN_MIN 0.0 0.0 0.0")?;
        writeln!(w, "DOMAIN_MAX 1.0 1.0 1.0")?;
        for [r, g, b] in &self.data {
            writeln!(w, "{r:.6} {g:.6} {b:.6}")?;
        }
        w.flush()?;
        Ok(())
    }

    /// Save this 3D LUT to a `.cube` file.
    pub fn save_cube(&self, path: &Path, title: &str) -> Result<(), GradeError> {
        let file = File::create(path)?;
        self.write_cube(BufWriter::new(file), title)?;
        tracing::info!(path = %path.display(), size = self.size, "wrote .cube LUT");
        Ok(())
    }

    /// Parse a 3D `.cube` LUT.
    ///
    /// Comments, `TITLE` and `DOMAIN_*` lines are skipped; the domain is
    /// assumed to be `[0, 1]`.
    pub fn read_cube<R: BufRead>(reader: R) -> Result<Self, GradeError> {
        let mut size = None;
        let mut data = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let l = line.trim();
            if l.is_empty() || l.starts_with('#') {
                continue;
            }
            if let Some(rest) = l.strip_prefix("LUT_3D_SIZE") {
                let n: u32 = rest.trim().parse().map_err(|_| GradeError::CubeParse {
                    line: line_no,
                    message: format!("invalid LUT_3D_SIZE '{}'", rest.trim()),
                })?;
                if !CUBE_SIZE_RANGE.contains(&n) {
                    return Err(GradeError::CubeParse {
                        line: line_no,
                        message: format!(
                            "LUT_3D_SIZE {n} outside {}..={}",
                            CUBE_SIZE_RANGE.start(),
                            CUBE_SIZE_RANGE.end()
                        ),
                    });
                }
                size = Some(n);
                data.reserve((n as usize).pow(3));
                continue;
            }
            if l.starts_with("TITLE") || l.starts_with("DOMAIN_") {
                continue;
            }
            if l.starts_with("LUT_1D_SIZE") {
                return Err(GradeError::CubeParse {
                    line: line_no,
                    message: "1D LUTs are not supported".to_string(),
                });
            }

            let mut entry = [0.0f32; 3];
            let mut parts = l.split_whitespace();
            for slot in &mut entry {
                let token = parts.next().ok_or_else(|| GradeError::CubeParse {
                    line: line_no,
                    message: "expected three values".to_string(),
                })?;
                *slot = token.parse().map_err(|_| GradeError::CubeParse {
                    line: line_no,
                    message: format!("invalid value '{token}'"),
                })?;
            }
            data.push(entry);
        }

        let size = size.ok_or_else(|| GradeError::CubeParse {
            line: 0,
            message: "missing LUT_3D_SIZE".to_string(),
        })?;
        let expected = (size as usize).checked_pow(3);
        if expected != Some(data.len()) {
            return Err(GradeError::CubeParse {
                line: 0,
                message: format!("expected {size}³ entries, found {}", data.len()),
            });
        }
        Ok(Self { size, data })
    }

    /// Load a 3D LUT from a `.cube` file.
    pub fn load_cube(path: &Path) -> Result<Self, GradeError> {
        Self::read_cube(BufReader::new(File::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::hald::generate_hald;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_hald_decodes_to_identity_cube() {
        let lut = Lut3D::from_hald(&generate_hald()).unwrap();
        assert_eq!(lut.size, 64);
        assert_eq!(lut.data.len(), 64 * 64 * 64);
        assert_eq!(lut.data[0], [0.0, 0.0, 0.0]);
        assert_eq!(lut.data[lut.data.len() - 1], [1.0, 1.0, 1.0]);
        // Red is the fastest axis.
        assert!((lut.data[1][0] - 4.0 / 255.0).abs() < EPSILON);
        assert_eq!(lut.data[1][2], 0.0);
    }

    #[test]
    fn test_from_hald_rejects_wrong_size() {
        let err = Lut3D::from_hald(&PixelBuffer::filled(64, 64, [0, 0, 0, 255])).unwrap_err();
        assert!(matches!(err, GradeError::HaldSize { expected: 512, .. }));
    }

    #[test]
    fn test_identity_apply_is_passthrough() {
        let lut = Lut3D::identity(17);
        for rgb in [[0.0, 0.0, 0.0], [0.3, 0.55, 0.91], [1.0, 1.0, 1.0]] {
            let out = lut.apply(rgb);
            for c in 0..3 {
                assert!((out[c] - rgb[c]).abs() < EPSILON, "{rgb:?} -> {out:?}");
            }
        }
    }

    #[test]
    fn test_apply_interpolates_between_nodes() {
        // Size-2 cube that inverts every channel.
        let mut lut = Lut3D::identity(2);
        for e in &mut lut.data {
            *e = e.map(|c| 1.0 - c);
        }
        let out = lut.apply([0.25, 0.5, 0.75]);
        assert!((out[0] - 0.75).abs() < EPSILON);
        assert!((out[1] - 0.5).abs() < EPSILON);
        assert!((out[2] - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_cube_text_layout() {
        let mut out = Vec::new();
        Lut3D::identity(2).write_cube(&mut out, "Warm \"Film\"").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "TITLE \"Warm 'Film'\"");
        assert_eq!(lines[1], "LUT_3D_SIZE 2");
        assert_eq!(lines[4], "0.000000 0.000000 0.000000");
        assert_eq!(lines[5], "1.000000 0.000000 0.000000");
        assert_eq!(lines.len(), 4 + 8);
    }

    #[test]
    fn test_read_cube_parses_written_file() {
        let mut out = Vec::new();
        let lut = Lut3D::identity(3);
        lut.write_cube(&mut out, "id").unwrap();
        let parsed = Lut3D::read_cube(out.as_slice()).unwrap();
        assert_eq!(parsed.size, 3);
        assert!((parsed.data[5][2] - lut.data[5][2]).abs() < EPSILON);
    }

    #[test]
    fn test_read_cube_reports_bad_line() {
        let text = "LUT_3D_SIZE 2\n0 0 0\n1 0 x\n";
        let err = Lut3D::read_cube(text.as_bytes()).unwrap_err();
        assert!(matches!(err, GradeError::CubeParse { line: 3, .. }));
    }

    #[test]
    fn test_read_cube_rejects_out_of_range_size() {
        for text in [
            "LUT_3D_SIZE 3000000\n0 0 0\n",
            "# huge\nLUT_3D_SIZE 4294967295\n",
            "LUT_3D_SIZE 1\n0 0 0\n",
            "LUT_3D_SIZE 0\n",
        ] {
            let err = Lut3D::read_cube(text.as_bytes()).unwrap_err();
            assert!(matches!(err, GradeError::CubeParse { .. }), "{text:?}: {err}");
        }
        let err = Lut3D::read_cube("#\nLUT_3D_SIZE 257\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GradeError::CubeParse { line: 2, .. }));
    }
}
