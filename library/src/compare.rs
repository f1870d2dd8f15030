use crate::gpu::result_image::ImageExtent;
use derive_more::Display;
use std::fmt::Write;

const CELL_WIDTH: usize = 6;
const COLUMN_GAP: &str = "    ";

/// Outcome of one case: either every texel matched, or the number of
/// disagreeing texels. A mismatch is a conformance finding, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Verdict {
    #[display("Pass")]
    Pass,
    #[display("failures={failures}")]
    Fail { failures: u32 },
}

impl Verdict {
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Texel-exact comparison over the whole image; every texel is visited, no
/// fail-fast.
#[must_use]
pub fn compare(actual: &[u32], expected: &[u32], extent: &ImageExtent) -> Verdict {
    assert_eq!(actual.len(), extent.texel_count() as usize);
    assert_eq!(expected.len(), extent.texel_count() as usize);

    let failures = actual
        .iter()
        .zip(expected.iter())
        .filter(|(actual, expected)| actual != expected)
        .count() as u32;

    if failures == 0 { Verdict::Pass } else { Verdict::Fail { failures } }
}

/// Slice-by-slice dump of both images, actual on the left, expected on the
/// right, for the mismatch report.
#[must_use]
pub fn format_side_by_side(actual: &[u32], expected: &[u32], extent: &ImageExtent) -> String {
    let mut buffer = String::new();

    for z in 0..extent.depth() {
        writeln!(&mut buffer, "z={z}").unwrap();

        for y in 0..extent.height() {
            for x in 0..extent.width() {
                write!(&mut buffer, "{:width$} ", actual[extent.texel_index(x, y, z)], width = CELL_WIDTH).unwrap();
            }

            buffer.push_str(COLUMN_GAP);

            for x in 0..extent.width() {
                write!(&mut buffer, "{:width$} ", expected[extent.texel_index(x, y, z)], width = CELL_WIDTH).unwrap();
            }

            buffer.push('\n');
        }

        buffer.push('\n');
    }

    buffer
}
