//! Dice duration table and the duration oracle.
//!
//! Each face of the table maps a roll outcome to a spin duration. A spin
//! rolls one face uniformly at random; the face's duration bounds the spin.

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::validate::ValidationReport;

/// Lowest face number a table may use.
pub const MIN_FACE: u32 = 1;
/// Highest face number a table may use.
pub const MAX_FACE: u32 = 50;
/// Upper bound on a face duration, in seconds.
pub const MAX_DURATION_SECS: f64 = 60.0;
/// Lower bound on a duration entered through the settings edit, in seconds.
pub const MIN_EDIT_DURATION_SECS: f64 = 1.0;
/// Minimum number of faces in a table.
pub const MIN_FACES: usize = 2;

/// The built-in table used when none is stored or the stored one is broken.
pub const DEFAULT_FACES: [(u32, f64); 6] = [
    (1, 3.0),
    (2, 5.0),
    (3, 7.0),
    (4, 8.0),
    (5, 9.0),
    (6, 10.0),
];

/// One entry of the dice table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiceFace {
    /// Face number (1-50).
    pub face: u32,
    /// Spin duration in seconds when this face is rolled.
    pub duration_secs: f64,
}

impl DiceFace {
    /// Create a face.
    pub fn new(face: u32, duration_secs: f64) -> Self {
        Self {
            face,
            duration_secs,
        }
    }

    /// The face's duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs.max(0.0))
    }
}

impl std::fmt::Display for DiceFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}s", self.face, self.duration_secs)
    }
}

/// An ordered set of faces with unique face numbers and at least two entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiceTable {
    faces: Vec<DiceFace>,
}

impl Default for DiceTable {
    fn default() -> Self {
        Self {
            faces: DEFAULT_FACES
                .iter()
                .map(|&(face, secs)| DiceFace::new(face, secs))
                .collect(),
        }
    }
}

impl DiceTable {
    /// Build a table from stored faces, checking the table invariants.
    ///
    /// Durations only need to be positive here; the stricter 1-60 second
    /// range applies to edits (see [`DiceTable::from_drafts`]).
    pub fn new(faces: Vec<DiceFace>) -> Result<Self, ValidationReport> {
        let mut report = ValidationReport::new();
        for (row, face) in faces.iter().enumerate() {
            if !(MIN_FACE..=MAX_FACE).contains(&face.face) {
                report.row_error(row, "face", face_range_message());
            }
            if !face.duration_secs.is_finite()
                || face.duration_secs <= 0.0
                || face.duration_secs > MAX_DURATION_SECS
            {
                report.row_error(
                    row,
                    "duration",
                    format!("must be greater than 0 and at most {MAX_DURATION_SECS} seconds"),
                );
            }
        }
        mark_duplicates(faces.iter().map(|f| f.face).enumerate(), &mut report);
        if faces.len() < MIN_FACES {
            report.global_error(min_faces_message());
        }
        report.into_result(Self { faces })
    }

    /// Validate a settings edit and build the table it describes.
    ///
    /// Faces must be whole numbers in 1-50 and unique; durations must be
    /// between 1 and 60 seconds; at least two rows are required. Duplicate
    /// face numbers mark every offending row.
    pub fn from_drafts(drafts: &[DiceFaceDraft]) -> Result<Self, ValidationReport> {
        let mut report = ValidationReport::new();
        let mut faces = Vec::with_capacity(drafts.len());
        let mut parsed_faces = Vec::new();

        for (row, draft) in drafts.iter().enumerate() {
            let face = match parse_whole(&draft.face) {
                Ok(n) if (i64::from(MIN_FACE)..=i64::from(MAX_FACE)).contains(&n) => {
                    let n = n as u32;
                    parsed_faces.push((row, n));
                    Some(n)
                }
                Ok(_) => {
                    report.row_error(row, "face", face_range_message());
                    None
                }
                Err(message) => {
                    report.row_error(row, "face", message);
                    None
                }
            };

            let duration = match draft.duration.trim().parse::<f64>() {
                Ok(secs)
                    if secs.is_finite()
                        && (MIN_EDIT_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs) =>
                {
                    Some(secs)
                }
                Ok(_) => {
                    report.row_error(
                        row,
                        "duration",
                        format!(
                            "must be between {MIN_EDIT_DURATION_SECS} and {MAX_DURATION_SECS} seconds"
                        ),
                    );
                    None
                }
                Err(_) => {
                    report.row_error(row, "duration", "must be a number");
                    None
                }
            };

            if let (Some(face), Some(duration_secs)) = (face, duration) {
                faces.push(DiceFace::new(face, duration_secs));
            }
        }

        mark_duplicates(parsed_faces.into_iter(), &mut report);
        if drafts.len() < MIN_FACES {
            report.global_error(min_faces_message());
        }
        report.into_result(Self { faces })
    }

    /// Roll the table: pick one face uniformly at random.
    pub fn pick_face<R: Rng + ?Sized>(&self, rng: &mut R) -> CoreResult<&DiceFace> {
        if self.faces.is_empty() {
            return Err(CoreError::EmptyDiceTable);
        }
        Ok(&self.faces[rng.random_range(0..self.faces.len())])
    }

    /// All faces in order.
    pub fn faces(&self) -> &[DiceFace] {
        &self.faces
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether the table has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Editable copies of the faces, for pre-filling a settings form.
    pub fn to_drafts(&self) -> Vec<DiceFaceDraft> {
        self.faces.iter().map(DiceFaceDraft::from).collect()
    }
}

/// A dice table row as entered by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceFaceDraft {
    /// Face number text.
    pub face: String,
    /// Duration text, in seconds.
    pub duration: String,
}

impl DiceFaceDraft {
    /// Create a draft row.
    pub fn new(face: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            face: face.into(),
            duration: duration.into(),
        }
    }
}

impl From<&DiceFace> for DiceFaceDraft {
    fn from(face: &DiceFace) -> Self {
        Self::new(face.face.to_string(), face.duration_secs.to_string())
    }
}

fn parse_whole(text: &str) -> Result<i64, &'static str> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Ok(n);
    }
    match text.parse::<f64>() {
        Ok(x) if x.is_finite() && x.fract() == 0.0 => Ok(x as i64),
        Ok(_) => Err("must be a whole number"),
        Err(_) => Err("must be a number"),
    }
}

fn mark_duplicates(faces: impl Iterator<Item = (usize, u32)>, report: &mut ValidationReport) {
    let mut rows_by_face: HashMap<u32, Vec<usize>> = HashMap::new();
    for (row, face) in faces {
        rows_by_face.entry(face).or_default().push(row);
    }
    for (face, rows) in rows_by_face {
        if rows.len() > 1 {
            for row in rows {
                report.row_error(row, "face", format!("face {face} is used more than once"));
            }
        }
    }
}

fn face_range_message() -> String {
    format!("must be between {MIN_FACE} and {MAX_FACE}")
}

fn min_faces_message() -> String {
    format!("at least {MIN_FACES} faces are required")
}
