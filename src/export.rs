//! Marker export
//!
//! A snapshot flattens the engine's marker lists into tabular rows
//! (`marker_type, x, y, z, radius`), written as CSV at shutdown or
//! rendered as JSON.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::state::{MarkerKind, MarkerLog};

/// Default export file name
pub const MARKERS_FILE: &str = "markers.csv";

/// One exported marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    #[serde(rename = "marker_type")]
    pub kind: MarkerKind,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Only impact markers carry a radius
    pub radius: Option<f32>,
}

/// All markers of a run, grouped by kind (outer, inner, impact)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub rows: Vec<MarkerRecord>,
}

impl MarkerSnapshot {
    /// Flatten a marker log; each kind keeps its recording order
    pub fn from_log(markers: &MarkerLog) -> Self {
        let entries = |kind: MarkerKind, points: &[glam::Vec3]| {
            points
                .iter()
                .map(move |p| MarkerRecord {
                    kind,
                    x: p.x,
                    y: p.y,
                    z: p.z,
                    radius: None,
                })
                .collect::<Vec<_>>()
        };

        let mut rows = Vec::with_capacity(markers.len());
        rows.extend(entries(MarkerKind::OuterEntry, &markers.outer_entries));
        rows.extend(entries(MarkerKind::InnerEntry, &markers.inner_entries));
        rows.extend(markers.impacts.iter().map(|m| MarkerRecord {
            kind: MarkerKind::Impact,
            x: m.position.x,
            y: m.position.y,
            z: m.position.z,
            radius: Some(m.radius),
        }));

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one kind
    pub fn of_kind(&self, kind: MarkerKind) -> impl Iterator<Item = &MarkerRecord> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }
}

/// Write the snapshot as CSV with a `marker_type,x,y,z,radius` header
///
/// Entry markers leave the radius column empty.
pub fn write_csv<W: Write>(snapshot: &MarkerSnapshot, writer: W) -> Result<(), SimError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if snapshot.is_empty() {
        // serialize() only emits the header alongside the first row
        wtr.write_record(["marker_type", "x", "y", "z", "radius"])?;
    }
    for row in &snapshot.rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the snapshot to a CSV file, replacing it
pub fn save_csv<P: AsRef<Path>>(snapshot: &MarkerSnapshot, path: P) -> Result<(), SimError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(snapshot, file)?;
    log::info!("Markers saved to {} ({} rows)", path.display(), snapshot.len());
    Ok(())
}

/// Render the rows as a JSON array
pub fn to_json(snapshot: &MarkerSnapshot) -> Result<String, SimError> {
    Ok(serde_json::to_string_pretty(&snapshot.rows)?)
}
