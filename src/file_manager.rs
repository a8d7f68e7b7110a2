// src/file_manager.rs - Output tables for resolved moves
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use thiserror::Error;

use crate::config::OutputSettings;
use crate::motion::{AxisSeries, CableLengths, Point3, TrajectorySink};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Buffers every emitted move and writes the two result tables once per run.
///
/// * `<stem>_1.out` holds four rows per move, the R1..R4 cable lengths.
/// * `<stem>_2.out` holds per move the workspace extents, the time grid and
///   the x, y and z camera positions.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    cable_path: PathBuf,
    position_path: PathBuf,
    precision: Option<usize>,
    write_positions: bool,
    cable_rows: Vec<Vec<String>>,
    position_rows: Vec<Vec<String>>,
}

impl OutputWriter {
    pub fn new(cable_path: impl Into<PathBuf>, position_path: impl Into<PathBuf>) -> Self {
        Self {
            cable_path: cable_path.into(),
            position_path: position_path.into(),
            precision: None,
            write_positions: true,
            cable_rows: Vec::new(),
            position_rows: Vec::new(),
        }
    }

    /// Writer named after the scene file, e.g. `scene.txt` -> `scene.txt_1.out`.
    pub fn for_scene(scene_path: &Path, settings: &OutputSettings) -> Self {
        let file_name = scene_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "spidercam".to_string());
        let directory = match &settings.directory {
            Some(dir) => dir.clone(),
            None => scene_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let mut writer = Self::new(
            directory.join(format!("{}_1.out", file_name)),
            directory.join(format!("{}_2.out", file_name)),
        );
        writer.precision = settings.precision;
        writer.write_positions = settings.write_positions;
        writer
    }

    pub fn with_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    pub fn cable_path(&self) -> &Path {
        &self.cable_path
    }

    pub fn position_path(&self) -> &Path {
        &self.position_path
    }

    fn format_row(&self, values: &[f64]) -> Vec<String> {
        values
            .iter()
            .map(|v| match self.precision {
                Some(p) => format!("{:.*}", p, v),
                None => v.to_string(),
            })
            .collect()
    }

    /// Write the buffered tables, replacing any files from a previous run.
    pub fn finish(&self) -> Result<(), OutputError> {
        write_table(&self.cable_path, &self.cable_rows)?;
        tracing::info!(
            "Wrote {} cable-length rows to {}",
            self.cable_rows.len(),
            self.cable_path.display()
        );
        if self.write_positions {
            write_table(&self.position_path, &self.position_rows)?;
            tracing::info!(
                "Wrote {} position rows to {}",
                self.position_rows.len(),
                self.position_path.display()
            );
        }
        Ok(())
    }
}

fn write_table(path: &Path, rows: &[Vec<String>]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

impl TrajectorySink for OutputWriter {
    fn emit_cable_lengths(&mut self, lengths: &CableLengths) -> Result<(), OutputError> {
        for cable in lengths {
            let row = self.format_row(cable);
            self.cable_rows.push(row);
        }
        Ok(())
    }

    fn emit_positions(
        &mut self,
        dim: &Point3,
        time_grid: &[f64],
        positions: &AxisSeries,
    ) -> Result<(), OutputError> {
        if !self.write_positions {
            return Ok(());
        }
        let dim_row = self.format_row(&dim.to_array());
        let time_row = self.format_row(time_grid);
        self.position_rows.push(dim_row);
        self.position_rows.push(time_row);
        for axis in positions {
            let row = self.format_row(axis);
            self.position_rows.push(row);
        }
        Ok(())
    }
}

/// In-memory sink keeping every emitted series, used for dry runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    pub cable_lengths: Vec<CableLengths>,
    pub time_grids: Vec<Vec<f64>>,
    pub positions: Vec<AxisSeries>,
}

impl RecordingSink {
    pub fn sample_count(&self) -> usize {
        self.time_grids.iter().map(Vec::len).sum()
    }
}

impl TrajectorySink for RecordingSink {
    fn emit_cable_lengths(&mut self, lengths: &CableLengths) -> Result<(), OutputError> {
        self.cable_lengths.push(lengths.clone());
        Ok(())
    }

    fn emit_positions(
        &mut self,
        _dim: &Point3,
        time_grid: &[f64],
        positions: &AxisSeries,
    ) -> Result<(), OutputError> {
        self.time_grids.push(time_grid.to_vec());
        self.positions.push(positions.clone());
        Ok(())
    }
}
