//! The append-only trajectory [`Record`].

use crate::id::{ParticleId, TileId};
use crate::real::Real;
use crate::window::Direction;
use indexmap::IndexMap;

/// One observation of one particle at one time.
///
/// `x`, `y` and `z` are in the postprocessor's output convention (grid-index
/// units for the default postprocessors). `lon`, `lat` and `fid` are only
/// populated for mesh grids.
#[derive(Clone, Debug, PartialEq)]
pub struct Row<T> {
    /// Which particle.
    pub id: ParticleId,
    /// First horizontal coordinate.
    pub x: T,
    /// Second horizontal coordinate.
    pub y: T,
    /// Vertical coordinate, for 3D grids.
    pub z: Option<T>,
    /// Sample time.
    pub t: T,
    /// Longitude, for mesh grids.
    pub lon: Option<T>,
    /// Latitude, for mesh grids.
    pub lat: Option<T>,
    /// Tile the particle was on, for mesh grids.
    pub fid: Option<TileId>,
}

impl<T: Real> Row<T> {
    /// A row with only the native coordinates filled in.
    pub fn xy(id: ParticleId, x: T, y: T, t: T) -> Self {
        Self {
            id,
            x,
            y,
            z: None,
            t,
            lon: None,
            lat: None,
            fid: None,
        }
    }
}

/// Append-only table of trajectory samples.
///
/// Rows are grouped by sample time in the order they were appended. Each
/// particle has a watermark: the last time recorded for it. A row is only
/// accepted when its time lies strictly beyond that watermark in the
/// integration direction, so consecutive integration windows sharing an
/// endpoint never produce a duplicate sample.
#[derive(Clone, Debug)]
pub struct Record<T> {
    rows: Vec<Row<T>>,
    watermark: IndexMap<ParticleId, T>,
}

impl<T: Real> Record<T> {
    /// An empty record.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            watermark: IndexMap::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if no row was ever appended (or after [`clear`](Self::clear)).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in append order.
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    /// Iterate over all rows in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row<T>> {
        self.rows.iter()
    }

    /// Last time recorded for `id`.
    pub fn last_time(&self, id: ParticleId) -> Option<T> {
        self.watermark.get(&id).copied()
    }

    /// Rows belonging to one particle, in time order.
    pub fn trajectory(&self, id: ParticleId) -> impl Iterator<Item = &Row<T>> + '_ {
        self.rows.iter().filter(move |r| r.id == id)
    }

    /// Distinct sample times in first-seen order.
    pub fn times(&self) -> Vec<T> {
        let mut out: Vec<T> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.t) {
                out.push(row.t);
            }
        }
        out
    }

    /// Append the rows that are new for their particle.
    ///
    /// Returns the number of rows accepted. Rows are examined in order, so
    /// a batch holding several times for the same particle advances that
    /// particle's watermark as it goes.
    pub fn append_new<I>(&mut self, rows: I, direction: Direction) -> usize
    where
        I: IntoIterator<Item = Row<T>>,
    {
        let before = self.rows.len();
        for row in rows {
            let fresh = match self.watermark.get(&row.id) {
                None => true,
                Some(&last) => direction.is_beyond(row.t, last),
            };
            if fresh {
                self.watermark.insert(row.id, row.t);
                self.rows.push(row);
            }
        }
        self.rows.len() - before
    }

    /// Drop every row and forget all watermarks.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.watermark.clear();
    }
}

impl<T: Real> Default for Record<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Real> IntoIterator for &'a Record<T> {
    type Item = &'a Row<T>;
    type IntoIter = std::slice::Iter<'a, Row<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
