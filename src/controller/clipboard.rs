//! Copy buffer of serialized figures.

use crate::model::{Figure, FigureError, FigureRecord};

/// Holds copied figures as (type, field map) records.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    records: Vec<FigureRecord>,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[FigureRecord] {
        &self.records
    }

    /// Replace the contents with the given figures.
    ///
    /// On error the previous contents are kept.
    pub fn copy<'a>(
        &mut self,
        figures: impl IntoIterator<Item = &'a Figure>,
    ) -> Result<usize, FigureError> {
        let records = figures
            .into_iter()
            .map(Figure::to_record)
            .collect::<Result<Vec<_>, _>>()?;
        self.records = records;
        Ok(self.records.len())
    }

    /// Fresh figure instances for every copied record.
    pub fn instantiate(&self) -> Result<Vec<Figure>, FigureError> {
        self.records.iter().map(Figure::from_record).collect()
    }
}
