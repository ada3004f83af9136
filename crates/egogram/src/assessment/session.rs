use super::domain::{Instrument, Rating, RatingOutOfRange, StatementId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Wire form of one answer, addressed by instrument, dimension key and statement position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub instrument: Instrument,
    pub dimension: String,
    pub statement: usize,
    pub rating: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum RatingSheetError {
    #[error("{instrument} has no dimension '{dimension}'")]
    UnknownDimension {
        instrument: Instrument,
        dimension: String,
    },
    #[error("dimension '{dimension}' of the {instrument} has no statement {index}")]
    UnknownStatement {
        instrument: Instrument,
        dimension: String,
        index: usize,
    },
    #[error("invalid rating for '{dimension}' statement {index}: {source}")]
    OutOfRange {
        dimension: String,
        index: usize,
        source: RatingOutOfRange,
    },
    #[error("failed to read ratings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ratings CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Session-scoped answers keyed by stable statement identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingSheet {
    ratings: BTreeMap<StatementId, Rating>,
}

impl RatingSheet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every statement of every instrument at the neutral rating.
    pub fn with_defaults() -> Self {
        Self::uniform(Rating::DEFAULT)
    }

    pub fn uniform(rating: Rating) -> Self {
        let ratings = Instrument::ordered()
            .into_iter()
            .flat_map(Instrument::statement_ids)
            .map(|id| (id, rating))
            .collect();
        Self { ratings }
    }

    pub fn get(&self, id: &StatementId) -> Option<Rating> {
        self.ratings.get(id).copied()
    }

    /// Stores a rating, returning the one it replaced.
    pub fn set(
        &mut self,
        id: StatementId,
        rating: Rating,
    ) -> Result<Option<Rating>, RatingSheetError> {
        if id.text().is_none() {
            let dimension = id
                .template()
                .map(|template| template.key.to_string())
                .ok_or_else(|| RatingSheetError::UnknownDimension {
                    instrument: id.instrument,
                    dimension: format!("#{}", id.dimension),
                })?;
            return Err(RatingSheetError::UnknownStatement {
                instrument: id.instrument,
                dimension,
                index: id.index,
            });
        }
        Ok(self.ratings.insert(id, rating))
    }

    pub fn clear(&mut self, id: &StatementId) -> Option<Rating> {
        self.ratings.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatementId, &Rating)> {
        self.ratings.iter()
    }

    /// Maps a wire entry onto its statement identity and validated rating.
    pub fn resolve(entry: &RatingEntry) -> Result<(StatementId, Rating), RatingSheetError> {
        let (position, template) = entry
            .instrument
            .dimension_by_key(&entry.dimension)
            .ok_or_else(|| RatingSheetError::UnknownDimension {
                instrument: entry.instrument,
                dimension: entry.dimension.clone(),
            })?;

        if entry.statement >= template.statements.len() {
            return Err(RatingSheetError::UnknownStatement {
                instrument: entry.instrument,
                dimension: template.key.to_string(),
                index: entry.statement,
            });
        }

        let rating = Rating::new(entry.rating).map_err(|source| RatingSheetError::OutOfRange {
            dimension: template.key.to_string(),
            index: entry.statement,
            source,
        })?;

        Ok((
            StatementId::new(entry.instrument, position, entry.statement),
            rating,
        ))
    }

    /// Applies every entry or none of them.
    pub fn apply<I>(&mut self, entries: I) -> Result<usize, RatingSheetError>
    where
        I: IntoIterator<Item = RatingEntry>,
    {
        let resolved = entries
            .into_iter()
            .map(|entry| Self::resolve(&entry))
            .collect::<Result<Vec<_>, _>>()?;

        let applied = resolved.len();
        self.ratings.extend(resolved);
        debug!(applied, total = self.ratings.len(), "ratings applied");
        Ok(applied)
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, RatingSheetError>
    where
        I: IntoIterator<Item = RatingEntry>,
    {
        let mut sheet = Self::with_defaults();
        sheet.apply(entries)?;
        Ok(sheet)
    }

    /// Applies `instrument,dimension,statement,rating` rows; all-or-nothing like [`Self::apply`].
    pub fn apply_csv_reader<R: Read>(&mut self, reader: R) -> Result<usize, RatingSheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let entries = csv_reader
            .deserialize::<RatingEntry>()
            .collect::<Result<Vec<_>, _>>()?;
        self.apply(entries)
    }

    pub fn apply_csv_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, RatingSheetError> {
        let file = std::fs::File::open(path)?;
        self.apply_csv_reader(file)
    }

    /// Reads CSV rows on top of the default sheet.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RatingSheetError> {
        let mut sheet = Self::with_defaults();
        sheet.apply_csv_reader(reader)?;
        Ok(sheet)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, RatingSheetError> {
        let mut sheet = Self::with_defaults();
        sheet.apply_csv_path(path)?;
        Ok(sheet)
    }
}
