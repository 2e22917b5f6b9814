use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sum_ten_core::{Board, CellCoord, Difficulty, TileValue};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "sum";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const SNAPSHOT_HEADER: &str = "sum:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Board layout paired with the tier it was played at.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoardLayout {
    /// Tier the layout belongs to.
    pub(crate) difficulty: Difficulty,
    /// Fully occupied board.
    pub(crate) board: Board,
}

#[derive(Serialize, Deserialize)]
struct SerializableLayout {
    difficulty: Difficulty,
    rows: Vec<Vec<TileValue>>,
}

/// Errors that can occur while encoding or decoding layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// A required segment was missing.
    #[error("layout string is missing the {0}")]
    MissingSegment(&'static str),
    /// The layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The decoded rows disagree with the declared dimensions.
    #[error("layout declares {declared} but its rows form {found}")]
    DimensionMismatch {
        /// Dimensions from the header.
        declared: String,
        /// Dimensions of the decoded rows.
        found: String,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be (de)serialised.
    #[error("could not process layout payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// A cell has no tile, so the board cannot be captured.
    #[error("cell {0} is empty")]
    EmptyCell(CellCoord),
}

impl BoardLayout {
    /// Encodes the layout into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let rows = (0..self.board.height())
            .map(|row| {
                (0..self.board.width())
                    .map(|column| {
                        let cell = CellCoord::new(column, row);
                        self.board
                            .value(cell)
                            .ok_or(LayoutTransferError::EmptyCell(cell))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let payload = SerializableLayout {
            difficulty: self.difficulty,
            rows,
        };
        let encoded = STANDARD_NO_PAD.encode(serde_json::to_vec(&payload)?);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.board.width(),
            self.board.height()
        ))
    }

    /// Decodes a layout from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let mut next = |segment: &'static str| {
            parts
                .next()
                .ok_or(LayoutTransferError::MissingSegment(segment))
        };
        let domain = next("prefix")?;
        let version = next("version")?;
        let dimensions = next("grid dimensions")?;
        let payload = next("payload")?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: SerializableLayout = serde_json::from_slice(&bytes)?;

        let board = Board::from_rows(&decoded.rows)
            .filter(|board| board.width() == columns && board.height() == rows)
            .ok_or_else(|| LayoutTransferError::DimensionMismatch {
                declared: dimensions.to_owned(),
                found: format!(
                    "{} rows of lengths {:?}",
                    decoded.rows.len(),
                    decoded.rows.iter().map(Vec::len).collect::<Vec<_>>()
                ),
            })?;

        Ok(Self {
            difficulty: decoded.difficulty,
            board,
        })
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}
