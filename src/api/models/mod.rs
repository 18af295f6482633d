// Models module - diagram records, analysis, and history types

pub mod diagram;
pub mod history;

pub use diagram::{Analysis, DiagramRecord, DiagramType, NewDiagram, MAX_INPUT_TEXT_LENGTH};
pub use history::{HistoryBuffer, HistoryItem, HISTORY_CAPACITY};
