use std::fmt;

#[derive(Debug)]
pub enum InstrumentError {
    Note(NoteError),
    Control(ControlError),
    Param(ParamError),
    /// A UI payload or configuration that could not be decoded.
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoteError {
    /// A note must carry at least one frequency.
    EmptyChord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The UI has no element to mount a dial on.
    MissingElement { id: String },
    /// No dial was registered under this id.
    UnknownControl { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// The path does not address anything in the engine's parameters.
    UnknownPath { path: String },
    /// The addressed parameter is a leaf, not a group object.
    NotAGroup { group: String },
    /// The engine refused the value written at `path`.
    Rejected { path: String, reason: String },
}

impl fmt::Display for InstrumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentError::Note(e) => write!(f, "Note error: {e}"),
            InstrumentError::Control(e) => write!(f, "Control error: {e}"),
            InstrumentError::Param(e) => write!(f, "Parameter error: {e}"),
            InstrumentError::Decode(msg) => write!(f, "Decode error: {msg}"),
        }
    }
}

impl std::error::Error for InstrumentError {}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::EmptyChord => write!(f, "note has no frequencies"),
        }
    }
}

impl std::error::Error for NoteError {}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::MissingElement { id } => write!(f, "no element '#{id}' to mount a dial on"),
            ControlError::UnknownControl { id } => write!(f, "no control registered as '{id}'"),
        }
    }
}

impl std::error::Error for ControlError {}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::UnknownPath { path } => write!(f, "unknown parameter path '{path}'"),
            ParamError::NotAGroup { group } => write!(f, "'{group}' is not a parameter group"),
            ParamError::Rejected { path, reason } => {
                write!(f, "engine rejected value for '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for ParamError {}

impl From<NoteError> for InstrumentError {
    fn from(e: NoteError) -> Self {
        InstrumentError::Note(e)
    }
}

impl From<ControlError> for InstrumentError {
    fn from(e: ControlError) -> Self {
        InstrumentError::Control(e)
    }
}

impl From<ParamError> for InstrumentError {
    fn from(e: ParamError) -> Self {
        InstrumentError::Param(e)
    }
}

impl From<serde_json::Error> for InstrumentError {
    fn from(e: serde_json::Error) -> Self {
        InstrumentError::Decode(e.to_string())
    }
}
