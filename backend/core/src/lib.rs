pub mod error;
pub mod event;
pub mod ids;
pub mod types;

pub use error::EngineError;
pub use event::{verbs, EventKind, EventLog, EventSink, EventStream};
pub use ids::{IdSource, SequentialIds, UuidIds};
pub use types::{
    Breakpoint, ButtonPayload, DEFAULT_FALLBACK_ALT, ClassNames, ClassSpec, FileNode, FlatNode, HookParam, NodeType,
    OptionsPayload, ResponsiveStyles, StyleTuple, TagOverrides, TupleValue, VideoCue,
};
