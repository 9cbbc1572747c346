pub mod events;
pub mod export;
pub mod flatten;
pub mod load;

pub use events::{EventSink, NullSink, TracingSink};
pub use export::{
    export_env, export_json, print_flat, EnvSink, ExportError, ProcessEnv, SinkChoice,
    DEFAULT_ENV_FILE, DEFAULT_JSON_FILE,
};
pub use flatten::{flatten, FlatConfig, Scalar, SEPARATOR};
pub use load::{document_key, load_ini, load_path, load_yaml, IniError, LoadError, SourceKind};
