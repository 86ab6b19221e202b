/// Data model row types
///
/// Each module holds the row type(s) for one entity plus any state-enum
/// helpers the Store and Scheduler need (`as_str`, `is_terminal`, and so
/// on). CRUD and specialized operations live in `store`, not here — these
/// types are plain data.
///
/// # Modules
///
/// - `project`: the singleton project row
/// - `session`: a named container of queues
/// - `queue`: a FIFO of tasks within a session
/// - `task`: the atomic unit of work and its state machine
/// - `task_class`: named timeout profiles
/// - `tool`: named execution modes, metadata only
/// - `config_entry`: mutable runtime settings

pub mod config_entry;
pub mod project;
pub mod queue;
pub mod session;
pub mod task;
pub mod task_class;
pub mod tool;
