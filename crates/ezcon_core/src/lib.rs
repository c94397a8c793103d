//! ezCon launcher core: option catalog, configuration snapshot, command
//! building and the pure session state machine.
mod catalog;
mod command;
mod config;
mod defaults;
mod effect;
mod msg;
mod run;
mod state;
mod update;
mod view_model;

pub use catalog::{
    find_option, is_catalog_key, options_in, DisplayField, OptionGroup, OptionSpec,
    DISPLAY_FIELDS, OPTION_CATALOG,
};
pub use command::{build_invocation, primary_argument_for, BaseInvocation, Invocation};
pub use config::{is_storable_key, ConfigOption, ConfigSnapshot, ACTIVE_SUFFIX, WORKING_DIR_KEY};
pub use defaults::DefaultsCatalog;
pub use effect::Effect;
pub use msg::Msg;
pub use run::{ErrorKind, FolderStyle, RunId, RunState, StreamChannel, TERMINATED_EXIT_CODE};
pub use state::{
    default_interpreter, AppState, LauncherSettings, OutputLine, SessionSnapshot,
    DEFAULT_SCRIPT_NAME, MAX_OUTPUT_LINES, PREVIEW_NO_FILE,
};
pub use update::update;
pub use view_model::{
    AppViewModel, DisplayFieldView, ErrorView, OptionRowView, OutputLineView,
};
