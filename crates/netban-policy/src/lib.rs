//! Channel ban policy for netban.
//!
//! Two decision paths: the top-domain short-circuit (hostname label only,
//! no network I/O) and the resolved-country test fed by the resolver. Both
//! respect whitelist inversion and produce templated ban reasons.

pub mod engine;
pub mod settings;
pub mod template;

pub use engine::{Decision, PolicyEngine};
pub use settings::{
    MemorySettings, SettingsStore, GLOBAL_OPTIONS, OPT_BAN_REASON, OPT_FALLBACK, OPT_GEO_BAN,
    OPT_LOG_MODE, OPT_MSG_CMDS, OPT_TOP_BAN_REASON,
};
pub use template::{render, TemplateVars, DEFAULT_BAN_REASON, DEFAULT_TOP_BAN_REASON};
