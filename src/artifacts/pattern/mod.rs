//! Source globs and translation templates
//!
//! - `glob`: source patterns with `*`, `?`, `**` and character classes
//! - `placeholder`: `%name%` tokens of translation templates
//! - `template`: translation path expansion and its inverse

pub mod glob;
pub mod placeholder;
pub mod template;
