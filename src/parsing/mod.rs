//! Per-language grammars, naming profiles, and the registry that ties a
//! `LanguageId` to its `LanguageProfile` (spec §4.4, §6.2).

pub mod c_family;
pub mod common;
pub mod csharp_lang;
pub mod go_lang;
pub mod java_lang;
pub mod php_lang;
pub mod profile;
pub mod python_lang;
pub mod registry;
pub mod rust_lang;
pub mod scala_lang;
pub mod typescript_lang;

pub use profile::{DuplicatePolicy, ImportContext, ImportTarget, LanguageProfile};
pub use registry::{registry, LanguageId};
